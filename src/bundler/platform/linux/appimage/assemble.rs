//! AppDir assembly: environment copy, interpreter entry point, shared libraries.

use crate::bundler::{
    StepOutcome,
    error::{Context, ErrorExt, Result},
    settings::{BuildConfig, BuildMode},
    utils::{
        fs,
        process::{CommandRunner, Invocation, tail},
    },
};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Shared libraries worth carrying along from the build host: the Python
/// runtime itself, TLS, compression and sqlite.
static LIBRARY_ALLOWLIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^lib(python|ssl|crypto|ffi|z|lzma|bz2|sqlite3|expat|readline|ncurses|tinfo)[\w.+-]*\.so",
    )
    .expect("library allowlist pattern is valid")
});

/// What assembly did besides copying the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleSummary {
    /// Host libraries copied into `usr/lib`.
    pub copied_libraries: Vec<PathBuf>,
    pub outcome: StepOutcome,
}

/// Builds the AppDir from the conda environment.
///
/// The AppDir is erased first, so running this twice with the same
/// environment yields the same tree. Library bundling only happens for
/// native builds; a cross build trusts the environment to ship
/// target-correct libraries and copies nothing.
pub async fn assemble_app_dir<R: CommandRunner>(
    config: &BuildConfig,
    runner: &R,
) -> Result<AssembleSummary> {
    let app_dir = config.app_dir();
    let usr_dir = config.usr_dir();

    fs::create_dir_all(&app_dir, true).await?;

    log::info!(
        "Copying environment {} into {}",
        config.env_dir().display(),
        usr_dir.display()
    );
    fs::copy_dir(&config.env_dir(), &usr_dir).await?;

    for dir in [
        config.bin_dir(),
        config.lib_dir(),
        usr_dir.join("share").join("applications"),
        usr_dir.join("share/icons/hicolor/scalable/apps"),
    ] {
        fs::create_dir_all(&dir, false).await?;
    }

    ensure_interpreter(config).await?;

    match config.mode() {
        BuildMode::Native(_) => bundle_shared_libraries(config, runner).await,
        BuildMode::Cross { host, target } => {
            log::info!(
                "Cross build ({} -> {}): skipping host library scan, the environment ships {} libraries",
                host,
                target,
                target
            );
            Ok(AssembleSummary {
                copied_libraries: Vec::new(),
                outcome: StepOutcome::Completed,
            })
        }
    }
}

/// Guarantees `usr/bin/python3` exists and every interpreter name is executable.
async fn ensure_interpreter(config: &BuildConfig) -> Result<()> {
    let bin_dir = config.bin_dir();
    let versioned = config.package().versioned_interpreter();
    let python3 = bin_dir.join("python3");

    if !python3.exists() {
        let fallback = [versioned.as_str(), "python"]
            .into_iter()
            .find(|name| bin_dir.join(name).exists())
            .context("no Python interpreter in the environment's bin directory")?;

        // A dangling link would block symlink creation
        fs::remove_path(&python3).fs_context("removing dangling python3", &python3)?;
        log::debug!("Linking python3 -> {}", fallback);
        tokio::fs::symlink(fallback, &python3)
            .await
            .fs_context("creating python3 link", &python3)?;
    }

    for name in ["python", "python3", versioned.as_str()] {
        let path = bin_dir.join(name);
        if path.exists() {
            fs::make_executable(&path).await?;
        }
    }

    Ok(())
}

async fn bundle_shared_libraries<R: CommandRunner>(
    config: &BuildConfig,
    runner: &R,
) -> Result<AssembleSummary> {
    let python = config.bin_dir().join("python3");
    let lib_dir = config.lib_dir();

    let degraded = |reason: String| {
        log::info!("{}", reason);
        AssembleSummary {
            copied_libraries: Vec::new(),
            outcome: StepOutcome::Degraded(reason),
        }
    };

    let output = match runner.run(&Invocation::new("ldd").arg(&python)).await {
        Ok(output) if output.success() => output,
        Ok(output) => {
            return Ok(degraded(format!(
                "ldd {} exited with {:?}: {}",
                python.display(),
                output.code,
                tail(&output.stderr, 3)
            )));
        }
        Err(e) => return Ok(degraded(format!("could not run ldd: {e}"))),
    };

    let mut copied = Vec::new();
    let mut failures = Vec::new();

    for library in parse_ldd(&output.stdout) {
        let Some(name) = library.file_name() else {
            continue;
        };
        if !is_bundled_library(&name.to_string_lossy()) {
            continue;
        }

        let dest = lib_dir.join(name);
        if std::fs::symlink_metadata(&dest).is_ok() {
            log::debug!("{} already bundled", name.to_string_lossy());
            continue;
        }

        match tokio::fs::copy(&library, &dest).await {
            Ok(_) => {
                log::debug!("Bundled {}", library.display());
                copied.push(dest);
            }
            Err(e) => failures.push(format!("{}: {}", library.display(), e)),
        }
    }

    if !copied.is_empty() {
        log::info!("Bundled {} host libraries into usr/lib", copied.len());
    }

    let outcome = if failures.is_empty() {
        StepOutcome::Completed
    } else {
        let reason = format!("could not copy {}", failures.join("; "));
        log::info!("{}", reason);
        StepOutcome::Degraded(reason)
    };

    Ok(AssembleSummary {
        copied_libraries: copied,
        outcome,
    })
}

/// Resolved library paths from `ldd` output.
///
/// Entries without a resolved absolute path (the vDSO, the loader line,
/// `not found`) are dropped.
pub fn parse_ldd(output: &str) -> Vec<PathBuf> {
    output
        .lines()
        .filter_map(|line| line.split_once("=>"))
        .filter_map(|(_, resolved)| {
            let resolved = resolved.trim();
            let path = resolved
                .split_once(" (")
                .map_or(resolved, |(path, _)| path)
                .trim();
            path.starts_with('/').then(|| PathBuf::from(path))
        })
        .collect()
}

/// Whether a library file name is on the bundling allowlist.
pub fn is_bundled_library(file_name: &str) -> bool {
    LIBRARY_ALLOWLIST.is_match(file_name)
}
