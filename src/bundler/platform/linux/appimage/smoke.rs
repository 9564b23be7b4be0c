//! Post-build check of the finished AppImage.

use crate::bundler::{
    StepOutcome,
    error::{Error, Result},
    settings::{BuildConfig, BuildMode},
    utils::process::{CommandRunner, Invocation},
};
use std::path::{Path, PathBuf};

/// Lines of `--help` output echoed to the log.
pub const HELP_PREVIEW_LINES: usize = 20;

/// Runs `<artifact> --help` on native builds.
///
/// A cross-built image cannot run on this host, so the check is skipped.
/// A missing artifact or a nonzero exit fails the build.
pub async fn smoke_test<R: CommandRunner>(
    config: &BuildConfig,
    runner: &R,
    artifact: &Path,
) -> Result<StepOutcome> {
    if let BuildMode::Cross { host, target } = config.mode() {
        let reason = format!("{target} image cannot run on a {host} host");
        log::info!("Skipping smoke test: {}", reason);
        return Ok(StepOutcome::Skipped(reason));
    }

    if !artifact.is_file() {
        return Err(Error::ArtifactMissing {
            path: artifact.to_path_buf(),
            candidates: find_candidates(config),
        });
    }

    let invocation = Invocation::new(artifact)
        .arg("--help")
        .env("APPIMAGE_EXTRACT_AND_RUN", "1");
    let output = runner.run(&invocation).await.map_err(|e| {
        log::error!("could not start {}: {}", artifact.display(), e);
        Error::SmokeTest {
            path: artifact.to_path_buf(),
            code: None,
        }
    })?;

    for line in help_preview(&output.stdout) {
        log::info!("  {}", line);
    }

    if !output.success() {
        return Err(Error::SmokeTest {
            path: artifact.to_path_buf(),
            code: output.code,
        });
    }

    log::info!("Smoke test passed");
    Ok(StepOutcome::Completed)
}

/// First [`HELP_PREVIEW_LINES`] lines of `text`.
pub fn help_preview(text: &str) -> impl Iterator<Item = &str> {
    text.lines().take(HELP_PREVIEW_LINES)
}

/// AppImages in the output directory that match this app's artifact naming.
fn find_candidates(config: &BuildConfig) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&config.output_dir().to_string_lossy()),
        config.artifact_pattern()
    );
    let mut candidates: Vec<PathBuf> = glob::glob(&pattern)
        .map(|paths| paths.filter_map(|p| p.ok()).collect())
        .unwrap_or_default();
    candidates.sort();
    candidates
}
