//! Size reduction of the staged environment.
//!
//! Everything here is best effort. Absent paths are no-ops and individual
//! removal or strip failures are counted, never propagated.

use crate::bundler::{
    StepOutcome,
    settings::{BuildConfig, BuildMode},
    utils::{
        fs,
        process::{CommandRunner, Invocation},
    },
};
use std::path::{Path, PathBuf};

/// Paths under `usr/` the bundled application never needs.
const REMOVABLE_PATTERNS: &[&str] = &[
    // Standard library subsystems: tests, GUI bindings, venv tooling
    "lib/python3*/test",
    "lib/python3*/idlelib",
    "lib/python3*/tkinter",
    "lib/python3*/turtledemo",
    "lib/python3*/ensurepip",
    "lib/python3*/venv",
    "lib/python3*/lib2to3",
    "lib/tk*",
    "lib/tcl*",
    // Development files and documentation
    "include",
    "share/doc",
    "share/man",
    "share/info",
    "conda-meta",
    "pkgs",
    // Test data shipped by numeric packages
    "lib/python3*/site-packages/numpy/**/tests",
    "lib/python3*/site-packages/scipy/**/tests",
    "lib/python3*/site-packages/pandas/tests",
];

/// What the optimizer did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeSummary {
    /// Files and directories removed.
    pub removed: usize,
    /// Executables successfully stripped.
    pub stripped: usize,
    pub bytes_reclaimed: u64,
    pub outcome: StepOutcome,
}

/// Removes caches, tests, docs, headers and static archives from `usr/` and
/// strips debug symbols from ELF executables.
///
/// Cross builds keep their symbols: the host `strip` cannot read
/// target-architecture objects.
pub async fn optimize<R: CommandRunner>(config: &BuildConfig, runner: &R) -> OptimizeSummary {
    let usr_dir = config.usr_dir();

    let pass = {
        let usr_dir = usr_dir.clone();
        tokio::task::spawn_blocking(move || {
            let before = fs::tree_size(&usr_dir);
            let removal = remove_unneeded(&usr_dir);
            let executables = find_elf_executables(&usr_dir);
            (before, removal, executables)
        })
        .await
    };

    let (before, removal, executables) = match pass {
        Ok(pass) => pass,
        Err(e) => {
            let reason = format!("cleanup pass aborted: {e}");
            log::info!("{}", reason);
            return OptimizeSummary {
                removed: 0,
                stripped: 0,
                bytes_reclaimed: 0,
                outcome: StepOutcome::Degraded(reason),
            };
        }
    };

    let mut stripped = 0;
    let mut strip_failures = 0;
    let strippable: &[PathBuf] = match config.mode() {
        BuildMode::Native(_) => &executables,
        BuildMode::Cross { host, target } => {
            log::info!(
                "Not stripping {} {} executables with the {} host strip",
                executables.len(),
                target,
                host
            );
            &[]
        }
    };
    for path in strippable {
        let strip = Invocation::new("strip").arg("--strip-debug").arg(path);
        match runner.run(&strip).await {
            Ok(output) if output.success() => stripped += 1,
            Ok(output) => {
                log::debug!("strip {} exited with {:?}", path.display(), output.code);
                strip_failures += 1;
            }
            Err(e) => {
                log::debug!("strip {} failed: {}", path.display(), e);
                strip_failures += 1;
            }
        }
    }

    let after = fs::tree_size(&usr_dir);
    let bytes_reclaimed = before.saturating_sub(after);

    log::info!(
        "Removed {} paths, stripped {} executables, reclaimed {} bytes",
        removal.removed,
        stripped,
        bytes_reclaimed
    );

    let outcome = if removal.failures.is_empty() && strip_failures == 0 {
        StepOutcome::Completed
    } else {
        let mut parts = Vec::new();
        if !removal.failures.is_empty() {
            parts.push(format!("{} path(s) could not be removed", removal.failures.len()));
        }
        if strip_failures > 0 {
            parts.push(format!("{strip_failures} executable(s) could not be stripped"));
        }
        let reason = parts.join(", ");
        log::info!("{}", reason);
        StepOutcome::Degraded(reason)
    };

    OptimizeSummary {
        removed: removal.removed,
        stripped,
        bytes_reclaimed,
        outcome,
    }
}

#[derive(Debug, Default)]
struct Removal {
    removed: usize,
    failures: Vec<PathBuf>,
}

impl Removal {
    fn remove(&mut self, path: &Path) {
        match fs::remove_path(path) {
            Ok(true) => self.removed += 1,
            Ok(false) => {}
            Err(e) => {
                log::debug!("could not remove {}: {}", path.display(), e);
                self.failures.push(path.to_path_buf());
            }
        }
    }
}

fn remove_unneeded(usr_dir: &Path) -> Removal {
    let mut removal = Removal::default();

    let root = glob::Pattern::escape(&usr_dir.to_string_lossy());
    for pattern in REMOVABLE_PATTERNS {
        let Ok(matches) = glob::glob(&format!("{root}/{pattern}")) else {
            continue;
        };
        // Longest paths first so nested matches go before their parents
        let mut paths: Vec<PathBuf> = matches.filter_map(|m| m.ok()).collect();
        paths.sort_by_key(|p| std::cmp::Reverse(p.components().count()));
        for path in paths {
            removal.remove(&path);
        }
    }

    let mut caches = Vec::new();
    let mut walker = walkdir::WalkDir::new(usr_dir).follow_links(false).into_iter();
    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() && name == "__pycache__" {
            caches.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        } else if entry.file_type().is_file()
            && matches!(
                entry.path().extension().and_then(|e| e.to_str()),
                Some("pyc" | "pyo" | "a")
            )
        {
            caches.push(entry.path().to_path_buf());
        }
    }
    for path in caches {
        removal.remove(&path);
    }

    removal
}

/// Regular (non-symlink) executable files that are ELF objects.
fn find_elf_executables(usr_dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(usr_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.metadata().map(|m| fs::is_executable(&m)).unwrap_or(false))
        .filter(|e| is_elf(e.path()))
        .map(|e| e.into_path())
        .collect()
}

fn is_elf(path: &Path) -> bool {
    std::fs::File::open(path)
        .ok()
        .and_then(|mut file| goblin::peek(&mut file).ok())
        .is_some_and(|hint| matches!(hint, goblin::Hint::Elf(_)))
}
