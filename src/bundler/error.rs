//! Error types for build phases.
//!
//! Every fatal condition a phase can hit has its own variant so the CLI can
//! name the failing step. Tolerated conditions never become an [`Error`]; they
//! are reported through [`crate::bundler::StepOutcome`] instead.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for build phases.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal build errors.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more required host tools are not on `PATH`.
    #[error("missing required tool(s): {}", .tools.join(", "))]
    MissingTools {
        /// Names of the missing commands
        tools: Vec<String>,
    },

    /// Architecture string outside the supported set.
    #[error("unsupported architecture: {value} (supported: x86_64, aarch64)")]
    UnsupportedArch {
        /// The rejected value, as given
        value: String,
    },

    /// HTTP download failed.
    #[error("download of {url} failed: {reason}")]
    Download {
        /// URL that was requested
        url: String,
        /// Transport or status failure
        reason: String,
    },

    /// External command could not be started or exited nonzero.
    #[error("{step} failed: `{command}` {}{}", exit_code_label(.code), stderr_suffix(.stderr))]
    Command {
        /// Build phase that ran the command
        step: &'static str,
        /// Rendered command line
        command: String,
        /// Exit code, `None` when killed by a signal or not started
        code: Option<i32>,
        /// Last lines of stderr
        stderr: String,
    },

    /// Filesystem operation failed.
    #[error("{context} ({}): {source}", .path.display())]
    Fs {
        /// What was being done
        context: String,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Packaging finished but the artifact is not where it should be.
    #[error("artifact not found: {}{}", .path.display(), candidates_suffix(.candidates))]
    ArtifactMissing {
        /// Expected artifact path
        path: PathBuf,
        /// Other matching files found in the output directory
        candidates: Vec<PathBuf>,
    },

    /// The produced AppImage did not run.
    #[error("smoke test failed: {} --help {}", .path.display(), exit_code_label(.code))]
    SmokeTest {
        /// Artifact that was executed
        path: PathBuf,
        /// Exit code
        code: Option<i32>,
    },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Template rendering failed.
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Catch-all for conditions without a dedicated variant.
    #[error("{0}")]
    GenericError(String),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exited with code {code}"),
        None => "was terminated or could not be started".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr.trim_end())
    }
}

fn candidates_suffix(candidates: &[PathBuf]) -> String {
    if candidates.is_empty() {
        return String::new();
    }
    let listing: Vec<String> = candidates
        .iter()
        .map(|p| format!("  {}", p.display()))
        .collect();
    format!("\nother matching files:\n{}", listing.join("\n"))
}

/// Attach a description and path to IO errors.
pub trait ErrorExt<T> {
    /// Wraps the error as [`Error::Fs`].
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Turn an `Option` (or a foreign error) into a [`Error::GenericError`].
pub trait Context<T> {
    /// Converts to a generic error carrying `msg`.
    fn context(self, msg: &str) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(msg.to_string()))
    }
}

impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{msg}: {e}")))
    }
}

/// Return early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tools_lists_every_name() {
        let err = Error::MissingTools {
            tools: vec!["ldd".into(), "strip".into()],
        };
        assert_eq!(err.to_string(), "missing required tool(s): ldd, strip");
    }

    #[test]
    fn artifact_missing_lists_candidates() {
        let err = Error::ArtifactMissing {
            path: PathBuf::from("out/gogrepoc-abc1234-miniconda-x86_64.AppImage"),
            candidates: vec![PathBuf::from("out/gogrepoc-unknown-miniconda-x86_64.AppImage")],
        };
        let msg = err.to_string();
        assert!(msg.contains("other matching files"));
        assert!(msg.contains("gogrepoc-unknown-miniconda-x86_64.AppImage"));
    }

    #[test]
    fn fs_context_keeps_path() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = res.fs_context("reading payload", "/tmp/x").unwrap_err();
        assert!(err.to_string().starts_with("reading payload (/tmp/x)"));
    }
}
