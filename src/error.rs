//! Top-level error type for the command line tool.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Everything that can end a run with a nonzero exit code
#[derive(Error, Debug)]
pub enum BuildError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors outside any build phase, e.g. writing to the console
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Build phase errors
    #[error(transparent)]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl BuildError {
    /// Hints printed under the error message.
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error;

        match self {
            Self::Bundler(Error::MissingTools { .. }) => vec![
                "Install the missing tools (bash, binutils for strip, libc-bin for ldd)".into(),
            ],
            Self::Bundler(Error::UnsupportedArch { .. }) => {
                vec!["Set TARGET_ARCH to x86_64 or aarch64 (aliases: amd64, arm64)".into()]
            }
            Self::Bundler(Error::Download { .. }) => {
                vec!["Check network access; downloads are attempted once".into()]
            }
            Self::Bundler(Error::Command { .. } | Error::SmokeTest { .. }) => vec![
                "Rerun with --keep-build and RUST_LOG=debug to inspect the scratch directory"
                    .into(),
            ],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundler_errors_display_unwrapped() {
        let err = BuildError::from(crate::bundler::Error::UnsupportedArch {
            value: "riscv64".into(),
        });
        assert_eq!(
            err.to_string(),
            "unsupported architecture: riscv64 (supported: x86_64, aarch64)"
        );
        assert_eq!(err.recovery_suggestions().len(), 1);
    }
}
