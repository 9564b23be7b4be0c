//! Command line argument parsing.

use crate::error::CliError;
use clap::Parser;
use std::path::PathBuf;

/// Builds a self-contained gogrepoc AppImage
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gogrepoc-appimage",
    version,
    about = "Builds a self-contained gogrepoc AppImage on a Miniconda Python runtime",
    long_about = "Builds a self-contained gogrepoc AppImage on a Miniconda Python runtime.

Installs Miniconda for the target architecture into a scratch directory, creates
a conda environment with gogrepoc's dependencies, stages it as an AppDir with the
latest gogrepoc.py and packs it with appimagetool.

Usage:
  gogrepoc-appimage
  gogrepoc-appimage --keep-build
  TARGET_ARCH=aarch64 gogrepoc-appimage --output-dir dist

Exit code 0 = the AppImage exists in the output directory."
)]
pub struct Args {
    /// Remove the scratch directory before building
    #[arg(long)]
    pub clean: bool,

    /// Keep the scratch directory after a successful build
    #[arg(long)]
    pub keep_build: bool,

    /// Target architecture: x86_64 (amd64) or aarch64 (arm64). Defaults to the host
    #[arg(long, env = "TARGET_ARCH", value_name = "ARCH")]
    pub target_arch: Option<String>,

    /// Scratch directory for downloads, the runtime and the AppDir
    #[arg(long, value_name = "DIR", default_value = crate::bundler::DEFAULT_SCRATCH_DIR)]
    pub scratch_dir: PathBuf,

    /// Directory the finished AppImage is moved into
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Cache directory for appimagetool [default: <user cache>/gogrepoc-appimage/tools]
    #[arg(long, value_name = "DIR")]
    pub tools_dir: Option<PathBuf>,

    /// TOML file overriding the package set and download locations
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show extra detail in console output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Checks arguments that clap cannot express.
    pub fn validate(&self) -> Result<(), CliError> {
        for (flag, dir) in [
            ("--scratch-dir", Some(&self.scratch_dir)),
            ("--output-dir", Some(&self.output_dir)),
            ("--tools-dir", self.tools_dir.as_ref()),
        ] {
            if let Some(dir) = dir
                && dir.exists()
                && !dir.is_dir()
            {
                return Err(CliError::InvalidArguments {
                    reason: format!("{flag} {} is not a directory", dir.display()),
                });
            }
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_documented_layout() {
        let args = Args::try_parse_from(["gogrepoc-appimage"]).unwrap();
        assert!(!args.clean);
        assert!(!args.keep_build);
        assert_eq!(args.scratch_dir, PathBuf::from("build-appimage"));
        assert_eq!(args.output_dir, PathBuf::from("."));
        assert!(args.tools_dir.is_none());
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from([
            "gogrepoc-appimage",
            "--clean",
            "--keep-build",
            "--target-arch",
            "arm64",
            "--output-dir",
            "dist",
        ])
        .unwrap();
        assert!(args.clean);
        assert!(args.keep_build);
        assert_eq!(args.target_arch.as_deref(), Some("arm64"));
        assert_eq!(args.output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn file_as_output_dir_is_rejected() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let args = Args::try_parse_from([
            "gogrepoc-appimage",
            "--output-dir",
            tmp.path().to_str().unwrap(),
        ])
        .unwrap();

        assert!(matches!(
            args.validate(),
            Err(CliError::InvalidArguments { ref reason }) if reason.starts_with("--output-dir")
        ));
    }
}
