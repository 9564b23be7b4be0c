//! Configuration structures for the build.
//!
//! Defaults cover the stock gogrepoc build. A TOML file ([`BuildFile`]) can
//! override the package set and download locations; the CLI then layers the
//! target architecture and directories on top through [`BuildConfigBuilder`].

mod arch;
mod builder;
mod core;
mod file;
mod linux;
mod package;

pub use arch::{Arch, BuildMode};
pub use builder::{BuildConfigBuilder, DEFAULT_SCRATCH_DIR};
pub use core::BuildConfig;
pub use file::BuildFile;
pub use linux::AppImageSettings;
pub use package::PackageSettings;
