//! Builds a self-contained AppImage of the gogrepoc GOG.com downloader.
//!
//! The image carries its own Miniconda Python runtime, so it runs on any
//! Linux distribution without a system Python. The build can target
//! x86_64 or aarch64 from either host; cross builds skip the final
//! smoke test.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;
pub mod source;

// Re-export commonly used types
pub use error::{BuildError, CliError, Result};
