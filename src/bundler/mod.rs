//! AppImage build engine.
//!
//! Turns a [`BuildConfig`] into a finished, self-contained AppImage:
//!
//! 1. Check host tools and the architecture pair
//! 2. Resolve the payload revision
//! 3. Install a Miniconda runtime for the target architecture
//! 4. Create the conda environment and install packages
//! 5. Assemble the AppDir
//! 6. Install the payload script
//! 7. Write `AppRun`
//! 8. Write the desktop entry and icon
//! 9. Shrink the AppDir
//! 10. Pack it with appimagetool
//! 11. Run the result (native builds only)
//! 12. Remove the scratch directory
//!
//! [`Pipeline`] drives the sequence. Phases reach the network through
//! [`utils::http::Fetcher`] and external programs through
//! [`utils::process::CommandRunner`].

mod builder;
pub mod error;
pub mod platform;
mod report;
pub mod settings;
pub mod utils;

pub use builder::{BuildSummary, Pipeline, checksum, phase, tool_detection};
pub use error::{Context, Error, ErrorExt, Result};
pub use report::{BuildReport, SoftFailure, StepOutcome};
pub use settings::{
    AppImageSettings, Arch, BuildConfig, BuildConfigBuilder, BuildFile, BuildMode,
    DEFAULT_SCRATCH_DIR, PackageSettings,
};
