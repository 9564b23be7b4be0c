//! AppImage build phases.
//!
//! Each submodule implements one phase of the build and takes the resolved
//! [`BuildConfig`] plus whichever of the network ([`Fetcher`]) and process
//! ([`CommandRunner`]) seams it needs. Sequencing lives in
//! [`crate::bundler::Pipeline`].
//!
//! [`Fetcher`]: crate::bundler::utils::http::Fetcher
//! [`CommandRunner`]: crate::bundler::utils::process::CommandRunner

mod assemble;
mod desktop;
mod launcher;
mod optimize;
mod package;
mod packages;
mod payload;
mod provision;
mod smoke;

pub use assemble::{AssembleSummary, assemble_app_dir, is_bundled_library, parse_ldd};
pub use desktop::{MetadataFiles, render_desktop_entry, render_icon, write_metadata};
pub use launcher::{render_launcher, workdir_var, write_launcher};
pub use optimize::{OptimizeSummary, optimize};
pub use package::{ensure_appimagetool, package_app_image};
pub use packages::install_packages;
pub use payload::install_payload;
pub use provision::provision_runtime;
pub use smoke::{HELP_PREVIEW_LINES, help_preview, smoke_test};

use crate::bundler::{Result, settings::BuildConfig, utils::fs};

/// Removes the scratch directory unless the build was asked to keep it.
///
/// Safe to call repeatedly and when nothing was ever created. Returns
/// `true` if something was removed.
pub async fn cleanup(config: &BuildConfig) -> Result<bool> {
    if config.keep_build() {
        log::info!("Keeping build directory {}", config.scratch_dir().display());
        return Ok(false);
    }
    let removed = fs::remove_dir_all(config.scratch_dir()).await?;
    if removed {
        log::info!("Removed build directory {}", config.scratch_dir().display());
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{Arch, BuildConfigBuilder};

    #[tokio::test]
    async fn cleanup_is_idempotent_and_respects_keep_build() {
        let tmp = tempfile::TempDir::new().unwrap();
        let scratch = tmp.path().join("scratch");
        std::fs::create_dir_all(scratch.join("downloads")).unwrap();

        let keep = BuildConfigBuilder::new()
            .host_arch(Arch::X86_64)
            .scratch_dir(&scratch)
            .tools_dir(tmp.path().join("tools"))
            .keep_build(true)
            .build()
            .unwrap();
        assert!(!cleanup(&keep).await.unwrap());
        assert!(scratch.exists());

        let discard = BuildConfigBuilder::new()
            .host_arch(Arch::X86_64)
            .scratch_dir(&scratch)
            .tools_dir(tmp.path().join("tools"))
            .build()
            .unwrap();
        assert!(cleanup(&discard).await.unwrap());
        assert!(!scratch.exists());
        assert!(!cleanup(&discard).await.unwrap());
    }
}
