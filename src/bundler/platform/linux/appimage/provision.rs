//! Miniconda runtime download and installation.

use crate::bundler::{
    error::{ErrorExt, Result},
    settings::BuildConfig,
    utils::{
        fs,
        http::{self, Fetcher},
        process::{CommandRunner, Invocation, run_checked},
    },
};
use std::path::PathBuf;

const STEP: &str = "runtime installation";

/// Downloads the Miniconda installer for the target architecture (if not
/// already downloaded) and installs it into a fresh runtime prefix.
///
/// Returns the install prefix.
pub async fn provision_runtime<F: Fetcher, R: CommandRunner>(
    config: &BuildConfig,
    fetcher: &F,
    runner: &R,
) -> Result<PathBuf> {
    let installer = config.downloads_dir().join(config.miniconda_installer_name());
    let downloaded =
        http::download_if_missing(fetcher, &config.miniconda_installer_url(), &installer).await?;
    if !downloaded {
        log::info!("Reusing {}", installer.display());
    }

    let prefix = config.runtime_prefix();
    // The installer refuses to run into an existing prefix
    fs::remove_dir_all(&prefix).await?;
    if let Some(parent) = prefix.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating scratch directory", parent)?;
    }

    log::info!("Installing Miniconda into {}", prefix.display());
    let install = Invocation::new("bash")
        .arg(&installer)
        .arg("-b")
        .arg("-p")
        .arg(&prefix);
    run_checked(runner, STEP, &install).await?;

    Ok(prefix)
}
