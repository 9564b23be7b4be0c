//! Payload script installation.

use crate::bundler::{
    error::Result,
    settings::BuildConfig,
    utils::{fs, http::Fetcher},
};
use std::path::PathBuf;

/// Downloads the payload script into `usr/bin`, replacing any previous copy,
/// and marks it executable.
///
/// There is no checksum to verify against; the script is trusted as served
/// from its repository.
pub async fn install_payload<F: Fetcher>(config: &BuildConfig, fetcher: &F) -> Result<PathBuf> {
    let dest = config.payload_path();
    fs::create_dir_all(&config.bin_dir(), false).await?;

    fetcher.download(&config.payload_url(), &dest).await?;
    fs::make_executable(&dest).await?;

    log::info!("Installed payload {}", dest.display());
    Ok(dest)
}
