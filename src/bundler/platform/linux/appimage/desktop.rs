//! Desktop entry and icon generation.

use crate::bundler::{
    error::{ErrorExt, Result},
    settings::BuildConfig,
    utils::{fs, template},
};
use crate::metadata::VersionInfo;
use serde::Serialize;
use std::path::PathBuf;

const DESKTOP_TEMPLATE: &str = "\
[Desktop Entry]
Type=Application
Name={{app_name}}
Comment=Download and manage a GOG.com game library (revision {{revision}})
Exec={{app_name}}
Icon={{app_name}}
Categories=Utility;Network;
Terminal=true
X-AppImage-Version={{app_version}}-{{revision}}
";

const ICON_TEMPLATE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="256" height="256" viewBox="0 0 256 256">
  <rect width="256" height="256" rx="32" fill="#5b2a86"/>
  <text x="128" y="118" font-family="sans-serif" font-size="44" font-weight="bold" fill="#ffffff" text-anchor="middle">{{app_name}}</text>
  <text x="128" y="184" font-family="monospace" font-size="30" fill="#e4d7f2" text-anchor="middle">{{revision}}</text>
</svg>
"##;

#[derive(Serialize)]
struct MetadataData<'a> {
    app_name: &'a str,
    revision: &'a str,
    app_version: &'a str,
}

/// Paths written by [`write_metadata`].
#[derive(Debug, Clone)]
pub struct MetadataFiles {
    pub desktop: PathBuf,
    pub icon: PathBuf,
}

pub fn render_desktop_entry(config: &BuildConfig, versions: &VersionInfo) -> Result<String> {
    template::render(DESKTOP_TEMPLATE, &data(config, versions))
}

pub fn render_icon(config: &BuildConfig, versions: &VersionInfo) -> Result<String> {
    template::render(ICON_TEMPLATE, &data(config, versions))
}

fn data<'a>(config: &'a BuildConfig, versions: &'a VersionInfo) -> MetadataData<'a> {
    MetadataData {
        app_name: &config.package().app_name,
        revision: &versions.revision,
        app_version: &versions.app_version,
    }
}

/// Writes `<app>.desktop` and `<app>.svg` at the AppDir root, copies them to
/// `usr/share/applications` and the hicolor scalable icon directory, and
/// points `.DirIcon` at the icon.
pub async fn write_metadata(config: &BuildConfig, versions: &VersionInfo) -> Result<MetadataFiles> {
    let app_dir = config.app_dir();
    let app_name = &config.package().app_name;
    let desktop_name = format!("{app_name}.desktop");
    let icon_name = format!("{app_name}.svg");

    let desktop = app_dir.join(&desktop_name);
    let icon = app_dir.join(&icon_name);
    fs::write_file(&desktop, render_desktop_entry(config, versions)?).await?;
    fs::write_file(&icon, render_icon(config, versions)?).await?;

    let share = config.usr_dir().join("share");
    fs::copy_file(&desktop, &share.join("applications").join(&desktop_name)).await?;
    fs::copy_file(
        &icon,
        &share
            .join("icons/hicolor/scalable/apps")
            .join(&icon_name),
    )
    .await?;

    let dir_icon = app_dir.join(".DirIcon");
    fs::remove_path(&dir_icon).fs_context("removing old .DirIcon", &dir_icon)?;
    tokio::fs::symlink(&icon_name, &dir_icon)
        .await
        .fs_context("creating .DirIcon", &dir_icon)?;

    log::info!(
        "Wrote desktop metadata for {} {} (revision {})",
        app_name,
        versions.app_version,
        versions.revision
    );

    Ok(MetadataFiles { desktop, icon })
}
