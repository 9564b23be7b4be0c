//! Core build configuration.

use super::{AppImageSettings, Arch, BuildMode, PackageSettings};
use crate::source::PayloadSource;
use std::path::{Path, PathBuf};

/// Resolved configuration for one build.
///
/// Constructed via [`super::BuildConfigBuilder`], which performs all
/// validation. Once built, the architecture pair and every path are fixed
/// for the rest of the run.
///
/// # Layout
///
/// ```text
/// <scratch>/
///   downloads/                  installer downloads, kept between phases
///   miniconda/                  runtime install prefix
///     envs/<env>/               isolated environment
///   <App>.AppDir/               staging tree handed to appimagetool
///     AppRun
///     usr/{bin,lib,share}
/// ```
#[derive(Clone, Debug)]
pub struct BuildConfig {
    package: PackageSettings,
    appimage: AppImageSettings,
    payload: PayloadSource,
    mode: BuildMode,
    scratch_dir: PathBuf,
    output_dir: PathBuf,
    tools_dir: PathBuf,
    keep_build: bool,
}

impl BuildConfig {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        package: PackageSettings,
        appimage: AppImageSettings,
        payload: PayloadSource,
        mode: BuildMode,
        scratch_dir: PathBuf,
        output_dir: PathBuf,
        tools_dir: PathBuf,
        keep_build: bool,
    ) -> Self {
        Self {
            package,
            appimage,
            payload,
            mode,
            scratch_dir,
            output_dir,
            tools_dir,
            keep_build,
        }
    }

    pub fn package(&self) -> &PackageSettings {
        &self.package
    }

    pub fn appimage(&self) -> &AppImageSettings {
        &self.appimage
    }

    pub fn payload(&self) -> &PayloadSource {
        &self.payload
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn target(&self) -> Arch {
        self.mode.target()
    }

    pub fn host(&self) -> Arch {
        self.mode.host()
    }

    /// Whether the scratch directory survives the build.
    pub fn keep_build(&self) -> bool {
        self.keep_build
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Directory the finished artifact is moved into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Cache for the packaging tool; outlives the scratch directory.
    pub fn tools_dir(&self) -> &Path {
        &self.tools_dir
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.scratch_dir.join("downloads")
    }

    /// Install prefix of the Miniconda runtime.
    pub fn runtime_prefix(&self) -> PathBuf {
        self.scratch_dir.join("miniconda")
    }

    pub fn conda_bin(&self) -> PathBuf {
        self.runtime_prefix().join("bin").join("conda")
    }

    /// Root of the named conda environment.
    pub fn env_dir(&self) -> PathBuf {
        self.runtime_prefix().join("envs").join(&self.package.env_name)
    }

    pub fn app_dir(&self) -> PathBuf {
        self.scratch_dir
            .join(format!("{}.AppDir", self.package.app_name))
    }

    pub fn usr_dir(&self) -> PathBuf {
        self.app_dir().join("usr")
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.usr_dir().join("bin")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.usr_dir().join("lib")
    }

    /// Path of the payload script inside the staging tree.
    pub fn payload_path(&self) -> PathBuf {
        self.bin_dir().join(&self.payload.script)
    }

    /// `Miniconda3-latest-Linux-<target>.sh`
    pub fn miniconda_installer_name(&self) -> String {
        format!("Miniconda3-latest-Linux-{}.sh", self.target())
    }

    pub fn miniconda_installer_url(&self) -> String {
        format!(
            "{}/{}",
            self.appimage.miniconda_base_url.trim_end_matches('/'),
            self.miniconda_installer_name()
        )
    }

    /// `appimagetool-<host>.AppImage`; the tool runs on the build machine.
    pub fn appimagetool_name(&self) -> String {
        format!("appimagetool-{}.AppImage", self.host())
    }

    pub fn appimagetool_url(&self) -> String {
        format!(
            "{}/{}",
            self.appimage.appimagetool_base_url.trim_end_matches('/'),
            self.appimagetool_name()
        )
    }

    pub fn revision_api_url(&self) -> String {
        self.payload
            .commits_api_url(&self.appimage.github_api_base_url)
    }

    pub fn payload_url(&self) -> String {
        self.payload.raw_url(&self.appimage.github_raw_base_url)
    }

    /// `<app>-<revision>-<variant>-<target>.AppImage`
    pub fn artifact_name(&self, revision: &str) -> String {
        format!(
            "{}-{}-{}-{}.AppImage",
            self.package.app_name,
            revision,
            self.package.variant,
            self.target()
        )
    }

    /// Glob matching any artifact this configuration could have produced.
    pub fn artifact_pattern(&self) -> String {
        format!("{}-*.AppImage", self.package.app_name)
    }
}
