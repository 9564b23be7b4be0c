//! AppImage-specific settings: download locations and host requirements.

use serde::Deserialize;

const MINICONDA_BASE_URL: &str = "https://repo.anaconda.com/miniconda";
const APPIMAGETOOL_BASE_URL: &str =
    "https://github.com/AppImage/appimagetool/releases/download/continuous";
const GITHUB_API_BASE_URL: &str = "https://api.github.com";
const GITHUB_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";

/// Where the runtime, packager and payload come from.
///
/// # Configuration
///
/// ```toml
/// [appimage]
/// payload_repo = "Kalanyr/gogrepoc"
/// payload_branch = "master"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppImageSettings {
    /// Base URL hosting `Miniconda3-latest-Linux-<arch>.sh`.
    pub miniconda_base_url: String,

    /// Base URL hosting `appimagetool-<arch>.AppImage`.
    pub appimagetool_base_url: String,

    /// GitHub REST API root, used for the revision lookup.
    pub github_api_base_url: String,

    /// Raw content root the payload script is fetched from.
    pub github_raw_base_url: String,

    /// Payload repository as `owner/repo`.
    pub payload_repo: String,

    /// Branch the payload and revision are taken from.
    pub payload_branch: String,

    /// Payload file name inside the repository.
    pub payload_script: String,

    /// Commands that must be on `PATH` before anything else runs.
    pub required_tools: Vec<String>,
}

impl Default for AppImageSettings {
    fn default() -> Self {
        Self {
            miniconda_base_url: MINICONDA_BASE_URL.into(),
            appimagetool_base_url: APPIMAGETOOL_BASE_URL.into(),
            github_api_base_url: GITHUB_API_BASE_URL.into(),
            github_raw_base_url: GITHUB_RAW_BASE_URL.into(),
            payload_repo: "Kalanyr/gogrepoc".into(),
            payload_branch: "master".into(),
            payload_script: "gogrepoc.py".into(),
            required_tools: ["bash", "ldd", "strip"].map(String::from).to_vec(),
        }
    }
}
