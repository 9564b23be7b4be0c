//! Application identity and Python package set.

use serde::Deserialize;

/// What gets installed into the conda environment, and what the result is called.
///
/// # Configuration
///
/// Every field can be overridden from the `[package]` table of the build
/// configuration file:
///
/// ```toml
/// [package]
/// python_version = "3.12"
/// optional = []
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PackageSettings {
    /// Application name used for the AppDir, desktop entry, icon and artifact.
    pub app_name: String,

    /// Build-variant tag embedded in the artifact name.
    pub variant: String,

    /// Python version requested from conda (`python=<version>`).
    pub python_version: String,

    /// Name of the conda environment created inside the runtime.
    pub env_name: String,

    /// Primary conda channel. Used with `--override-channels`.
    pub channel: String,

    /// Conda packages that must install.
    pub required: Vec<String>,

    /// Packages installed through pip after the environment exists.
    pub pip: Vec<String>,

    /// Conda packages whose installation may fail without failing the build.
    pub optional: Vec<String>,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            app_name: "gogrepoc".into(),
            variant: "miniconda".into(),
            python_version: "3.11".into(),
            env_name: "gogrepoc".into(),
            channel: "conda-forge".into(),
            required: ["requests", "html5lib", "python-dateutil", "pytz", "pyopenssl"]
                .map(String::from)
                .to_vec(),
            pip: vec!["html2text".into()],
            // GUI toolkit; gogrepoc runs headless without it
            optional: vec!["tk".into()],
        }
    }
}

impl PackageSettings {
    /// `python=<version>` package requirement.
    pub fn python_requirement(&self) -> String {
        format!("python={}", self.python_version)
    }

    /// `python<major>.<minor>` interpreter name inside `bin/`.
    pub fn versioned_interpreter(&self) -> String {
        let mut parts = self.python_version.split('.');
        match (parts.next(), parts.next()) {
            (Some(major), Some(minor)) => format!("python{major}.{minor}"),
            _ => format!("python{}", self.python_version),
        }
    }
}
