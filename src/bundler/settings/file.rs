//! Optional TOML build configuration file.

use super::{AppImageSettings, PackageSettings};
use crate::bundler::error::{Error, ErrorExt, Result};
use serde::Deserialize;
use std::path::Path;

/// Contents of a build configuration file.
///
/// Both tables are optional and every key inside them falls back to the
/// built-in default, so an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildFile {
    pub package: PackageSettings,
    pub appimage: AppImageSettings,
}

impl BuildFile {
    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).fs_context("reading build configuration", path)?;
        Self::parse(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parses configuration text.
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(BuildFile::parse("").unwrap(), BuildFile::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let file = BuildFile::parse(
            r#"
            [package]
            python_version = "3.12"
            optional = []

            [appimage]
            payload_branch = "dev"
            "#,
        )
        .unwrap();

        assert_eq!(file.package.python_version, "3.12");
        assert!(file.package.optional.is_empty());
        assert_eq!(file.package.env_name, "gogrepoc");
        assert_eq!(file.appimage.payload_branch, "dev");
        assert_eq!(file.appimage.payload_repo, "Kalanyr/gogrepoc");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(BuildFile::parse("[package]\npyhton_version = \"3.12\"\n").is_err());
    }
}
