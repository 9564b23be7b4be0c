//! CPU architecture types and utilities.

use crate::bundler::error::{Error, Result};
use std::fmt;

/// CPU architecture an AppImage can be built for.
///
/// Only the two architectures Miniconda and appimagetool both publish
/// builds for are representable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit)
    X86_64,
    /// AArch64 / ARM64 (64-bit)
    AArch64,
}

impl Arch {
    /// Parses an architecture name, normalizing known aliases.
    ///
    /// `amd64` maps to `x86_64` and `arm64` to `aarch64`; matching ignores
    /// case and surrounding whitespace. Anything else is
    /// [`Error::UnsupportedArch`].
    ///
    /// # Examples
    ///
    /// ```
    /// use gogrepoc_appimage::bundler::Arch;
    ///
    /// assert_eq!(Arch::parse("arm64").unwrap(), Arch::AArch64);
    /// assert!(Arch::parse("riscv64").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "aarch64" | "arm64" => Ok(Self::AArch64),
            _ => Err(Error::UnsupportedArch {
                value: value.to_string(),
            }),
        }
    }

    /// Architecture of the running host.
    pub fn host() -> Result<Self> {
        Self::parse(std::env::consts::ARCH)
    }

    /// Canonical name, as used in Miniconda and appimagetool file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::AArch64 => "aarch64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the build runs on the architecture it targets.
///
/// Decided once when the configuration is built; the library scan and the
/// smoke test dispatch on it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Host and target are the same.
    Native(Arch),
    /// Target differs from host; the artifact cannot be executed here.
    Cross {
        /// Architecture of the machine running the build
        host: Arch,
        /// Architecture of the produced AppImage
        target: Arch,
    },
}

impl BuildMode {
    /// Classifies a host/target pair.
    pub fn new(host: Arch, target: Arch) -> Self {
        if host == target {
            Self::Native(host)
        } else {
            Self::Cross { host, target }
        }
    }

    /// Architecture of the produced artifact.
    pub fn target(&self) -> Arch {
        match *self {
            Self::Native(arch) => arch,
            Self::Cross { target, .. } => target,
        }
    }

    /// Architecture of the build machine.
    pub fn host(&self) -> Arch {
        match *self {
            Self::Native(arch) => arch,
            Self::Cross { host, .. } => host,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_normalize_to_canonical_names() {
        for (input, expected) in [
            ("x86_64", Arch::X86_64),
            ("amd64", Arch::X86_64),
            ("AMD64", Arch::X86_64),
            ("aarch64", Arch::AArch64),
            ("arm64", Arch::AArch64),
            (" arm64\n", Arch::AArch64),
        ] {
            assert_eq!(Arch::parse(input).unwrap(), expected, "input {input:?}");
        }
    }

    #[test]
    fn unknown_values_are_rejected_with_their_name() {
        for input in ["riscv64", "i686", "armhf", ""] {
            match Arch::parse(input) {
                Err(Error::UnsupportedArch { value }) => assert_eq!(value, input),
                other => panic!("expected UnsupportedArch for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn build_mode_classification() {
        assert!(BuildMode::new(Arch::X86_64, Arch::X86_64).is_native());
        let cross = BuildMode::new(Arch::X86_64, Arch::AArch64);
        assert!(!cross.is_native());
        assert_eq!(cross.host(), Arch::X86_64);
        assert_eq!(cross.target(), Arch::AArch64);
    }
}
