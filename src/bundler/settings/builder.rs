//! Builder for constructing [`BuildConfig`].

use super::{AppImageSettings, Arch, BuildConfig, BuildFile, BuildMode, PackageSettings};
use crate::bundler::error::{Error, Result};
use crate::source::PayloadSource;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Default scratch directory, relative to the working directory.
pub const DEFAULT_SCRATCH_DIR: &str = "build-appimage";

/// Builder for [`BuildConfig`].
///
/// Building performs no filesystem or network side effects: an unsupported
/// architecture or a malformed setting is reported before anything is
/// created or downloaded.
///
/// # Examples
///
/// ```no_run
/// use gogrepoc_appimage::bundler::BuildConfigBuilder;
///
/// # fn example() -> gogrepoc_appimage::bundler::Result<()> {
/// let config = BuildConfigBuilder::new()
///     .target_arch(Some("arm64".into()))
///     .scratch_dir("/tmp/appimage-build")
///     .keep_build(true)
///     .build()?;
/// assert_eq!(config.target().as_str(), "aarch64");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct BuildConfigBuilder {
    package: PackageSettings,
    appimage: AppImageSettings,
    target_arch: Option<String>,
    host_arch: Option<Arch>,
    scratch_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    tools_dir: Option<PathBuf>,
    keep_build: bool,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces package settings and AppImage settings with those from a file.
    pub fn build_file(mut self, file: BuildFile) -> Self {
        self.package = file.package;
        self.appimage = file.appimage;
        self
    }

    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package = settings;
        self
    }

    pub fn appimage_settings(mut self, settings: AppImageSettings) -> Self {
        self.appimage = settings;
        self
    }

    /// Target architecture override, as given by the user.
    ///
    /// `None` or an empty string means "same as host".
    pub fn target_arch(mut self, value: Option<String>) -> Self {
        self.target_arch = value;
        self
    }

    /// Host architecture. Detected from the running process when unset.
    pub fn host_arch(mut self, arch: Arch) -> Self {
        self.host_arch = Some(arch);
        self
    }

    /// Default: `./build-appimage`
    pub fn scratch_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.scratch_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Default: current directory
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Default: `<user cache>/gogrepoc-appimage/tools`, or `<scratch>/tools`
    /// when the platform has no cache directory.
    pub fn tools_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.tools_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn keep_build(mut self, keep: bool) -> Self {
        self.keep_build = keep;
        self
    }

    /// Validates and resolves the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedArch`] for a target or host outside the supported set
    /// - [`Error::Config`] for malformed URLs, names or paths, and for a
    ///   scratch directory that would take the output or working directory
    ///   with it when removed
    pub fn build(self) -> Result<BuildConfig> {
        let host = match self.host_arch {
            Some(arch) => arch,
            None => Arch::host()?,
        };
        let target = match self.target_arch.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Arch::parse(value)?,
            _ => host,
        };
        let mode = BuildMode::new(host, target);

        validate_package(&self.package)?;
        for (name, value) in [
            ("miniconda_base_url", &self.appimage.miniconda_base_url),
            ("appimagetool_base_url", &self.appimage.appimagetool_base_url),
            ("github_api_base_url", &self.appimage.github_api_base_url),
            ("github_raw_base_url", &self.appimage.github_raw_base_url),
        ] {
            validate_url(name, value)?;
        }

        let payload = PayloadSource::parse(
            &self.appimage.payload_repo,
            &self.appimage.payload_branch,
            &self.appimage.payload_script,
        )?;

        let scratch_dir = absolute(
            self.scratch_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRATCH_DIR)),
        )?;
        let output_dir = absolute(self.output_dir.unwrap_or_else(|| PathBuf::from(".")))?;
        let working_dir = std::env::current_dir()
            .map_err(|e| Error::Config(format!("cannot read the working directory: {e}")))?;
        validate_layout(&scratch_dir, &output_dir, &working_dir)?;
        let tools_dir = match self.tools_dir {
            Some(dir) => absolute(dir)?,
            None => dirs::cache_dir()
                .map(|dir| dir.join("gogrepoc-appimage").join("tools"))
                .unwrap_or_else(|| scratch_dir.join("tools")),
        };

        Ok(BuildConfig::new(
            self.package,
            self.appimage,
            payload,
            mode,
            scratch_dir,
            output_dir,
            tools_dir,
            self.keep_build,
        ))
    }
}

fn validate_package(package: &PackageSettings) -> Result<()> {
    for (name, value) in [
        ("app_name", &package.app_name),
        ("variant", &package.variant),
        ("env_name", &package.env_name),
        ("python_version", &package.python_version),
        ("channel", &package.channel),
    ] {
        if value.trim().is_empty() {
            return Err(Error::Config(format!("{name} cannot be empty")));
        }
        if value.contains('/') || value.contains(char::is_whitespace) {
            return Err(Error::Config(format!(
                "{name} must not contain '/' or whitespace, got {value:?}"
            )));
        }
    }
    Ok(())
}

/// The scratch directory is deleted wholesale, so it must not hold the
/// artifact or the directory the build was started from.
fn validate_layout(scratch: &Path, output: &Path, working_dir: &Path) -> Result<()> {
    if output.starts_with(scratch) {
        return Err(Error::Config(format!(
            "output directory {} must not be inside the scratch directory {}",
            output.display(),
            scratch.display()
        )));
    }
    if working_dir.starts_with(scratch) {
        return Err(Error::Config(format!(
            "scratch directory {} must not contain the working directory {}",
            scratch.display(),
            working_dir.display()
        )));
    }
    Ok(())
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    let url = url::Url::parse(value)
        .map_err(|e| Error::Config(format!("{name} is not a valid URL ({value}): {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "{name} must use http or https, got {}",
            url.scheme()
        )));
    }
    Ok(())
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    path.absolutize()
        .map(|p| p.into_owned())
        .map_err(|e| Error::Config(format!("cannot resolve {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> BuildConfigBuilder {
        BuildConfigBuilder::new()
            .host_arch(Arch::X86_64)
            .scratch_dir("/tmp/scratch")
            .output_dir("/tmp/out")
            .tools_dir("/tmp/tools")
    }

    #[test]
    fn target_defaults_to_host() {
        let config = builder().build().unwrap();
        assert_eq!(config.mode(), BuildMode::Native(Arch::X86_64));
        assert_eq!(config.miniconda_installer_name(), "Miniconda3-latest-Linux-x86_64.sh");
    }

    #[test]
    fn empty_override_means_host() {
        let config = builder().target_arch(Some("  ".into())).build().unwrap();
        assert!(config.mode().is_native());
    }

    #[test]
    fn cross_target_uses_host_packager_and_target_runtime() {
        let config = builder().target_arch(Some("arm64".into())).build().unwrap();
        assert_eq!(
            config.mode(),
            BuildMode::Cross {
                host: Arch::X86_64,
                target: Arch::AArch64
            }
        );
        assert_eq!(config.appimagetool_name(), "appimagetool-x86_64.AppImage");
        assert!(config.miniconda_installer_url().ends_with("Miniconda3-latest-Linux-aarch64.sh"));
        assert_eq!(
            config.artifact_name("abc1234"),
            "gogrepoc-abc1234-miniconda-aarch64.AppImage"
        );
    }

    #[test]
    fn unsupported_target_fails() {
        let err = builder().target_arch(Some("riscv64".into())).build().unwrap_err();
        assert!(matches!(err, Error::UnsupportedArch { ref value } if value == "riscv64"));
    }

    #[test]
    fn layout_is_rooted_in_scratch() {
        let config = builder().build().unwrap();
        assert_eq!(config.app_dir(), PathBuf::from("/tmp/scratch/gogrepoc.AppDir"));
        assert_eq!(
            config.env_dir(),
            PathBuf::from("/tmp/scratch/miniconda/envs/gogrepoc")
        );
        assert_eq!(
            config.payload_path(),
            PathBuf::from("/tmp/scratch/gogrepoc.AppDir/usr/bin/gogrepoc.py")
        );
    }

    #[test]
    fn rejects_output_inside_scratch() {
        for output in ["/tmp/scratch", "/tmp/scratch/out"] {
            let err = builder().output_dir(output).build().unwrap_err();
            assert!(
                matches!(err, Error::Config(ref m) if m.contains("inside the scratch directory")),
                "{output}: {err}"
            );
        }
        // Sibling with a shared name prefix is fine
        builder().output_dir("/tmp/scratch-out").build().unwrap();
    }

    #[test]
    fn rejects_scratch_holding_working_directory() {
        let cwd = std::env::current_dir().unwrap();
        for scratch in [cwd, PathBuf::from(".")] {
            let err = builder().scratch_dir(&scratch).build().unwrap_err();
            assert!(
                matches!(err, Error::Config(ref m) if m.contains("working directory")),
                "{}: {err}",
                scratch.display()
            );
        }
    }

    #[test]
    fn default_layout_is_accepted() {
        let config = BuildConfigBuilder::new()
            .host_arch(Arch::X86_64)
            .tools_dir("/tmp/tools")
            .build()
            .unwrap();
        assert!(config.scratch_dir().ends_with(DEFAULT_SCRATCH_DIR));
        assert_eq!(config.output_dir(), std::env::current_dir().unwrap());
    }

    #[test]
    fn rejects_bad_urls_and_names() {
        let appimage = AppImageSettings {
            miniconda_base_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(matches!(
            builder().appimage_settings(appimage).build(),
            Err(Error::Config(_))
        ));

        let package = PackageSettings {
            env_name: "my env".into(),
            ..Default::default()
        };
        assert!(matches!(
            builder().package_settings(package).build(),
            Err(Error::Config(_))
        ));
    }
}
