//! appimagetool invocation.

use crate::bundler::{
    error::{ErrorExt, Result},
    settings::BuildConfig,
    utils::{
        fs,
        http::{Fetcher, download_if_missing},
        process::{CommandRunner, Invocation, run_checked},
    },
};
use std::path::PathBuf;

/// Fetches appimagetool for the host into the tools cache if needed and
/// returns its path, executable.
pub async fn ensure_appimagetool<F: Fetcher>(config: &BuildConfig, fetcher: &F) -> Result<PathBuf> {
    let tool = config.tools_dir().join(config.appimagetool_name());
    if download_if_missing(fetcher, &config.appimagetool_url(), &tool).await? {
        log::info!("Cached {}", tool.display());
    }
    fs::make_executable(&tool).await?;
    Ok(tool)
}

/// Packs the AppDir into `<output>/<artifact>` and returns the artifact path.
///
/// appimagetool writes into the scratch directory first; the finished image
/// is then moved into the output directory and made executable.
pub async fn package_app_image<F: Fetcher, R: CommandRunner>(
    config: &BuildConfig,
    fetcher: &F,
    runner: &R,
    revision: &str,
) -> Result<PathBuf> {
    let tool = ensure_appimagetool(config, fetcher).await?;
    let artifact_name = config.artifact_name(revision);
    let staged = config.scratch_dir().join(&artifact_name);
    fs::remove_path(&staged).fs_context("removing stale artifact", &staged)?;

    log::info!("Packing {} for {}", config.app_dir().display(), config.target());
    let invocation = Invocation::new(&tool)
        .env("ARCH", config.target().as_str())
        // No FUSE needed to run the tool itself
        .env("APPIMAGE_EXTRACT_AND_RUN", "1")
        .arg("--no-appstream")
        .arg(config.app_dir())
        .arg(&staged);
    run_checked(runner, "packaging", &invocation).await?;

    let artifact = config.output_dir().join(&artifact_name);
    if staged != artifact {
        fs::remove_path(&artifact).fs_context("removing previous artifact", &artifact)?;
        fs::move_file(&staged, &artifact).await?;
    }
    fs::make_executable(&artifact).await?;

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::utils::process::CommandOutput;
    use crate::bundler::{Arch, BuildConfigBuilder, Error};
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ToolFetcher {
        downloads: Mutex<Vec<String>>,
    }

    impl Fetcher for ToolFetcher {
        async fn get_text(&self, url: &str) -> Result<String> {
            Err(Error::Download {
                url: url.into(),
                reason: "offline".into(),
            })
        }

        async fn download(&self, url: &str, dest: &Path) -> Result<()> {
            self.downloads.lock().unwrap().push(url.to_string());
            std::fs::write(dest, b"tool").unwrap();
            Ok(())
        }
    }

    /// Writes the output path argument like appimagetool would.
    #[derive(Default)]
    struct PackRunner {
        calls: Mutex<Vec<Invocation>>,
        exit: i32,
    }

    impl CommandRunner for PackRunner {
        async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
            self.calls.lock().unwrap().push(invocation.clone());
            if self.exit != 0 {
                return Ok(CommandOutput::failed(self.exit, "appimagetool: mksquashfs failed"));
            }
            let out = invocation.get_args().last().unwrap();
            std::fs::write(out, b"\x7fELF image").unwrap();
            Ok(CommandOutput::ok(""))
        }
    }

    fn config(root: &Path, target: Option<&str>) -> BuildConfig {
        BuildConfigBuilder::new()
            .host_arch(Arch::X86_64)
            .target_arch(target.map(String::from))
            .scratch_dir(root.join("scratch"))
            .output_dir(root.join("out"))
            .tools_dir(root.join("tools"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn packs_into_output_dir_with_target_arch() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let config = config(tmp.path(), Some("aarch64"));
        std::fs::create_dir_all(config.app_dir()).unwrap();
        let fetcher = ToolFetcher::default();
        let runner = PackRunner::default();

        let artifact = package_app_image(&config, &fetcher, &runner, "1a2b3c4")
            .await
            .unwrap();

        assert_eq!(
            artifact,
            tmp.path().join("out/gogrepoc-1a2b3c4-miniconda-aarch64.AppImage")
        );
        assert!(artifact.is_file());
        assert!(!config.scratch_dir().join(artifact.file_name().unwrap()).exists());
        let mode = std::fs::metadata(&artifact).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);

        // Host-arch tool, target-arch payload
        let downloads = fetcher.downloads.lock().unwrap();
        assert!(downloads[0].ends_with("/appimagetool-x86_64.AppImage"));
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].get_env("ARCH").unwrap(), "aarch64");
        assert_eq!(calls[0].get_env("APPIMAGE_EXTRACT_AND_RUN").unwrap(), "1");
        assert_eq!(calls[0].args_lossy()[0], "--no-appstream");
    }

    #[tokio::test]
    async fn cached_tool_is_not_downloaded_again() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config(tmp.path(), None);
        let fetcher = ToolFetcher::default();

        ensure_appimagetool(&config, &fetcher).await.unwrap();
        ensure_appimagetool(&config, &fetcher).await.unwrap();

        assert_eq!(fetcher.downloads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn tool_failure_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config(tmp.path(), None);
        let runner = PackRunner {
            exit: 2,
            ..Default::default()
        };

        let err = package_app_image(&config, &ToolFetcher::default(), &runner, "unknown")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Command { step: "packaging", code: Some(2), .. }));
    }
}
