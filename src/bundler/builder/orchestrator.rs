//! Build orchestration.
//!
//! [`Pipeline`] runs the build phases in their fixed order against one
//! [`BuildConfig`], threading the network and process seams through each
//! phase and collecting tolerated failures in a [`BuildReport`].

use super::{
    checksum::calculate_sha256,
    tool_detection::check_required_tools,
};
use crate::{
    bundler::{
        BuildConfig, BuildMode, BuildReport, Result, StepOutcome,
        error::ErrorExt,
        platform::linux::appimage,
        utils::{http::Fetcher, process::CommandRunner},
    },
    cli::{OutputManager, format_bytes},
    metadata::{self, UNKNOWN, VersionInfo},
};
use std::path::PathBuf;

/// Phase names as they appear in the build report.
pub mod phase {
    pub const DEPENDENCIES: &str = "dependency check";
    pub const VERSION: &str = "version resolution";
    pub const RUNTIME: &str = "runtime provisioning";
    pub const PACKAGES: &str = "package installation";
    pub const ASSEMBLE: &str = "AppDir assembly";
    pub const PAYLOAD: &str = "payload installation";
    pub const LAUNCHER: &str = "launcher generation";
    pub const METADATA: &str = "metadata generation";
    pub const OPTIMIZE: &str = "size optimization";
    pub const PACKAGE: &str = "packaging";
    pub const SMOKE_TEST: &str = "smoke test";
    pub const CLEANUP: &str = "cleanup";
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Final artifact location in the output directory.
    pub artifact: PathBuf,
    pub versions: VersionInfo,
    /// Artifact size in bytes.
    pub size: u64,
    /// Hex SHA-256 of the artifact.
    pub checksum: String,
    /// Host libraries copied into the AppDir (always zero for cross builds).
    pub copied_libraries: usize,
    pub bytes_reclaimed: u64,
    pub report: BuildReport,
}

/// Runs every build phase in order.
///
/// # Examples
///
/// ```no_run
/// use gogrepoc_appimage::bundler::{BuildConfigBuilder, Pipeline};
/// use gogrepoc_appimage::bundler::utils::{http::HttpFetcher, process::SystemRunner};
/// use gogrepoc_appimage::cli::OutputManager;
///
/// # async fn example() -> gogrepoc_appimage::bundler::Result<()> {
/// let config = BuildConfigBuilder::new().build()?;
/// let fetcher = HttpFetcher::new()?;
/// let output = OutputManager::default();
///
/// let summary = Pipeline::new(&config, &fetcher, &SystemRunner, &output)
///     .run()
///     .await?;
/// println!("{} ({})", summary.artifact.display(), summary.checksum);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<'a, F, R> {
    config: &'a BuildConfig,
    fetcher: &'a F,
    runner: &'a R,
    output: &'a OutputManager,
    report: BuildReport,
}

impl<F, R> std::fmt::Debug for Pipeline<'_, F, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl<'a, F: Fetcher, R: CommandRunner> Pipeline<'a, F, R> {
    pub fn new(
        config: &'a BuildConfig,
        fetcher: &'a F,
        runner: &'a R,
        output: &'a OutputManager,
    ) -> Self {
        Self {
            config,
            fetcher,
            runner,
            output,
            report: BuildReport::new(),
        }
    }

    /// Builds the AppImage.
    ///
    /// Stops at the first fatal error and leaves the scratch directory in
    /// place for inspection. Tolerated failures are printed as a summary
    /// once the artifact exists.
    pub async fn run(mut self) -> Result<BuildSummary> {
        let config = self.config;

        self.section(phase::DEPENDENCIES);
        check_required_tools(&config.appimage().required_tools)?;
        match config.mode() {
            BuildMode::Native(arch) => self.progress(&format!("Native build for {arch}")),
            BuildMode::Cross { host, target } => {
                let message = format!(
                    "Cross build: {host} host, {target} target. The smoke test will be skipped."
                );
                log::info!("{}", message);
                self.warn(&message);
            }
        }

        self.section(phase::VERSION);
        let revision = metadata::resolve_revision(self.fetcher, &config.revision_api_url()).await;
        if revision == UNKNOWN {
            self.record(
                phase::VERSION,
                StepOutcome::Degraded(format!("payload revision unavailable, using '{UNKNOWN}'")),
            );
        }
        self.progress(&format!("Payload revision: {revision}"));

        self.section(phase::RUNTIME);
        let prefix = appimage::provision_runtime(config, self.fetcher, self.runner).await?;
        self.success(&format!("Miniconda installed in {}", prefix.display()));

        self.section(phase::PACKAGES);
        let outcome = appimage::install_packages(config, self.runner).await?;
        self.record(phase::PACKAGES, outcome);

        self.section(phase::ASSEMBLE);
        let assembled = appimage::assemble_app_dir(config, self.runner).await?;
        self.progress(&format!(
            "Bundled {} host libraries",
            assembled.copied_libraries.len()
        ));
        for library in &assembled.copied_libraries {
            self.detail(&library.display().to_string());
        }
        self.record(phase::ASSEMBLE, assembled.outcome);

        self.section(phase::PAYLOAD);
        let payload = appimage::install_payload(config, self.fetcher).await?;
        let app_version = metadata::read_app_version(&payload).await;
        if app_version == UNKNOWN {
            self.record(
                phase::PAYLOAD,
                StepOutcome::Degraded(format!("no __version__ in payload, using '{UNKNOWN}'")),
            );
        }
        let versions = VersionInfo {
            revision,
            app_version,
        };
        self.progress(&format!(
            "{} version {}",
            config.payload().script,
            versions.app_version
        ));

        self.section(phase::LAUNCHER);
        let launcher = appimage::write_launcher(config).await?;
        self.progress(&format!("Wrote {}", launcher.display()));

        self.section(phase::METADATA);
        let files = appimage::write_metadata(config, &versions).await?;
        self.progress(&format!("Wrote {}", files.desktop.display()));

        self.section(phase::OPTIMIZE);
        let optimized = appimage::optimize(config, self.runner).await;
        self.progress(&format!(
            "Reclaimed {} ({} paths removed, {} executables stripped)",
            format_bytes(optimized.bytes_reclaimed),
            optimized.removed,
            optimized.stripped
        ));
        self.record(phase::OPTIMIZE, optimized.outcome);

        self.section(phase::PACKAGE);
        let artifact =
            appimage::package_app_image(config, self.fetcher, self.runner, &versions.revision)
                .await?;
        let size = tokio::fs::metadata(&artifact)
            .await
            .fs_context("reading artifact metadata", &artifact)?
            .len();
        let checksum = calculate_sha256(&artifact).await?;
        log::info!(
            "Created {} ({} bytes, sha256 {})",
            artifact.display(),
            size,
            checksum
        );
        self.success(&format!(
            "Created {} ({})",
            artifact.display(),
            format_bytes(size)
        ));
        self.indent(&format!("SHA256: {checksum}"));

        self.section(phase::SMOKE_TEST);
        let outcome = appimage::smoke_test(config, self.runner, &artifact).await?;
        if outcome.is_completed() {
            self.success("Artifact runs");
        }
        self.record(phase::SMOKE_TEST, outcome);

        self.section(phase::CLEANUP);
        match appimage::cleanup(config).await {
            Ok(_) => {}
            Err(e) => self.record(phase::CLEANUP, StepOutcome::Degraded(e.to_string())),
        }

        self.print_report();

        Ok(BuildSummary {
            artifact,
            versions,
            size,
            checksum,
            copied_libraries: assembled.copied_libraries.len(),
            bytes_reclaimed: optimized.bytes_reclaimed,
            report: self.report,
        })
    }

    fn record(&mut self, phase: &'static str, outcome: StepOutcome) {
        match &outcome {
            StepOutcome::Completed => {}
            StepOutcome::Degraded(reason) => self.warn(&format!("{phase}: {reason}")),
            StepOutcome::Skipped(reason) => self.progress(&format!("Skipped {phase}: {reason}")),
        }
        self.report.record(phase, &outcome);
    }

    fn print_report(&self) {
        if self.report.soft_failures().is_empty() {
            return;
        }
        self.section("Completed with warnings");
        for failure in self.report.soft_failures() {
            self.warn(&failure.to_string());
        }
    }

    // Console write failures never abort a build.

    fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    fn progress(&self, message: &str) {
        let _ = self.output.progress(message);
    }

    fn success(&self, message: &str) {
        let _ = self.output.success(message);
    }

    fn warn(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    fn detail(&self, message: &str) {
        let _ = self.output.verbose(message);
    }
}
