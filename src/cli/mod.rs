//! Command line interface for the AppImage builder.
//!
//! Parses arguments, resolves the build configuration before touching the
//! filesystem or network, then hands off to [`crate::bundler::Pipeline`].

mod args;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::{OutputManager, format_bytes};

use crate::{
    bundler::{
        self, BuildConfig, BuildConfigBuilder, BuildFile, BuildSummary, Pipeline,
        utils::{
            fs,
            http::{Fetcher, HttpFetcher},
            process::{CommandRunner, SystemRunner},
        },
    },
    error::Result,
};

/// Main CLI entry point
///
/// Returns the process exit code: `0` once the artifact exists, `1` on any
/// fatal error. `--help` and `--version` exit inside argument parsing.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let runtime_config = RuntimeConfig::from(&args);
    let output = runtime_config.output();

    match execute(&args, output).await {
        Ok(summary) => {
            let _ = output.success(&format!(
                "{} is ready",
                summary
                    .artifact
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            ));
            Ok(0)
        }
        Err(e) => {
            log::debug!("build failed: {:?}", e);
            output.error(&e.to_string())?;
            for suggestion in e.recovery_suggestions() {
                output.indent(&suggestion)?;
            }
            Ok(1)
        }
    }
}

/// Resolves configuration, applies `--clean`, and runs the build against
/// the network and the host's programs.
pub async fn execute(args: &Args, output: &OutputManager) -> Result<BuildSummary> {
    let fetcher = HttpFetcher::new()?;
    execute_with(args, output, &fetcher, &SystemRunner).await
}

/// [`execute`] with explicit network and process seams.
pub async fn execute_with<F: Fetcher, R: CommandRunner>(
    args: &Args,
    output: &OutputManager,
    fetcher: &F,
    runner: &R,
) -> Result<BuildSummary> {
    args.validate()?;
    let config = build_config(args)?;

    if args.clean {
        let removed = fs::remove_dir_all(config.scratch_dir()).await?;
        if removed {
            output.progress(&format!("Removed {}", config.scratch_dir().display()))?;
        }
    }

    let summary = Pipeline::new(&config, fetcher, runner, output)
        .run()
        .await?;
    Ok(summary)
}

/// Builds the [`BuildConfig`] for `args`.
///
/// Performs no side effects, so an unsupported architecture or a bad
/// configuration file fails before anything is created or downloaded.
pub fn build_config(args: &Args) -> bundler::Result<BuildConfig> {
    let mut builder = BuildConfigBuilder::new()
        .target_arch(args.target_arch.clone())
        .scratch_dir(&args.scratch_dir)
        .output_dir(&args.output_dir)
        .keep_build(args.keep_build);

    if let Some(path) = &args.config {
        builder = builder.build_file(BuildFile::load(path)?);
    }
    if let Some(dir) = &args.tools_dir {
        builder = builder.tools_dir(dir);
    }

    builder.build()
}
