//! Conda environment creation and package installation.

use crate::bundler::{
    StepOutcome,
    error::Result,
    settings::BuildConfig,
    utils::process::{CommandRunner, Invocation, run_checked, tail},
};

/// Creates the named environment and installs the package set.
///
/// Required conda and pip packages are fatal on failure. Optional packages
/// are attempted last; their failure yields [`StepOutcome::Degraded`].
pub async fn install_packages<R: CommandRunner>(
    config: &BuildConfig,
    runner: &R,
) -> Result<StepOutcome> {
    let package = config.package();
    let conda = config.conda_bin();

    log::info!(
        "Creating conda environment '{}' with {}",
        package.env_name,
        package.python_requirement()
    );
    let create = Invocation::new(&conda)
        .args(["create", "-y", "-n", package.env_name.as_str(), "--override-channels", "-c"])
        .arg(&package.channel)
        .arg(package.python_requirement())
        .args(&package.required);
    run_checked(runner, "conda environment creation", &create).await?;

    if !package.pip.is_empty() {
        log::info!("Installing pip packages: {}", package.pip.join(", "));
        let python = config.env_dir().join("bin").join("python");
        let pip = Invocation::new(python)
            .args(["-m", "pip", "install", "--no-cache-dir"])
            .args(&package.pip);
        run_checked(runner, "pip install", &pip).await?;
    }

    if package.optional.is_empty() {
        return Ok(StepOutcome::Completed);
    }

    log::info!(
        "Installing optional packages: {}",
        package.optional.join(", ")
    );
    let optional = Invocation::new(&conda)
        .args(["install", "-y", "-n", package.env_name.as_str(), "--override-channels", "-c"])
        .arg(&package.channel)
        .args(&package.optional);

    let reason = match runner.run(&optional).await {
        Ok(output) if output.success() => return Ok(StepOutcome::Completed),
        Ok(output) => format!(
            "optional package(s) {} not installed (exit code {:?}): {}",
            package.optional.join(", "),
            output.code,
            tail(&output.stderr, 3)
        ),
        Err(e) => format!(
            "optional package(s) {} not installed: {}",
            package.optional.join(", "),
            e
        ),
    };
    log::info!("{}", reason);
    Ok(StepOutcome::Degraded(reason))
}
