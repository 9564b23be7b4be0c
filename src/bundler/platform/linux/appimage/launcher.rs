//! `AppRun` launcher generation.

use crate::bundler::{
    error::Result,
    settings::BuildConfig,
    utils::{fs, template},
};
use serde::Serialize;
use std::path::PathBuf;

const APPRUN_TEMPLATE: &str = r#"#!/bin/sh
# Runs {{script}} with the Python runtime bundled in this AppImage.
HERE="$(dirname "$(readlink -f "$0")")"

export PATH="$HERE/usr/bin${PATH:+:$PATH}"
export LD_LIBRARY_PATH="$HERE/usr/lib${LD_LIBRARY_PATH:+:$LD_LIBRARY_PATH}"
export PYTHONHOME="$HERE/usr"
export CONDA_PREFIX="$HERE/usr"
unset PYTHONPATH
export PYTHONNOUSERSITE=1
export PYTHONDONTWRITEBYTECODE=1

if [ -n "${{workdir_var}}" ]; then
    cd "${{workdir_var}}" || exit 1
elif [ -n "$OWD" ]; then
    cd "$OWD" || exit 1
fi

exec "$HERE/usr/bin/python3" "$HERE/usr/bin/{{script}}" "$@"
"#;

#[derive(Serialize)]
struct LauncherData<'a> {
    script: &'a str,
    workdir_var: String,
}

/// Environment variable that overrides the launcher's working directory,
/// e.g. `GOGREPOC_WORKDIR`.
pub fn workdir_var(app_name: &str) -> String {
    let name: String = app_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{name}_WORKDIR")
}

/// Renders the launcher script for `config`.
pub fn render_launcher(config: &BuildConfig) -> Result<String> {
    template::render(
        APPRUN_TEMPLATE,
        &LauncherData {
            script: &config.payload().script,
            workdir_var: workdir_var(&config.package().app_name),
        },
    )
}

/// Writes `AppRun` at the AppDir root and marks it executable.
pub async fn write_launcher(config: &BuildConfig) -> Result<PathBuf> {
    let path = config.app_dir().join("AppRun");
    fs::write_file(&path, render_launcher(config)?).await?;
    fs::make_executable(&path).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{Arch, BuildConfigBuilder};

    fn config() -> BuildConfig {
        BuildConfigBuilder::new()
            .host_arch(Arch::X86_64)
            .scratch_dir("/tmp/scratch")
            .tools_dir("/tmp/tools")
            .build()
            .unwrap()
    }

    #[test]
    fn workdir_var_is_shell_safe() {
        assert_eq!(workdir_var("gogrepoc"), "GOGREPOC_WORKDIR");
        assert_eq!(workdir_var("my-app.v2"), "MY_APP_V2_WORKDIR");
    }

    #[test]
    fn launcher_sets_isolation_and_forwards_arguments() {
        let script = render_launcher(&config()).unwrap();

        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains(r#"export PATH="$HERE/usr/bin${PATH:+:$PATH}""#));
        assert!(script.contains(r#"export LD_LIBRARY_PATH="$HERE/usr/lib"#));
        assert!(script.contains(r#"export PYTHONHOME="$HERE/usr""#));
        assert!(script.contains("export PYTHONNOUSERSITE=1"));
        assert!(script.contains("export PYTHONDONTWRITEBYTECODE=1"));
        assert!(script.contains(r#"if [ -n "$GOGREPOC_WORKDIR" ]; then"#));
        assert!(script.contains(
            r#"exec "$HERE/usr/bin/python3" "$HERE/usr/bin/gogrepoc.py" "$@""#
        ));
    }

    #[tokio::test]
    async fn write_launcher_creates_executable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let config = BuildConfigBuilder::new()
            .host_arch(Arch::X86_64)
            .scratch_dir(tmp.path())
            .tools_dir(tmp.path().join("tools"))
            .build()
            .unwrap();

        let path = write_launcher(&config).await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
