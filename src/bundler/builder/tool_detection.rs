//! Host tool availability checking.

use crate::bundler::{Error, Result};
use std::path::PathBuf;

/// Location of `tool` on `PATH`, if any.
pub fn find_tool(tool: &str) -> Option<PathBuf> {
    match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {} at: {}", tool, path.display());
            Some(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", tool, e);
            None
        }
    }
}

/// Verifies every tool in `tools` is on `PATH`.
///
/// All tools are checked before failing, so the error names every missing
/// one at once.
pub fn check_required_tools<S: AsRef<str>>(tools: &[S]) -> Result<()> {
    let missing: Vec<String> = tools
        .iter()
        .map(AsRef::as_ref)
        .filter(|tool| find_tool(tool).is_none())
        .map(String::from)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingTools { tools: missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_tools_pass() {
        assert!(check_required_tools(&["sh"]).is_ok());
        assert!(check_required_tools::<&str>(&[]).is_ok());
    }

    #[test]
    fn every_missing_tool_is_reported() {
        let err = check_required_tools(&[
            "sh",
            "definitely_not_a_real_command_12345",
            "another_missing_tool_67890",
        ])
        .unwrap_err();

        match err {
            Error::MissingTools { tools } => assert_eq!(
                tools,
                vec![
                    "definitely_not_a_real_command_12345".to_string(),
                    "another_missing_tool_67890".to_string()
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }
}
