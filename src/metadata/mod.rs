//! Version metadata: payload revision and declared application version.
//!
//! Both values only name and label the artifact. Failing to resolve either
//! one substitutes [`UNKNOWN`] and never stops the build.

use crate::bundler::utils::http::Fetcher;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Placeholder for a revision or version that could not be determined.
pub const UNKNOWN: &str = "unknown";

/// Length revisions are shortened to.
pub const REVISION_LENGTH: usize = 7;

static SHA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""sha"\s*:\s*"([0-9a-fA-F]{7,64})""#).expect("sha pattern is valid")
});

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*__version__\s*=\s*['"]([^'"]+)['"]"#).expect("version pattern is valid")
});

/// Resolved version strings for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Short commit id of the payload, or [`UNKNOWN`].
    pub revision: String,
    /// `__version__` declared by the payload, or [`UNKNOWN`].
    pub app_version: String,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            revision: UNKNOWN.to_string(),
            app_version: UNKNOWN.to_string(),
        }
    }
}

/// Looks up the latest payload revision.
///
/// Any failure (transport, HTTP status, unexpected body) yields [`UNKNOWN`]
/// with a warning.
pub async fn resolve_revision<F: Fetcher>(fetcher: &F, api_url: &str) -> String {
    match fetcher.get_text(api_url).await {
        Ok(body) => match parse_revision(&body) {
            Some(revision) => {
                log::info!("Latest payload revision: {}", revision);
                revision
            }
            None => {
                log::info!("No commit id in response from {}; using '{}'", api_url, UNKNOWN);
                UNKNOWN.to_string()
            }
        },
        Err(e) => {
            log::info!("Could not resolve payload revision ({}); using '{}'", e, UNKNOWN);
            UNKNOWN.to_string()
        }
    }
}

/// First commit id in a commits API response, shortened to
/// [`REVISION_LENGTH`] lowercase hex characters.
pub fn parse_revision(body: &str) -> Option<String> {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            let commit = match &value {
                serde_json::Value::Array(items) => items.first()?.clone(),
                other => other.clone(),
            };
            commit.get("sha")?.as_str().map(String::from)
        });

    let sha = from_json.or_else(|| {
        SHA_PATTERN
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    })?;

    if sha.len() < REVISION_LENGTH || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(sha[..REVISION_LENGTH].to_ascii_lowercase())
}

/// First `__version__` assignment in the payload source.
pub fn extract_app_version(source: &str) -> Option<String> {
    VERSION_PATTERN
        .captures(source)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads the installed payload and extracts its version, or [`UNKNOWN`].
pub async fn read_app_version(payload: &Path) -> String {
    match tokio::fs::read(payload).await {
        Ok(bytes) => match extract_app_version(&String::from_utf8_lossy(&bytes)) {
            Some(version) => version,
            None => {
                log::info!(
                    "No __version__ found in {}; using '{}'",
                    payload.display(),
                    UNKNOWN
                );
                UNKNOWN.to_string()
            }
        },
        Err(e) => {
            log::info!("Could not read {} ({}); using '{}'", payload.display(), e, UNKNOWN);
            UNKNOWN.to_string()
        }
    }
}
