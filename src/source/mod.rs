//! Payload repository resolution

use crate::bundler::error::{Error, Result};

/// GitHub location of the payload script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadSource {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub script: String,
}

impl PayloadSource {
    /// Parses `owner/repo` or a `https://github.com/owner/repo[.git]` URL.
    pub fn parse(repo: &str, branch: &str, script: &str) -> Result<Self> {
        let trimmed = repo
            .trim()
            .trim_start_matches("https://github.com/")
            .trim_start_matches("http://github.com/")
            .trim_end_matches('/')
            .trim_end_matches(".git");

        let parts: Vec<&str> = trimmed.split('/').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(Error::Config(format!(
                "payload repository must be owner/repo, got {repo:?}"
            )));
        }
        if branch.trim().is_empty() {
            return Err(Error::Config("payload branch cannot be empty".into()));
        }
        if script.is_empty() || script.contains('/') {
            return Err(Error::Config(format!(
                "payload script must be a bare file name, got {script:?}"
            )));
        }

        Ok(Self {
            owner: parts[0].to_string(),
            repo: parts[1].to_string(),
            branch: branch.trim().to_string(),
            script: script.to_string(),
        })
    }

    /// Commits listing for the branch, newest first, one entry.
    pub fn commits_api_url(&self, api_base: &str) -> String {
        format!(
            "{}/repos/{}/{}/commits?sha={}&per_page=1",
            api_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.branch
        )
    }

    /// Raw download URL of the payload script.
    pub fn raw_url(&self, raw_base: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            raw_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.branch,
            self.script
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_url_forms() {
        let short = PayloadSource::parse("Kalanyr/gogrepoc", "master", "gogrepoc.py").unwrap();
        let url =
            PayloadSource::parse("https://github.com/Kalanyr/gogrepoc.git", "master", "gogrepoc.py")
                .unwrap();
        assert_eq!(short, url);
        assert_eq!(
            short.raw_url("https://raw.githubusercontent.com/"),
            "https://raw.githubusercontent.com/Kalanyr/gogrepoc/master/gogrepoc.py"
        );
        assert_eq!(
            short.commits_api_url("https://api.github.com"),
            "https://api.github.com/repos/Kalanyr/gogrepoc/commits?sha=master&per_page=1"
        );
    }

    #[test]
    fn rejects_malformed_repositories() {
        assert!(PayloadSource::parse("gogrepoc", "master", "gogrepoc.py").is_err());
        assert!(PayloadSource::parse("a/b/c", "master", "gogrepoc.py").is_err());
        assert!(PayloadSource::parse("a/b", " ", "gogrepoc.py").is_err());
        assert!(PayloadSource::parse("a/b", "master", "dir/x.py").is_err());
    }
}
