//! Optional release check against GitHub.
//!
//! Runs outside the copy/stitch pipeline. Failures are reported to the
//! caller, who usually just logs them.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding an API token for private repositories.
pub const TOKEN_ENV_VAR: &str = "PSA_TOOL_GITHUB_TOKEN";

const USER_AGENT: &str = "PSA-Tool";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Errors from the release check.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("No update repository configured")]
    NoRepository,

    #[error("Release request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Release query returned HTTP {status}")]
    Status { status: u16 },

    #[error("Release has no usable version tag: '{tag}'")]
    InvalidTag { tag: String },
}

/// Latest published release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseInfo {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Result of comparing the latest release with the running version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate { current: String, latest: String },
    Available { tag: String, url: String },
}

/// Numeric groups of a version tag. A leading `v` is ignored.
///
/// `"v1.4.2"` and `"1.4-2"` both give `[1, 4, 2]`; a tag without digits
/// gives an empty list.
pub fn parse_version(value: &str) -> Vec<u64> {
    let value = value.trim();
    let value = value
        .strip_prefix('v')
        .or_else(|| value.strip_prefix('V'))
        .unwrap_or(value);
    value
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Whether `remote` is newer than `local`, padding the shorter with zeros.
pub fn is_newer(remote: &[u64], local: &[u64]) -> bool {
    let len = remote.len().max(local.len());
    let pad = |v: &[u64]| {
        let mut padded = v.to_vec();
        padded.resize(len, 0);
        padded
    };
    pad(remote) > pad(local)
}

/// Token for the release query: the env var first, then `token_file`.
pub fn load_token(token_file: &Path) -> Option<String> {
    if let Ok(token) = env::var(TOKEN_ENV_VAR) {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    match fs::read_to_string(token_file) {
        Ok(content) => Some(content.trim().to_string()).filter(|t| !t.is_empty()),
        Err(e) => {
            if token_file.exists() {
                tracing::warn!("Cannot read token file {}: {}", token_file.display(), e);
            }
            None
        }
    }
}

/// Query the latest release of `repo` (`owner/name`) and compare it with
/// `current`.
pub fn check_latest_release(
    repo: &str,
    token: Option<&str>,
    current: &str,
) -> Result<UpdateStatus, UpdateError> {
    let repo = repo.trim();
    if repo.is_empty() {
        return Err(UpdateError::NoRepository);
    }

    let url = format!("https://api.github.com/repos/{}/releases/latest", repo);
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let mut request = client.get(&url);
    if let Some(token) = token {
        request = request.header(reqwest::header::AUTHORIZATION, format!("token {}", token));
    }

    let response = request.send()?;
    if !response.status().is_success() {
        return Err(UpdateError::Status {
            status: response.status().as_u16(),
        });
    }
    let release: ReleaseInfo = response.json()?;
    tracing::debug!("Latest release of {}: {}", repo, release.tag_name);

    compare_release(repo, &release, current)
}

/// Decide whether `release` is an update over `current`.
pub fn compare_release(
    repo: &str,
    release: &ReleaseInfo,
    current: &str,
) -> Result<UpdateStatus, UpdateError> {
    let remote = parse_version(&release.tag_name);
    if remote.is_empty() {
        return Err(UpdateError::InvalidTag {
            tag: release.tag_name.clone(),
        });
    }

    let local = parse_version(current);
    if !local.is_empty() && is_newer(&remote, &local) {
        let url = release
            .html_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("https://github.com/{}/releases/latest", repo));
        Ok(UpdateStatus::Available {
            tag: release.tag_name.clone(),
            url,
        })
    } else {
        Ok(UpdateStatus::UpToDate {
            current: current.to_string(),
            latest: release.tag_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_version_ignores_prefix_and_separators() {
        assert_eq!(parse_version("v1.4.2"), vec![1, 4, 2]);
        assert_eq!(parse_version(" 2.0-rc3 "), vec![2, 0, 3]);
        assert_eq!(parse_version("V10"), vec![10]);
        assert!(parse_version("latest").is_empty());
        assert!(parse_version("").is_empty());
    }

    #[test]
    fn newer_pads_shorter_version() {
        assert!(is_newer(&[1, 2, 1], &[1, 2]));
        assert!(!is_newer(&[1, 2], &[1, 2, 0]));
        assert!(!is_newer(&[1, 1, 9], &[1, 2]));
        assert!(is_newer(&[2], &[1, 9, 9]));
    }

    #[test]
    fn compare_release_reports_update() {
        let release = ReleaseInfo {
            tag_name: "v1.3.0".to_string(),
            html_url: None,
        };
        assert_eq!(
            compare_release("owner/repo", &release, "1.2.5").unwrap(),
            UpdateStatus::Available {
                tag: "v1.3.0".to_string(),
                url: "https://github.com/owner/repo/releases/latest".to_string(),
            }
        );
    }

    #[test]
    fn compare_release_up_to_date() {
        let release = ReleaseInfo {
            tag_name: "v1.2.5".to_string(),
            html_url: Some("https://example.com/r".to_string()),
        };
        assert!(matches!(
            compare_release("owner/repo", &release, "1.2.5").unwrap(),
            UpdateStatus::UpToDate { .. }
        ));
    }

    #[test]
    fn compare_release_rejects_bad_tag() {
        let release = ReleaseInfo {
            tag_name: "nightly".to_string(),
            html_url: None,
        };
        assert!(matches!(
            compare_release("owner/repo", &release, "1.0.0"),
            Err(UpdateError::InvalidTag { .. })
        ));
    }

    #[test]
    fn blank_repo_is_rejected_without_network() {
        assert!(matches!(
            check_latest_release("  ", None, "1.0.0"),
            Err(UpdateError::NoRepository)
        ));
    }

    #[test]
    fn token_file_is_trimmed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("update_token.txt");
        std::fs::write(&path, "  abc123\n").unwrap();

        // The env var takes precedence when set in the test environment.
        if env::var(TOKEN_ENV_VAR).map(|t| t.trim().is_empty()).unwrap_or(true) {
            assert_eq!(load_token(&path).as_deref(), Some("abc123"));
            assert_eq!(load_token(&dir.path().join("absent.txt")), None);
        }
    }

    #[test]
    fn release_json_parses() {
        let release: ReleaseInfo =
            serde_json::from_str(r#"{"tag_name":"v2.1","html_url":"https://x/y","id":5}"#).unwrap();
        assert_eq!(release.tag_name, "v2.1");
        assert_eq!(release.html_url.as_deref(), Some("https://x/y"));
    }
}
