use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::core::RepoName;

const ISSUE_CREATE_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("{path}: not found (HTTP {status})")]
    NotFound { path: String, status: u16 },

    #[error("{path}: unauthorized (HTTP {status})")]
    Unauthorized { path: String, status: u16 },

    #[error("{path}: request failed (HTTP {status})")]
    Status { path: String, status: u16 },

    #[error("{path}: transport error: {message}")]
    Transport { path: String, message: String },

    #[error("{path}: unexpected response body: {message}")]
    Decode { path: String, message: String },
}

impl RemoteError {
    pub fn from_status(path: impl Into<String>, status: u16) -> Self {
        let path = path.into();
        match status {
            404 | 410 => RemoteError::NotFound { path, status },
            401 | 403 => RemoteError::Unauthorized { path, status },
            _ => RemoteError::Status { path, status },
        }
    }

    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteError::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// HTTP status carried by the failure, `None` when no response arrived
    /// or the body could not be decoded.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::NotFound { status, .. }
            | RemoteError::Unauthorized { status, .. }
            | RemoteError::Status { status, .. } => Some(*status),
            RemoteError::Transport { .. } | RemoteError::Decode { .. } => None,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            RemoteError::NotFound { path, .. }
            | RemoteError::Unauthorized { path, .. }
            | RemoteError::Status { path, .. }
            | RemoteError::Transport { path, .. }
            | RemoteError::Decode { path, .. } => path,
        }
    }
}

/// Read/write access to one repository on the hosting platform.
pub trait RemoteApi {
    fn repository(&self) -> &RepoName;

    /// Reads one page of a resource. `path` is relative to the repository
    /// (`readme`, `issues?state=open`) or an absolute URL returned by the API.
    fn fetch(&self, path: &str) -> Result<Value, RemoteError>;

    fn create_ticket(&self, title: &str, body: &str) -> Result<(), RemoteError>;
}

#[derive(Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub token: String,
}

pub struct GithubClient {
    http: Client,
    base_url: String,
    repo: RepoName,
}

impl GithubClient {
    pub fn new(opts: ClientOptions, repo: RepoName) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("token {}", opts.token.trim()))
            .context("access token contains characters not allowed in an HTTP header")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .user_agent(opts.user_agent)
            .timeout(opts.timeout)
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: opts.base_url,
            repo,
        })
    }

    fn transport(path: &str, err: reqwest::Error) -> RemoteError {
        RemoteError::Transport {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

impl RemoteApi for GithubClient {
    fn repository(&self) -> &RepoName {
        &self.repo
    }

    fn fetch(&self, path: &str) -> Result<Value, RemoteError> {
        let url = resolve_url(&self.base_url, &self.repo, path);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| Self::transport(path, e))?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "GET");
        if !status.is_success() {
            return Err(RemoteError::from_status(path, status.as_u16()));
        }
        let body = response.text().map_err(|e| Self::transport(path, e))?;
        decode_body(path, &body)
    }

    fn create_ticket(&self, title: &str, body: &str) -> Result<(), RemoteError> {
        let path = "issues";
        let url = resolve_url(&self.base_url, &self.repo, path);
        let response = self
            .http
            .post(&url)
            .header(ACCEPT, ISSUE_CREATE_ACCEPT)
            .json(&serde_json::json!({ "title": title, "body": body }))
            .send()
            .map_err(|e| Self::transport(path, e))?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "POST");
        if status == StatusCode::CREATED {
            Ok(())
        } else {
            Err(RemoteError::from_status(path, status.as_u16()))
        }
    }
}

pub fn resolve_url(base_url: &str, repo: &RepoName, path: &str) -> String {
    if path.starts_with("https://") || path.starts_with("http://") {
        return path.to_string();
    }
    format!(
        "{}/repos/{repo}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn decode_body(path: &str, body: &str) -> Result<Value, RemoteError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| RemoteError::decode(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoName {
        "octo/widgets".parse().expect("repo")
    }

    #[test]
    fn status_maps_to_reason() {
        assert!(matches!(
            RemoteError::from_status("readme", 404),
            RemoteError::NotFound { status: 404, .. }
        ));
        assert!(matches!(
            RemoteError::from_status("readme", 403),
            RemoteError::Unauthorized { status: 403, .. }
        ));
        assert!(matches!(
            RemoteError::from_status("readme", 502),
            RemoteError::Status { status: 502, .. }
        ));
        assert_eq!(RemoteError::decode("readme", "eof").status(), None);
    }

    #[test]
    fn relative_paths_resolve_under_repository() {
        assert_eq!(
            resolve_url("https://api.github.com/", &repo(), "contents/CHANGELOG.md"),
            "https://api.github.com/repos/octo/widgets/contents/CHANGELOG.md"
        );
        assert_eq!(
            resolve_url("https://ghe.example/api/v3", &repo(), "/issues?state=open"),
            "https://ghe.example/api/v3/repos/octo/widgets/issues?state=open"
        );
    }

    #[test]
    fn absolute_urls_are_used_verbatim() {
        let url = "https://api.github.com/repos/octo/widgets/issues/7/comments";
        assert_eq!(resolve_url("https://other", &repo(), url), url);
    }

    #[test]
    fn empty_body_decodes_to_null() {
        assert_eq!(decode_body("license", "  "), Ok(Value::Null));
        assert!(matches!(
            decode_body("license", "<html>"),
            Err(RemoteError::Decode { .. })
        ));
    }
}
