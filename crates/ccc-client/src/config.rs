//! Endpoint configuration for the backing services.

use std::path::Path;
use std::time::Duration;

use reqwest::Url;

use crate::error::{ClientError, Result};
use crate::http::join_segments;

/// Environment variable consulted when no auth token is given explicitly.
pub const AUTH_TOKEN_ENV_VAR: &str = "CCC_AUTH_TOKEN";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// File-registration service (DTS) endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtsConfig {
    pub host: String,
    pub port: u16,
    pub auth_token: String,
    pub timeout: Duration,
}

impl Default for DtsConfig {
    fn default() -> Self {
        Self {
            host: "central-gateway.ccc.org".to_string(),
            port: 9510,
            auth_token: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DtsConfig {
    /// Sets the host; any `http://` or `https://` prefix is dropped.
    #[must_use]
    pub fn with_host(mut self, host: impl AsRef<str>) -> Self {
        self.host = strip_scheme(host.as_ref()).to_string();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the file resource, without a trailing slash.
    pub fn files_url(&self) -> String {
        format!("http://{}:{}/api/v1/dts/file", self.host, self.port)
    }

    /// URL of one registered file; the identifier is a single path segment.
    pub fn file_url(&self, ccc_id: &str) -> Result<Url> {
        join_segments(&self.files_url(), &[ccc_id])
    }
}

/// Search engine (Elasticsearch) endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub host: String,
    pub port: u16,
    pub auth_token: String,
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9200,
            auth_token: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn with_host(mut self, host: impl AsRef<str>) -> Self {
        self.host = strip_scheme(host.as_ref()).to_string();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Eve/Mongo submission API endpoint.
///
/// Unlike the other services the host keeps its scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionConfig {
    pub host: String,
    pub port: u16,
    pub program: String,
    pub auth_token: String,
    pub timeout: Duration,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            host: "http://192.168.99.100".to_string(),
            port: 8000,
            program: String::new(),
            auth_token: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SubmissionConfig {
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host.trim_end_matches('/'), self.port)
    }
}

/// Resolves an auth token argument.
///
/// Values starting with `/`, `./` or `../` name a file whose lines are
/// trimmed and concatenated; anything else is the token itself.
pub fn parse_auth_token(raw: &str) -> Result<String> {
    if !looks_like_path(raw) {
        return Ok(raw.to_string());
    }
    let path = Path::new(raw);
    let text = std::fs::read_to_string(path).map_err(|e| ClientError::io(path, e))?;
    Ok(text.lines().map(str::trim_end).collect())
}

fn looks_like_path(raw: &str) -> bool {
    raw.starts_with('/') || raw.starts_with("./") || raw.starts_with("../")
}

fn strip_scheme(host: &str) -> &str {
    host.strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dts_defaults_point_at_the_central_gateway() {
        let config = DtsConfig::default();
        assert_eq!(
            config.files_url(),
            "http://central-gateway.ccc.org:9510/api/v1/dts/file"
        );
    }

    #[test]
    fn hosts_lose_their_scheme() {
        let config = DtsConfig::default()
            .with_host("https://dts.example.org")
            .with_port(8080);
        assert_eq!(
            config.file_url("abc").unwrap().as_str(),
            "http://dts.example.org:8080/api/v1/dts/file/abc"
        );
        let search = SearchConfig::default().with_host("http://es.local");
        assert_eq!(search.base_url(), "http://es.local:9200");
    }

    #[test]
    fn file_ids_cannot_escape_their_segment() {
        let url = DtsConfig::default().file_url("../x?y").unwrap();
        assert_eq!(url.path(), "/api/v1/dts/file/..%2Fx%3Fy");
        assert!(url.query().is_none());
    }

    #[test]
    fn submission_url_keeps_scheme() {
        assert_eq!(
            SubmissionConfig::default().base_url(),
            "http://192.168.99.100:8000"
        );
    }

    #[test]
    fn literal_tokens_are_used_verbatim() {
        assert_eq!(parse_auth_token("abc.def").unwrap(), "abc.def");
    }

    #[test]
    fn path_like_tokens_must_exist() {
        let err = parse_auth_token("./definitely/not/here.token").unwrap_err();
        assert!(matches!(err, ClientError::Io { .. }));
    }
}
