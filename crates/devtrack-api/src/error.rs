use thiserror::Error;

/// Top-level error type for the `devtrack-api` crate.
///
/// Every failure the REST surface can produce ends up here: transport,
/// non-2xx responses, and bodies that do not match the expected shape.
/// `devtrack-core` turns these into user-facing messages.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments (`mailto:`, `data:` ...).
    #[error("Base URL cannot be used for API requests: {0}")]
    UnsupportedBaseUrl(String),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success status from the backend.
    ///
    /// `message` carries the `message` field of a JSON error body when
    /// the server sent one.
    #[error("API error (HTTP {status}): {}", message.as_deref().unwrap_or("request failed"))]
    Api { status: u16, message: Option<String> },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if the backend could not be reached at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// HTTP status code, when the failure came with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_helpers() {
        let err = Error::Api {
            status: 404,
            message: Some("Deviation not found".into()),
        };
        assert!(err.is_not_found());
        assert!(!err.is_transient());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.server_message(), Some("Deviation not found"));
        assert_eq!(
            err.to_string(),
            "API error (HTTP 404): Deviation not found"
        );
    }

    #[test]
    fn api_error_without_message() {
        let err = Error::Api {
            status: 503,
            message: None,
        };
        assert!(err.is_transient());
        assert_eq!(err.server_message(), None);
        assert_eq!(err.to_string(), "API error (HTTP 503): request failed");
    }

    #[test]
    fn deserialization_error_has_no_status() {
        let err = Error::Deserialization {
            message: "missing field `id`".into(),
            body: "{}".into(),
        };
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
