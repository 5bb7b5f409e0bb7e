// ── Core error types ──
//
// User-facing errors from devtrack-core. The facade never returns these
// (it records a message in the store instead); they surface from
// construction, configuration and direct API use.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach deviation service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Deviation not found: {id}")]
    DeviationNotFound { id: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<devtrack_api::Error> for CoreError {
    fn from(err: devtrack_api::Error) -> Self {
        match err {
            devtrack_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            devtrack_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            devtrack_api::Error::UnsupportedBaseUrl(url) => CoreError::Config {
                message: format!("API URL cannot carry paths: {url}"),
            },
            devtrack_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            devtrack_api::Error::Api { status, message } => CoreError::Api {
                message: message.unwrap_or_else(|| format!("HTTP {status}")),
                status: Some(status),
            },
            devtrack_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DeviationNotFound { .. }
                | Self::Api {
                    status: Some(404),
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_server_message() {
        let err: CoreError = devtrack_api::Error::Api {
            status: 409,
            message: Some("Title already used".into()),
        }
        .into();
        assert_eq!(err.to_string(), "API error: Title already used");
        assert!(!err.is_not_found());
    }

    #[test]
    fn api_error_without_message_uses_status() {
        let err: CoreError = devtrack_api::Error::Api {
            status: 404,
            message: None,
        }
        .into();
        assert_eq!(err.to_string(), "API error: HTTP 404");
        assert!(err.is_not_found());
    }
}
