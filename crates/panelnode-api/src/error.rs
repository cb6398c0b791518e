use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the `panelnode-api` crate.
///
/// Covers node validation, local rule loading, and the HTTP transport.
/// Rule-file open and read failures are reported and recovered inside the
/// loader; they are only surfaced as values through the [`Reporter`].
///
/// [`Reporter`]: crate::report::Reporter
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// The declared protocol type is not one the panel serves.
    #[error("unsupported node type: {value}")]
    UnsupportedNodeType { value: String },

    // ── Local rules ─────────────────────────────────────────────────
    /// The local rule file exists in config but could not be opened.
    #[error("failed to open rule file {}: {source}", path.display())]
    RuleFileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading stopped part-way through the rule file.
    #[error("failed to read rule file {} at line {line}: {source}", path.display())]
    RuleFileRead {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// A rule line is not a valid expression. Never recovered.
    #[error("invalid rule pattern {pattern:?} at {}:{line}: {source}", path.display())]
    RulePattern {
        path: PathBuf,
        line: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A rule handed to the remote rule slot carried local origin.
    #[error("rule {pattern:?} has local origin and cannot replace remote rules")]
    RemoteRuleOrigin { pattern: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The panel kept answering with a retryable status until the retry
    /// budget ran out.
    #[error("panel returned HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Returns `true` for configuration problems that should stop the node
    /// from starting.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedNodeType { .. } | Self::RulePattern { .. }
        )
    }
}

/// Server-side statuses the transport retries: 429 and any 5xx.
pub(crate) fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable_status(reqwest::StatusCode::NOT_MODIFIED));
        assert!(!is_retryable_status(reqwest::StatusCode::FORBIDDEN));
    }

    #[test]
    fn status_error_is_transient() {
        let err = Error::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            url: "http://panel/api".into(),
        };
        assert!(err.is_transient());
        assert!(!err.is_fatal());
    }

    #[test]
    fn unsupported_node_type_is_fatal() {
        let err = Error::UnsupportedNodeType {
            value: "Hysteria".into(),
        };
        assert!(err.is_fatal());
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "unsupported node type: Hysteria");
    }
}
