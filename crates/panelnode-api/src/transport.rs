// Transport configuration for the panel HTTP client.
//
// Timeout and retry policy are fixed once at construction and carried as a
// plain value; nothing mutates the client after it is built.

use std::time::Duration;

use crate::error::Error;

/// Request timeout used when the node config leaves it unset, zero, or negative.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Retries after the first attempt of a failed request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Exponential backoff between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt. `0` disables retrying.
    pub max_retries: u32,

    /// Delay before the first retry. Default: 100ms.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 2s.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Total attempts a single request may make.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (zero-based), doubling each time.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1_u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Shared transport configuration for building the panel HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            user_agent: concat!("panelnode/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Config with the timeout taken from a node's `timeout` setting.
    ///
    /// Non-positive values fall back to [`DEFAULT_TIMEOUT`] rather than
    /// being rejected.
    pub fn from_timeout_secs(secs: Option<i64>) -> Self {
        Self {
            timeout: timeout_from_secs(secs),
            ..Self::default()
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(Error::Transport)
    }
}

fn timeout_from_secs(secs: Option<i64>) -> Duration {
    match secs.map(u64::try_from) {
        Some(Ok(s)) if s > 0 => Duration::from_secs(s),
        _ => DEFAULT_TIMEOUT,
    }
}
