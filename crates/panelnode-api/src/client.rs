// Panel HTTP client
//
// Wraps `reqwest::Client` with the node's identity. Every request carries
// `node_type`, `node_id` and `token` as query parameters; the panel has no
// login or session step. Failed requests are retried with backoff and, once
// the budget is spent, reported exactly once to the configured `Reporter`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, is_retryable_status};
use crate::local_rules::load_local_rules;
use crate::node::NodeType;
use crate::report::{Reporter, Severity, TracingReporter};
use crate::rule::{DestinationRule, RuleList};
use crate::transport::{RetryPolicy, TransportConfig};

/// Everything needed to build a [`PanelClient`]. Read once at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Panel base URL (e.g. `https://panel.example.com`).
    pub api_host: String,
    pub node_id: u32,
    pub token: SecretString,
    /// Protocol name as configured; validated by [`PanelClient::new`].
    pub node_type: String,
    /// Request timeout in seconds. Unset, zero, or negative means 5s.
    pub timeout_secs: Option<i64>,
    pub speed_limit: Option<u64>,
    pub device_limit: Option<u32>,
    /// Optional file of local destination rules.
    pub rule_list_path: Option<PathBuf>,
}

/// Authenticated client for one node's conversation with the panel.
pub struct PanelClient {
    http: reqwest::Client,
    transport: TransportConfig,
    api_host: String,
    token: SecretString,
    node_type: NodeType,
    node_id: u32,
    speed_limit: Option<u64>,
    device_limit: Option<u32>,
    rules: RuleList,
    /// Cache validator from the last remote fetch; empty until one happens.
    etag: String,
    reporter: Arc<dyn Reporter>,
}

impl PanelClient {
    /// Build a client that reports through `tracing`.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        Self::with_reporter(config, Arc::new(TracingReporter))
    }

    /// Build a client, validating the node type and loading local rules.
    ///
    /// Fails on an unsupported node type or an invalid rule pattern. A
    /// missing or unreadable rule file is reported and leaves the client
    /// with no local rules. No request is sent.
    pub fn with_reporter(config: &ClientConfig, reporter: Arc<dyn Reporter>) -> Result<Self, Error> {
        let node_type = NodeType::from_name(&config.node_type)?;

        let transport = TransportConfig::from_timeout_secs(config.timeout_secs);
        let http = transport.build_client()?;

        let local = load_local_rules(config.rule_list_path.as_deref(), reporter.as_ref())?;

        debug!(
            host = %config.api_host,
            node_id = config.node_id,
            node_type = %node_type,
            local_rules = local.len(),
            "panel client ready"
        );

        Ok(Self {
            http,
            transport,
            api_host: config.api_host.clone(),
            token: config.token.clone(),
            node_type,
            node_id: config.node_id,
            speed_limit: config.speed_limit,
            device_limit: config.device_limit,
            rules: RuleList::new(local),
            etag: String::new(),
            reporter,
        })
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    pub fn speed_limit(&self) -> Option<u64> {
        self.speed_limit
    }

    pub fn device_limit(&self) -> Option<u32> {
        self.device_limit
    }

    /// Per-request timeout applied by the transport.
    pub fn timeout(&self) -> Duration {
        self.transport.timeout
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.transport.retry
    }

    /// Query parameters attached to every request.
    pub fn query_params(&self) -> [(&'static str, String); 3] {
        [
            ("node_type", self.node_type.query_value().to_owned()),
            ("node_id", self.node_id.to_string()),
            ("token", self.token.expose_secret().to_owned()),
        ]
    }

    // ── Rules ────────────────────────────────────────────────────────

    /// Rules read from the local file at startup, in file order.
    pub fn local_rules(&self) -> &[DestinationRule] {
        self.rules.local()
    }

    /// All rules in evaluation order.
    pub fn rules(&self) -> &RuleList {
        &self.rules
    }

    /// Swap in a fresh set of panel rules. Local rules are kept.
    pub fn set_remote_rules(&mut self, rules: Vec<DestinationRule>) -> Result<(), Error> {
        self.rules.replace_remote(rules)
    }

    pub fn find_match(&self, destination: &str) -> Option<&DestinationRule> {
        self.rules.find_match(destination)
    }

    // ── Cache validation ─────────────────────────────────────────────

    pub fn etag(&self) -> &str {
        &self.etag
    }

    pub fn set_etag(&mut self, etag: impl Into<String>) {
        self.etag = etag.into();
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Resolve `path` against the panel host.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let mut base = Url::parse(&self.api_host)?;
        let prefix = base.path().trim_end_matches('/').to_owned();
        base.set_path(&format!("{prefix}/"));
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    /// GET `path` with the node's credentials.
    ///
    /// Any status outside 429/5xx is handed back as-is, including 304 and
    /// 4xx; interpreting the body is the caller's business.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, Error> {
        self.get_with_params(path, &[]).await
    }

    /// GET `path` with extra query parameters after the credentials.
    pub async fn get_with_params(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, Error> {
        let result = self.try_get(path, params).await;

        if let Err(ref err) = result {
            self.reporter
                .report(Severity::Error, &format!("panel request {path} failed: {err}"));
        }
        result
    }

    async fn try_get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;
        self.send_with_retry(url, params).await
    }

    async fn send_with_retry(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, Error> {
        let policy = self.transport.retry;
        let auth = self.query_params();
        let mut retry: u32 = 0;

        loop {
            debug!("GET {url}");

            let err = match self
                .http
                .get(url.clone())
                .query(&auth)
                .query(params)
                .send()
                .await
            {
                Ok(resp) if !is_retryable_status(resp.status()) => return Ok(resp),
                Ok(resp) => Error::Status {
                    status: resp.status(),
                    url: url.to_string(),
                },
                // The request URL carries the token; keep it out of the error.
                Err(e) => Error::Transport(e.without_url()),
            };

            if !err.is_transient() || retry >= policy.max_retries {
                return Err(err);
            }

            let delay = policy.backoff(retry);
            warn!(
                error = %err,
                attempt = retry + 1,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "panel request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}

impl fmt::Debug for PanelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelClient")
            .field("api_host", &self.api_host)
            .field("node_type", &self.node_type)
            .field("node_id", &self.node_id)
            .field("timeout", &self.transport.timeout)
            .field("rules", &self.rules.len())
            .field("etag", &self.etag)
            .finish_non_exhaustive()
    }
}
