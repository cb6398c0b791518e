//! Node configuration for panelnode.
//!
//! A single TOML file, overridable per field through `PANELNODE_*`
//! environment variables, translated into `panelnode_api::ClientConfig`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use panelnode_api::ClientConfig;

/// Environment variable prefix for field overrides.
pub const ENV_PREFIX: &str = "PANELNODE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Node settings as written in the config file.
#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    /// Panel base URL (e.g., "https://panel.example.com").
    pub api_host: String,

    /// Node id assigned by the panel.
    pub node_id: u32,

    /// Node token issued by the panel.
    pub api_key: SecretString,

    /// "V2ray", "Trojan", or "Shadowsocks" (any case).
    pub node_type: String,

    /// Request timeout in seconds; zero or negative means the default.
    #[serde(default)]
    pub timeout: Option<i64>,

    #[serde(default)]
    pub speed_limit: Option<u64>,

    #[serde(default)]
    pub device_limit: Option<u32>,

    /// File of local destination rules, one pattern per line.
    #[serde(default)]
    pub rule_list_path: Option<PathBuf>,
}

impl NodeConfig {
    /// Translate into the client's construction input.
    ///
    /// Only the host is checked here; the node type is validated when the
    /// client is built.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        url::Url::parse(&self.api_host).map_err(|e| ConfigError::Validation {
            field: "api_host".into(),
            reason: format!("invalid URL {:?}: {e}", self.api_host),
        })?;

        Ok(ClientConfig {
            api_host: self.api_host.clone(),
            node_id: self.node_id,
            token: self.api_key.clone(),
            node_type: self.node_type.clone(),
            timeout_secs: self.timeout,
            speed_limit: self.speed_limit,
            device_limit: self.device_limit,
            rule_list_path: self.rule_list_path.clone(),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the default config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "panelnode", "panelnode").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("panelnode");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
}

/// Load node settings from `path`, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<NodeConfig, ConfigError> {
    let config: NodeConfig = figment(path).extract()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use secrecy::ExposeSecret;

    use super::*;

    const NODE_TOML: &str = r#"
        api_host = "https://panel.example.com"
        node_id = 3
        api_key = "abc"
        node_type = "Trojan"
        timeout = 0
        rule_list_path = "rules.txt"
    "#;

    #[test]
    fn loads_file() {
        Jail::expect_with(|jail| {
            jail.create_file("node.toml", NODE_TOML)?;

            let cfg = load_config(Path::new("node.toml")).map_err(|e| e.to_string())?;

            assert_eq!(cfg.api_host, "https://panel.example.com");
            assert_eq!(cfg.node_id, 3);
            assert_eq!(cfg.api_key.expose_secret(), "abc");
            assert_eq!(cfg.node_type, "Trojan");
            assert_eq!(cfg.timeout, Some(0));
            assert_eq!(cfg.speed_limit, None);
            assert_eq!(cfg.rule_list_path, Some(PathBuf::from("rules.txt")));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("node.toml", NODE_TOML)?;
            jail.set_env("PANELNODE_NODE_ID", "9");
            jail.set_env("PANELNODE_API_KEY", "from-env");
            jail.set_env("PANELNODE_CONFIG", "elsewhere.toml");

            let cfg = load_config(Path::new("node.toml")).map_err(|e| e.to_string())?;

            assert_eq!(cfg.node_id, 9);
            assert_eq!(cfg.api_key.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn env_alone_is_enough() {
        Jail::expect_with(|jail| {
            jail.set_env("PANELNODE_API_HOST", "http://127.0.0.1:8080");
            jail.set_env("PANELNODE_NODE_ID", "1");
            jail.set_env("PANELNODE_API_KEY", "k");
            jail.set_env("PANELNODE_NODE_TYPE", "v2ray");

            let cfg = load_config(Path::new("missing.toml")).map_err(|e| e.to_string())?;

            assert_eq!(cfg.node_type, "v2ray");
            assert_eq!(cfg.rule_list_path, None);
            Ok(())
        });
    }

    #[test]
    fn missing_field_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("node.toml", "api_host = \"https://panel\"\n")?;

            let result = load_config(Path::new("node.toml"));

            assert!(matches!(result, Err(ConfigError::Figment(_))));
            Ok(())
        });
    }

    #[test]
    fn translates_to_client_config() {
        Jail::expect_with(|jail| {
            jail.create_file("node.toml", NODE_TOML)?;
            let cfg = load_config(Path::new("node.toml")).map_err(|e| e.to_string())?;

            let client = cfg.to_client_config().map_err(|e| e.to_string())?;

            assert_eq!(client.node_id, 3);
            assert_eq!(client.token.expose_secret(), "abc");
            assert_eq!(client.timeout_secs, Some(0));
            assert_eq!(client.rule_list_path, Some(PathBuf::from("rules.txt")));
            Ok(())
        });
    }

    #[test]
    fn bad_host_fails_validation() {
        Jail::expect_with(|jail| {
            jail.create_file("node.toml", &NODE_TOML.replace("https://panel.example.com", "panel"))?;
            let cfg = load_config(Path::new("node.toml")).map_err(|e| e.to_string())?;

            let err = cfg.to_client_config().unwrap_err();

            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_host"));
            Ok(())
        });
    }
}
