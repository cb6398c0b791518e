//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use panelnode_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
    pub const RULE_PATTERN: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid node configuration")]
    #[diagnostic(
        code(panelnode::config),
        help(
            "Check the node config file.\n\
             Expected at: {path} (override with --config or PANELNODE_CONFIG)"
        )
    )]
    Config {
        #[source]
        source: ConfigError,
        path: String,
    },

    #[error("Unsupported node type '{value}'")]
    #[diagnostic(
        code(panelnode::node_type),
        help("Supported node types: V2ray, Trojan, Shadowsocks")
    )]
    UnsupportedNodeType { value: String },

    // ── Local rules ──────────────────────────────────────────────────
    #[error("Invalid local rule on line {line}: {pattern:?}")]
    #[diagnostic(
        code(panelnode::rule_pattern),
        help("Fix or remove the pattern in {path}; the node will not start until every rule compiles.")
    )]
    RulePattern {
        path: String,
        line: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // ── Panel ────────────────────────────────────────────────────────
    #[error("Panel request failed")]
    #[diagnostic(code(panelnode::request))]
    Request(#[source] panelnode_api::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<panelnode_api::Error> for CliError {
    fn from(err: panelnode_api::Error) -> Self {
        match err {
            panelnode_api::Error::UnsupportedNodeType { value } => {
                Self::UnsupportedNodeType { value }
            }
            panelnode_api::Error::RulePattern {
                path,
                line,
                pattern,
                source,
            } => Self::RulePattern {
                path: path.display().to_string(),
                line,
                pattern,
                source,
            },
            other => Self::Request(other),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::UnsupportedNodeType { .. } => exit_code::CONFIG,
            Self::RulePattern { .. } => exit_code::RULE_PATTERN,
            Self::Request(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}
