//! Clap derive structures for the `panelnode` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// panelnode -- panel client bootstrap for proxy nodes
#[derive(Debug, Parser)]
#[command(
    name = "panelnode",
    version,
    about = "Validate a proxy node's panel configuration and local rules",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Node config file (defaults to the platform config directory)
    #[arg(long, short = 'C', env = "PANELNODE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the panel client and print a summary of the node
    Check,

    /// List the local destination rules
    Rules,

    /// Send an authenticated GET to the panel and print the response
    Get(GetArgs),
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Path relative to the panel host (e.g. /api/v1/server/config)
    pub path: String,

    /// Extra query parameters as key=value
    #[arg(long = "param", short = 'P', value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}
