//! Command handlers.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use panelnode_api::{DestinationRule, PanelClient};

use crate::cli::GetArgs;
use crate::error::CliError;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Origin")]
    origin: String,
    #[tabled(rename = "Pattern")]
    pattern: String,
}

impl From<&DestinationRule> for RuleRow {
    fn from(rule: &DestinationRule) -> Self {
        Self {
            id: rule.id(),
            origin: rule.origin().to_string(),
            pattern: rule.as_str().to_owned(),
        }
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.as_ref().map_or_else(|| "-".into(), ToString::to_string)
}

pub fn check(client: &PanelClient) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    writeln!(out, "panel:        {}", client.api_host())?;
    writeln!(out, "node id:      {}", client.node_id())?;
    writeln!(out, "node type:    {}", client.node_type())?;
    writeln!(
        out,
        "timeout:      {}",
        humantime::format_duration(client.timeout())
    )?;
    writeln!(
        out,
        "retries:      {}",
        client.retry_policy().max_retries
    )?;
    writeln!(out, "speed limit:  {}", optional(client.speed_limit()))?;
    writeln!(out, "device limit: {}", optional(client.device_limit()))?;
    writeln!(out, "local rules:  {}", client.local_rules().len())?;
    Ok(())
}

pub fn rules(client: &PanelClient) -> Result<(), CliError> {
    let rows: Vec<RuleRow> = client.rules().iter().map(RuleRow::from).collect();
    let mut out = io::stdout().lock();
    if rows.is_empty() {
        writeln!(out, "no local rules")?;
    } else {
        writeln!(out, "{}", Table::new(rows).with(Style::rounded()))?;
    }
    Ok(())
}

pub async fn get(client: &PanelClient, args: &GetArgs) -> Result<(), CliError> {
    let params: Vec<(&str, String)> = args
        .params
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();

    let resp = client
        .get_with_params(&args.path, &params)
        .await
        .map_err(CliError::Request)?;
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| CliError::Request(e.into()))?;

    let mut out = io::stdout().lock();
    writeln!(out, "HTTP {status}")?;
    if !body.is_empty() {
        writeln!(out, "{body}")?;
    }
    Ok(())
}
