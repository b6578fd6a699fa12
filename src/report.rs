// Reports
//
// Grantee balance report and run summaries, rendered as text or JSON.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use common::utils::format_token_amount;
use common::GrantClass;
use ethers::{
    abi::Token,
    types::{Address, U256},
};
use serde::Serialize;

use crate::context::DeployContext;
use crate::error::Result;
use crate::grants::load_grants;
use crate::runner::{RunReport, StepStatus};

/// Token position of one grantee
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GranteeBalance {
    pub recipient: Address,
    pub class: GrantClass,
    /// Amount listed in the grants file
    pub allocated: U256,
    /// Amount currently granted on the claim contract
    pub granted: U256,
    /// Token balance of the recipient
    pub balance: U256,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub network: String,
    pub generated_at: DateTime<Utc>,
    pub balances: Vec<GranteeBalance>,
}

/// Read the grant and token balance of every grantee of the network
pub async fn fetch_grantee_balances(ctx: &DeployContext) -> Result<BalanceReport> {
    let grants =
        load_grants(&ctx.config.grants_dir, &ctx.config.network)?.unwrap_or_default();
    let mut balances = Vec::with_capacity(grants.len());
    for grant in grants {
        let recipient = [Token::Address(grant.recipient)];
        let granted = ctx
            .deployments
            .read_uint("Claim", "getTokenGrant", &recipient)
            .await?;
        let balance = ctx
            .deployments
            .read_uint("YakToken", "balanceOf", &recipient)
            .await?;
        balances.push(GranteeBalance {
            recipient: grant.recipient,
            class: grant.class,
            allocated: grant.amount_wei()?,
            granted,
            balance,
        });
    }
    Ok(BalanceReport {
        network: ctx.config.network.clone(),
        generated_at: Utc::now(),
        balances,
    })
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Text,
}

/// Report formatter
pub struct ReportFormatter;

impl ReportFormatter {
    /// Format a balance report as JSON
    pub fn to_json(report: &BalanceReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Format a balance report as plain text
    pub fn to_text(report: &BalanceReport) -> String {
        let separator = "-----------------------------------------------------\n";
        let mut output = String::new();
        output.push_str(&format!(
            "Grantee balances on {} ({})\n",
            report.network, report.generated_at
        ));
        for balance in &report.balances {
            output.push_str(separator);
            output.push_str(&format!("Recipient: {:?}\n", balance.recipient));
            output.push_str(&format!("Class: {}\n", balance.class));
            output.push_str(&format!(
                "Allocated: {} YAK\n",
                format_token_amount(balance.allocated)
            ));
            output.push_str(&format!(
                "Grant Amount: {} YAK\n",
                format_token_amount(balance.granted)
            ));
            output.push_str(&format!(
                "Current Balance: {} YAK\n",
                format_token_amount(balance.balance)
            ));
        }
        output.push_str(separator);
        output
    }

    pub fn format(report: &BalanceReport, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => Self::to_json(report),
            ReportFormat::Text => Ok(Self::to_text(report)),
        }
    }

    /// Save a formatted balance report to a file
    pub fn save_to_file<P: AsRef<Path>>(
        report: &BalanceReport,
        path: P,
        format: ReportFormat,
    ) -> Result<()> {
        fs::write(path, Self::format(report, format)?)?;
        Ok(())
    }

    /// One line per step of a completed run
    pub fn run_summary(report: &RunReport) -> String {
        let mut output = format!(
            "Deployment on {} finished in {}s\n",
            report.network,
            (report.finished_at - report.started_at).num_seconds()
        );
        for outcome in &report.outcomes {
            let status = match outcome.status {
                StepStatus::Executed => "executed",
                StepStatus::Skipped => "skipped",
            };
            output.push_str(&format!("  {:<26} {}\n", outcome.id, status));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::StepOutcome;
    use tempfile::tempdir;

    fn create_mock_report() -> BalanceReport {
        BalanceReport {
            network: "fuji".to_string(),
            generated_at: Utc::now(),
            balances: vec![GranteeBalance {
                recipient: Address::from_low_u64_be(2),
                class: GrantClass::Team,
                allocated: U256::exp10(18) * U256::from(10),
                granted: U256::exp10(18) * U256::from(10),
                balance: U256::zero(),
            }],
        }
    }

    #[test]
    fn test_text_format() {
        let text = ReportFormatter::to_text(&create_mock_report());
        assert!(text.contains("Grantee balances on fuji"));
        assert!(text.contains("Class: team"));
        assert!(text.contains("Grant Amount: 10.000000000000000000 YAK"));
    }

    #[test]
    fn test_json_format() {
        let json = ReportFormatter::to_json(&create_mock_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["network"], "fuji");
        assert_eq!(value["balances"][0]["class"], "team");
        assert!(value["balances"][0].get("allocated").is_some());
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("balances.json");
        ReportFormatter::save_to_file(&create_mock_report(), &path, ReportFormat::Json).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("fuji"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ReportFormat::from_str("json", true), Ok(ReportFormat::Json));
        assert_eq!(ReportFormat::from_str("TEXT", true), Ok(ReportFormat::Text));
        assert!(ReportFormat::from_str("html", true).is_err());
    }

    #[test]
    fn test_run_summary() {
        let now = Utc::now();
        let report = RunReport {
            network: "hardhat".to_string(),
            started_at: now,
            finished_at: now,
            outcomes: vec![StepOutcome {
                id: "1_yak_token".to_string(),
                tags: vec!["1".to_string()],
                status: StepStatus::Skipped,
            }],
        };
        let summary = ReportFormatter::run_summary(&report);
        assert!(summary.contains("1_yak_token"));
        assert!(summary.contains("skipped"));
    }
}
