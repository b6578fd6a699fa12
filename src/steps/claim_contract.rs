use async_trait::async_trait;
use ethers::abi::Token;
use log::info;

use crate::config::DeployConfig;
use crate::context::DeployContext;
use crate::error::Result;
use crate::runner::Step;

use super::{deployer_options, ensure_max_approval, log_deployer_balance};

/// Deploys the claim contract and lets it pull grant tokens from the deployer
pub struct ClaimContractStep;

#[async_trait]
impl Step for ClaimContractStep {
    fn id(&self) -> &str {
        "7_claim_contract"
    }

    fn tags(&self) -> &[&str] {
        &["7", "ClaimContract"]
    }

    fn dependencies(&self) -> &[&str] {
        &["1"]
    }

    fn validate(&self, config: &DeployConfig) -> Result<()> {
        config.days_to_claim().map(|_| ())
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("7) Claim Contract");
        let days_to_claim = ctx.config.days_to_claim()?;
        let token = ctx.deployments.address("YakToken")?;

        let options = deployer_options(ctx)
            .args(vec![Token::Address(token), Token::Uint(days_to_claim)]);
        let claim = ctx.deployments.deploy("Claim", options).await?.address();

        if ensure_max_approval(ctx, claim).await? {
            info!(
                "- Set max approval for claim contract at {:?} for deployer: {:?}",
                claim, ctx.accounts.deployer
            );
        }

        log_deployer_balance(ctx).await?;
        Ok(())
    }
}
