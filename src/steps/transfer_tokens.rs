use async_trait::async_trait;
use ethers::abi::Token;
use log::info;

use crate::context::DeployContext;
use crate::grants::{distribute_transfers, load_transfers};
use crate::runner::Step;

/// Sends unlocked tokens from the deployer to each entry of the transfers file
pub struct TransferTokensStep;

#[async_trait]
impl Step for TransferTokensStep {
    fn id(&self) -> &str {
        "8_transfer_tokens"
    }

    fn tags(&self) -> &[&str] {
        &["8", "TransferTokens"]
    }

    fn dependencies(&self) -> &[&str] {
        &["1"]
    }

    async fn skip(&self, ctx: &DeployContext) -> anyhow::Result<bool> {
        let transfers = load_transfers(&ctx.config.grants_dir, &ctx.config.network)?;
        if transfers.map_or(true, |transfers| transfers.is_empty()) {
            info!("8) Distribute Unlocked Tokens");
            info!("- Skipping step, could not find grants");
            return Ok(true);
        }

        let deployer = Token::Address(ctx.accounts.deployer);
        let balance = ctx
            .deployments
            .read_uint("YakToken", "balanceOf", &[deployer])
            .await?;
        let total_supply = ctx.deployments.read_uint("YakToken", "totalSupply", &[]).await?;
        if balance < total_supply {
            info!("8) Distribute Unlocked Tokens");
            info!("- Skipping step, unlocked tokens already distributed");
            return Ok(true);
        }
        Ok(false)
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("8) Distribute Unlocked Tokens");
        let transfers =
            load_transfers(&ctx.config.grants_dir, &ctx.config.network)?.unwrap_or_default();
        let deployer = ctx.accounts.deployer;
        let gas_limit = ctx.config.transfer_gas_limit;
        distribute_transfers(&mut ctx.deployments, "YakToken", deployer, &transfers, gas_limit)
            .await?;
        Ok(())
    }
}
