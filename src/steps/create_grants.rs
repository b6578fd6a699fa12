use async_trait::async_trait;
use log::info;

use crate::context::DeployContext;
use crate::grants::{batch_grants, load_grants, pending_grants, submit_grant_batches};
use crate::runner::Step;

/// Registers every grant of the grants file on the claim contract, in batches
pub struct CreateGrantsStep;

#[async_trait]
impl Step for CreateGrantsStep {
    fn id(&self) -> &str {
        "9_create_grants"
    }

    fn tags(&self) -> &[&str] {
        &["9", "CreateGrants"]
    }

    fn dependencies(&self) -> &[&str] {
        &["7", "8"]
    }

    async fn skip(&self, ctx: &DeployContext) -> anyhow::Result<bool> {
        let grants = load_grants(&ctx.config.grants_dir, &ctx.config.network)?;
        let grants = match grants {
            Some(grants) if !grants.is_empty() => grants,
            _ => {
                info!("9) Create Grants");
                info!("- Skipping step, could not find grants");
                return Ok(true);
            }
        };

        // Grants add up on repeated calls, so only entries missing on chain
        // count as outstanding
        let pending = pending_grants(&ctx.deployments, "Claim", &grants).await?;
        if pending.is_empty() {
            info!("9) Create Grants");
            info!("- Skipping step, grants already created");
            return Ok(true);
        }
        Ok(false)
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("9) Create Grants");
        let grants =
            load_grants(&ctx.config.grants_dir, &ctx.config.network)?.unwrap_or_default();
        let pending = pending_grants(&ctx.deployments, "Claim", &grants).await?;
        if pending.len() < grants.len() {
            info!(
                "- Resuming, {} of {} grants already created",
                grants.len() - pending.len(),
                grants.len()
            );
        }
        let batches = batch_grants(&pending, ctx.config.grant_batch_size)?;
        let owner = ctx.deployments.read_address("Claim", "owner", &[]).await?;
        let gas_limit = ctx.config.grant_gas_limit;
        submit_grant_batches(&mut ctx.deployments, "Claim", owner, &batches, gas_limit).await?;
        info!("- Done creating grants");
        Ok(())
    }
}
