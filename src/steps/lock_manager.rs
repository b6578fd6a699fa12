use async_trait::async_trait;
use ethers::abi::Token;
use log::info;

use crate::context::DeployContext;
use crate::runner::Step;

use super::{deployer_options, from_deployer, log_deployer_balance, prism_address, voting_power};

/// Deploys the lock manager and wires it into the prism
pub struct LockManagerStep;

#[async_trait]
impl Step for LockManagerStep {
    fn id(&self) -> &str {
        "5_lock_manager"
    }

    fn tags(&self) -> &[&str] {
        &["5", "LockManager"]
    }

    fn dependencies(&self) -> &[&str] {
        &["4"]
    }

    async fn skip(&self, ctx: &DeployContext) -> anyhow::Result<bool> {
        if let Some(lock_manager) = prism_address(ctx, "lockManager").await? {
            info!("5) LockManager");
            info!("- Skipping step, lock manager already set to {:?}", lock_manager);
            return Ok(true);
        }
        Ok(false)
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("5) LockManager");
        let prism = voting_power(ctx)?;

        let options = deployer_options(ctx).args(vec![
            Token::Address(prism.address),
            Token::Address(ctx.accounts.deployer),
        ]);
        let lock_manager = ctx.deployments.deploy("LockManager", options).await?.address();

        let current = ctx.deployments.read_address_on(&prism, "lockManager", &[]).await?;
        if current != lock_manager {
            info!("- Setting lock manager to {:?}", lock_manager);
            let options = from_deployer(ctx);
            ctx.deployments
                .execute_on(&prism, options, "setLockManager", &[Token::Address(lock_manager)])
                .await?;
        } else {
            info!("- Skipping setting lock manager");
        }

        log_deployer_balance(ctx).await?;
        Ok(())
    }
}
