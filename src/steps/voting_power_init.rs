use async_trait::async_trait;
use ethers::abi::Token;
use log::info;

use crate::context::DeployContext;
use crate::runner::Step;

use super::{from_deployer, log_deployer_balance, voting_power};

/// Points the prism at its implementation, initializes it with the token and
/// hands proxy administration to the admin account
pub struct VotingPowerInitStep;

#[async_trait]
impl Step for VotingPowerInitStep {
    fn id(&self) -> &str {
        "3_voting_power_init"
    }

    fn tags(&self) -> &[&str] {
        &["3", "VotingPowerInit"]
    }

    fn dependencies(&self) -> &[&str] {
        &["2"]
    }

    async fn skip(&self, ctx: &DeployContext) -> anyhow::Result<bool> {
        let token = ctx.deployments.address("YakToken")?;
        let prism = voting_power(ctx)?;
        let current = ctx.deployments.read_address_on(&prism, "yakToken", &[]).await?;
        if !token.is_zero() && current == token {
            info!("3) Initialize Voting Power");
            info!(
                "- Skipping step, voting power prism at {:?} already initialized",
                prism.address
            );
            return Ok(true);
        }
        Ok(false)
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("3) Initialize Voting Power");
        let admin = ctx.accounts.admin;
        let token = ctx.deployments.address("YakToken")?;
        let implementation = ctx.deployments.address("VotingPower")?;
        let prism = voting_power(ctx)?;

        let options = from_deployer(ctx);
        ctx.deployments
            .execute(
                "VotingPowerPrism",
                options.clone(),
                "setPendingProxyImplementation",
                &[Token::Address(implementation)],
            )
            .await?;
        info!(
            "- Set pending voting power implementation for prism at {:?} to contract at {:?}",
            prism.address, implementation
        );

        ctx.deployments
            .execute("VotingPower", options.clone(), "become", &[Token::Address(prism.address)])
            .await?;
        info!(
            "- Accepted pending voting power implementation of contract at {:?}",
            implementation
        );

        ctx.deployments
            .execute_on(&prism, options.clone(), "initialize", &[Token::Address(token)])
            .await?;
        info!(
            "- Initialized voting power at {:?} via prism at {:?}",
            implementation, prism.address
        );

        ctx.deployments
            .execute(
                "VotingPowerPrism",
                options,
                "setPendingProxyAdmin",
                &[Token::Address(admin)],
            )
            .await?;
        info!(
            "- Set pending voting power admin for prism at {:?} to {:?}",
            prism.address, admin
        );
        info!(
            "- {:?} can now call 'acceptAdmin' via the voting power prism proxy to become the admin",
            admin
        );

        log_deployer_balance(ctx).await?;
        Ok(())
    }
}
