use anyhow::bail;
use async_trait::async_trait;
use ethers::abi::Token;
use log::{error, info};

use crate::context::DeployContext;
use crate::prism::find_selector_clashes;
use crate::runner::Step;

use super::{deployer_options, log_deployer_balance};

/// Deploys the voting power implementation and the prism proxy in front of it
pub struct VotingPowerStep;

#[async_trait]
impl Step for VotingPowerStep {
    fn id(&self) -> &str {
        "2_voting_power"
    }

    fn tags(&self) -> &[&str] {
        &["2", "VotingPower"]
    }

    fn dependencies(&self) -> &[&str] {
        &["1"]
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("2) Voting Power Prism");

        let artifacts = ctx.deployments.artifacts();
        let prism = artifacts.get("VotingPowerPrism")?;
        let implementation = artifacts.get("VotingPower")?;
        let clashes = find_selector_clashes(&prism.abi, &implementation.abi);
        if !clashes.is_empty() {
            for clash in &clashes {
                error!("- Selector clash: {}", clash);
            }
            bail!(
                "prism invalid, {} selector clashes between VotingPowerPrism and VotingPower",
                clashes.len()
            );
        }

        let options = deployer_options(ctx);
        ctx.deployments.deploy("VotingPower", options).await?;

        let options = deployer_options(ctx).args(vec![Token::Address(ctx.accounts.deployer)]);
        let result = ctx.deployments.deploy("VotingPowerPrism", options).await?;
        if result.newly_deployed {
            log_deployer_balance(ctx).await?;
        }
        Ok(())
    }
}
