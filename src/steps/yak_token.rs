use async_trait::async_trait;
use ethers::abi::Token;
use log::info;

use crate::context::DeployContext;
use crate::runner::Step;

use super::deployer_options;

/// Deploys the governance token, minting the supply to the deployer
pub struct YakTokenStep;

#[async_trait]
impl Step for YakTokenStep {
    fn id(&self) -> &str {
        "1_yak_token"
    }

    fn tags(&self) -> &[&str] {
        &["1", "YakToken"]
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("1) Yak Token");
        let options = deployer_options(ctx).args(vec![Token::Address(ctx.accounts.deployer)]);
        ctx.deployments.deploy("YakToken", options).await?;
        Ok(())
    }
}
