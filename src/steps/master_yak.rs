use async_trait::async_trait;
use common::utils::format_token_amount;
use ethers::abi::Token;
use log::info;

use crate::config::DeployConfig;
use crate::context::DeployContext;
use crate::error::Result;
use crate::runner::Step;

use super::{deployer_options, ensure_locker_role, ensure_pool, from_deployer, log_deployer_balance};

/// Deploys the AVAX rewards farm and funds it.
///
/// Each follow-up call is made only when the farm's state still lacks it,
/// so a rerun finishes a partially configured farm.
pub struct MasterYakStep;

#[async_trait]
impl Step for MasterYakStep {
    fn id(&self) -> &str {
        "6_master_yak"
    }

    fn tags(&self) -> &[&str] {
        &["6", "MasterYak"]
    }

    fn dependencies(&self) -> &[&str] {
        &["5"]
    }

    fn validate(&self, config: &DeployConfig) -> Result<()> {
        config.master_yak().map(|_| ())
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("6) MasterYak");
        let params = ctx.config.master_yak()?;
        let token = ctx.deployments.address("YakToken")?;
        let lock_manager = ctx.deployments.address("LockManager")?;

        let options = deployer_options(ctx).args(vec![
            Token::Address(ctx.accounts.deployer),
            Token::Address(lock_manager),
            Token::Uint(params.rewards_start_timestamp),
            Token::Uint(params.rewards_per_second),
        ]);
        let master_yak = ctx.deployments.deploy("MasterYak", options).await?.address();

        ensure_locker_role(ctx, master_yak).await?;
        ensure_pool(ctx, params.yak_alloc_points, token, "YAK").await?;
        ensure_pool(ctx, params.pgl_alloc_points, params.pgl_token, "YAK/AVAX").await?;

        // Rewards are paid in AVAX held by the farm itself
        let funded = !ctx.deployments.balance(master_yak).await?.is_zero();
        if !funded && !params.initial_rewards_balance.is_zero() {
            let options = from_deployer(ctx).value(params.initial_rewards_balance);
            ctx.deployments
                .execute("MasterYak", options, "addRewardsBalance", &[])
                .await?;
            info!(
                "- Add {} AVAX rewards to MasterYak",
                format_token_amount(params.initial_rewards_balance)
            );
        }
        let rewards_per_second = ctx
            .deployments
            .read_uint("MasterYak", "rewardsPerSecond", &[])
            .await?;
        info!(
            "- Rewards per Second {}",
            format_token_amount(rewards_per_second)
        );

        log_deployer_balance(ctx).await?;
        Ok(())
    }
}
