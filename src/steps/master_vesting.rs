use async_trait::async_trait;
use common::utils::format_token_amount;
use ethers::{
    abi::Token,
    types::{Address, U256},
};
use log::info;

use crate::context::DeployContext;
use crate::error::{DeployError, Result};
use crate::runner::Step;

use super::{
    deployer_options, ensure_locker_role, ensure_max_approval, from_deployer, log_deployer_balance,
};

/// Deploys the team vesting contract and vests the team allocation into
/// MasterYak pool 0
pub struct MasterVestingStep;

#[async_trait]
impl Step for MasterVestingStep {
    fn id(&self) -> &str {
        "10_master_vesting"
    }

    fn tags(&self) -> &[&str] {
        &["10", "MasterVesting"]
    }

    fn dependencies(&self) -> &[&str] {
        &["6"]
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("10) MasterVesting");
        let token = ctx.deployments.address("YakToken")?;
        let master_yak = ctx.deployments.address("MasterYak")?;
        let lock_manager = ctx.deployments.address("LockManager")?;

        let options = deployer_options(ctx).args(vec![
            Token::Address(token),
            Token::Address(master_yak),
            Token::Uint(U256::zero()),
            Token::Address(lock_manager),
        ]);
        let vesting = ctx.deployments.deploy("MasterVesting", options).await?.address();
        let deployer = ctx.accounts.deployer;

        if ensure_max_approval(ctx, vesting).await? {
            info!(
                "- Set max approval for vesting contract at {:?} for deployer: {:?}",
                vesting, deployer
            );
        }
        ensure_locker_role(ctx, vesting).await?;

        // The vested allocation is staked by the vesting contract in pool 0
        let tokens = ctx.config.team_vesting_tokens;
        let days = ctx.config.team_vesting_days;
        if vested_amount(ctx, vesting).await?.is_zero() && !tokens.is_zero() {
            let options = from_deployer(ctx);
            ctx.deployments
                .execute(
                    "MasterVesting",
                    options,
                    "addTokenGrant",
                    &[Token::Uint(tokens), Token::Uint(U256::from(days))],
                )
                .await?;
            info!("- Vest {} YAK for {} days", format_token_amount(tokens), days);
        }

        let amount = vested_amount(ctx, vesting).await?;
        info!("  Balance in MasterYak: {} YAK", format_token_amount(amount));

        log_deployer_balance(ctx).await?;
        let balance = ctx
            .deployments
            .read_uint("YakToken", "balanceOf", &[Token::Address(deployer)])
            .await?;
        info!("Deployer Balance: {} YAK", format_token_amount(balance));
        Ok(())
    }
}

/// Tokens the vesting contract has staked in MasterYak pool 0
async fn vested_amount(ctx: &DeployContext, vesting: Address) -> Result<U256> {
    let user_info = ctx
        .deployments
        .read("MasterYak", "userInfo", &[Token::Uint(U256::zero()), Token::Address(vesting)])
        .await?;
    match user_info.first() {
        Some(Token::Uint(amount)) => Ok(*amount),
        _ => Err(DeployError::UnexpectedOutput {
            contract: "MasterYak".to_string(),
            method: "userInfo".to_string(),
        }),
    }
}
