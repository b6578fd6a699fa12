// Deployment steps
//
// The AVAX-rewards deployment of the governance system, one step per
// numbered script. Each step logs a "N) Name" header followed by "- ..."
// lines describing what it did.

mod claim_contract;
mod create_grants;
mod lock_manager;
mod master_vesting;
mod master_yak;
mod token_registry;
mod transfer_tokens;
mod voting_power;
mod voting_power_init;
mod yak_token;
mod yield_token_formulas;

pub use claim_contract::ClaimContractStep;
pub use create_grants::CreateGrantsStep;
pub use lock_manager::LockManagerStep;
pub use master_vesting::MasterVestingStep;
pub use master_yak::MasterYakStep;
pub use token_registry::TokenRegistryStep;
pub use transfer_tokens::TransferTokensStep;
pub use voting_power::VotingPowerStep;
pub use voting_power_init::VotingPowerInitStep;
pub use yak_token::YakTokenStep;
pub use yield_token_formulas::YieldTokenFormulasStep;

use common::utils::format_token_amount;
use ethers::{
    abi::Token,
    types::{Address, U256},
    utils::keccak256,
};
use log::info;

use crate::context::DeployContext;
use crate::deployments::{ContractHandle, DeployOptions, TxOptions};
use crate::error::{DeployError, Result};
use crate::runner::{Step, StepRegistry};

/// Every step of the deployment, in registration order
pub fn default_steps() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(YakTokenStep),
        Box::new(VotingPowerStep),
        Box::new(VotingPowerInitStep),
        Box::new(TokenRegistryStep),
        Box::new(LockManagerStep),
        Box::new(MasterYakStep),
        Box::new(ClaimContractStep),
        Box::new(TransferTokensStep),
        Box::new(CreateGrantsStep),
        Box::new(MasterVestingStep),
        Box::new(YieldTokenFormulasStep),
    ]
}

/// Registry holding every step of the deployment
pub fn default_registry() -> Result<StepRegistry> {
    let mut registry = StepRegistry::new();
    registry.register_all(default_steps())?;
    Ok(registry)
}

/// Role LockManager requires from contracts that lock tokens
pub(crate) fn locker_role() -> Token {
    Token::FixedBytes(keccak256("LOCKER_ROLE").to_vec())
}

/// Deploy options from the deployer with the configured gas limit
pub(crate) fn deployer_options(ctx: &DeployContext) -> DeployOptions {
    DeployOptions::new(ctx.accounts.deployer).gas_limit(ctx.config.gas_limit)
}

pub(crate) fn from_deployer(ctx: &DeployContext) -> TxOptions {
    TxOptions::new(ctx.accounts.deployer)
}

/// The voting power prism driven through the implementation's interface
pub(crate) fn voting_power(ctx: &DeployContext) -> Result<ContractHandle> {
    ctx.deployments.contract_at("VotingPower", "VotingPowerPrism")
}

/// Read an address from the prism, treating the zero address as unset
pub(crate) async fn prism_address(ctx: &DeployContext, method: &str) -> Result<Option<Address>> {
    let prism = voting_power(ctx)?;
    let address = ctx.deployments.read_address_on(&prism, method, &[]).await?;
    Ok((!address.is_zero()).then_some(address))
}

pub(crate) async fn log_deployer_balance(ctx: &DeployContext) -> Result<()> {
    let balance = ctx.deployments.balance(ctx.accounts.deployer).await?;
    info!("Deployer Balance: {} AVAX", format_token_amount(balance));
    Ok(())
}

/// Approve `spender` for the deployer's whole balance unless an allowance
/// is already in place
pub(crate) async fn ensure_max_approval(ctx: &mut DeployContext, spender: Address) -> Result<bool> {
    let deployer = ctx.accounts.deployer;
    let allowance = ctx
        .deployments
        .read_uint(
            "YakToken",
            "allowance",
            &[Token::Address(deployer), Token::Address(spender)],
        )
        .await?;
    if !allowance.is_zero() {
        return Ok(false);
    }

    let options = from_deployer(ctx);
    ctx.deployments
        .execute(
            "YakToken",
            options,
            "approve",
            &[Token::Address(spender), Token::Uint(U256::MAX)],
        )
        .await?;
    Ok(true)
}

/// Grant the LockManager locker role to `account` unless it already holds it
pub(crate) async fn ensure_locker_role(ctx: &mut DeployContext, account: Address) -> Result<bool> {
    let granted = ctx
        .deployments
        .read("LockManager", "hasRole", &[locker_role(), Token::Address(account)])
        .await?;
    if let Some(Token::Bool(true)) = granted.first() {
        return Ok(false);
    }

    let options = from_deployer(ctx);
    ctx.deployments
        .execute(
            "LockManager",
            options,
            "grantRole",
            &[locker_role(), Token::Address(account)],
        )
        .await?;
    info!(
        "- Grant role to {:?} for LockManager: {:?}",
        account,
        ctx.deployments.address("LockManager")?
    );
    Ok(true)
}

/// Staking token of every MasterYak pool, by pool id
pub(crate) async fn pool_tokens(ctx: &DeployContext) -> Result<Vec<Address>> {
    let length = ctx.deployments.read_uint("MasterYak", "poolLength", &[]).await?;
    let mut tokens = Vec::new();
    let mut pid = U256::zero();
    while pid < length {
        let info = ctx
            .deployments
            .read("MasterYak", "poolInfo", &[Token::Uint(pid)])
            .await?;
        match info.first() {
            Some(Token::Address(token)) => tokens.push(*token),
            _ => {
                return Err(DeployError::UnexpectedOutput {
                    contract: "MasterYak".to_string(),
                    method: "poolInfo".to_string(),
                })
            }
        }
        pid += U256::one();
    }
    Ok(tokens)
}

/// Add a MasterYak pool for `token` unless one already exists
pub(crate) async fn ensure_pool(
    ctx: &mut DeployContext,
    alloc_points: U256,
    token: Address,
    label: &str,
) -> Result<bool> {
    if pool_tokens(ctx).await?.contains(&token) {
        return Ok(false);
    }

    let options = from_deployer(ctx);
    ctx.deployments
        .execute(
            "MasterYak",
            options,
            "add",
            &[
                Token::Uint(alloc_points),
                Token::Address(token),
                Token::Bool(false),
                Token::Bool(true),
            ],
        )
        .await?;
    log_new_pool(ctx, label).await?;
    Ok(true)
}

/// Log the id of the most recently added MasterYak pool
pub(crate) async fn log_new_pool(ctx: &DeployContext, label: &str) -> Result<()> {
    let pools = ctx.deployments.read_uint("MasterYak", "poolLength", &[]).await?;
    info!("- Create {} pool, PID {}", label, pools.saturating_sub(U256::one()));
    Ok(())
}
