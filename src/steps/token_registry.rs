use async_trait::async_trait;
use ethers::abi::Token;
use log::info;

use crate::config::DeployConfig;
use crate::context::DeployContext;
use crate::error::Result;
use crate::runner::Step;

use super::{deployer_options, from_deployer, log_deployer_balance, prism_address, voting_power};

/// Deploys the voting power formulas and the token registry, then wires the
/// registry into the prism
pub struct TokenRegistryStep;

#[async_trait]
impl Step for TokenRegistryStep {
    fn id(&self) -> &str {
        "4_token_registry"
    }

    fn tags(&self) -> &[&str] {
        &["4", "TokenRegistry"]
    }

    fn dependencies(&self) -> &[&str] {
        &["3"]
    }

    fn validate(&self, config: &DeployConfig) -> Result<()> {
        config.token_registry().map(|_| ())
    }

    async fn skip(&self, ctx: &DeployContext) -> anyhow::Result<bool> {
        if let Some(registry) = prism_address(ctx, "tokenRegistry").await? {
            info!("4) TokenRegistry");
            info!("- Skipping step, token registry already set to {:?}", registry);
            return Ok(true);
        }
        Ok(false)
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("4) TokenRegistry");
        let params = ctx.config.token_registry()?;
        let admin = ctx.accounts.admin;
        let token = ctx.deployments.address("YakToken")?;

        let options = deployer_options(ctx);
        let yak_formula = ctx.deployments.deploy("YakFormula", options).await?.address();

        let options = deployer_options(ctx)
            .contract("UpgradableFormula")
            .args(vec![Token::Address(admin), Token::Uint(params.pgl_cvr_rate_bips)]);
        let pgl_formula = ctx.deployments.deploy("PGLFormula", options).await?.address();

        let options = deployer_options(ctx).args(vec![
            Token::Address(admin),
            Token::Array(vec![Token::Address(token), Token::Address(params.pgl_token)]),
            Token::Array(vec![Token::Address(yak_formula), Token::Address(pgl_formula)]),
        ]);
        let registry = ctx.deployments.deploy("TokenRegistry", options).await?.address();

        let prism = voting_power(ctx)?;
        let current = ctx.deployments.read_address_on(&prism, "tokenRegistry", &[]).await?;
        if current != registry {
            info!("- Setting token registry to {:?}", registry);
            let options = from_deployer(ctx);
            ctx.deployments
                .execute_on(&prism, options, "setTokenRegistry", &[Token::Address(registry)])
                .await?;
        } else {
            info!("- Skipping setting token registry");
        }

        log_deployer_balance(ctx).await?;
        Ok(())
    }
}
