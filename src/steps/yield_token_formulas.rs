use async_trait::async_trait;
use ethers::{abi::Token, types::U256};
use log::{info, warn};

use crate::context::DeployContext;
use crate::runner::Step;

use super::{deployer_options, ensure_pool, log_deployer_balance};

/// Deploys a voting power formula and an unrewarded MasterYak pool for each
/// configured yield-bearing token
pub struct YieldTokenFormulasStep;

#[async_trait]
impl Step for YieldTokenFormulasStep {
    fn id(&self) -> &str {
        "11_yield_token_formulas"
    }

    fn tags(&self) -> &[&str] {
        &["11", "YieldTokenFormulas"]
    }

    fn dependencies(&self) -> &[&str] {
        &["4", "6"]
    }

    async fn skip(&self, ctx: &DeployContext) -> anyhow::Result<bool> {
        if ctx.config.yield_tokens.is_empty() {
            info!("11) Yield Token Formulas");
            info!("- Skipping step, no yield tokens configured");
            return Ok(true);
        }
        Ok(false)
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()> {
        info!("11) Yield Token Formulas");
        let admin = ctx.accounts.admin;

        for formula in ctx.config.yield_tokens.clone() {
            let options = deployer_options(ctx)
                .contract("UpgradableFormula")
                .args(vec![Token::Address(admin), Token::Uint(formula.cvr_rate_bips)]);
            let result = ctx.deployments.deploy(&formula.deployment_name, options).await?;
            if result.newly_deployed {
                // The registry is owned by the admin account
                warn!(
                    "- Update Token registry manually, setTokenFormula({:?}, {:?})",
                    formula.token,
                    result.address()
                );
            }

            ensure_pool(ctx, U256::zero(), formula.token, &formula.label).await?;
        }

        log_deployer_balance(ctx).await?;
        Ok(())
    }
}
