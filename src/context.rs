// Deployment context
//
// Everything a pipeline step can see: configuration, named accounts, and
// the deployments on the target network.

use std::sync::Arc;

use ethers::types::Address;
use log::{info, warn};

use crate::config::DeployConfig;
use crate::deployments::{ArtifactStore, DeploymentStore, Deployments};
use crate::error::{DeployError, Result};
use crate::ethereum::{chain::NetworkRegistry, Chain, EthereumConnector, SharedChain};

/// Accounts steps act on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedAccounts {
    pub deployer: Address,
    pub admin: Address,
}

impl NamedAccounts {
    /// Resolve named accounts.
    ///
    /// The deployer is the first signer key, else the configured deployer
    /// address, else the node's first account. The admin is the configured
    /// admin address, else the node's fourth account, else the deployer.
    pub fn resolve(
        config: &DeployConfig,
        signers: &[Address],
        node_accounts: &[Address],
    ) -> Result<Self> {
        let deployer = signers
            .first()
            .copied()
            .or(config.deployer_address)
            .or_else(|| node_accounts.first().copied())
            .ok_or(DeployError::MissingEnv {
                key: "DEPLOYER_PRIVATE_KEY",
            })?;
        let admin = config
            .admin_address
            .or_else(|| node_accounts.get(3).copied())
            .unwrap_or(deployer);
        Ok(Self { deployer, admin })
    }
}

pub struct DeployContext {
    pub config: DeployConfig,
    pub accounts: NamedAccounts,
    pub deployments: Deployments,
}

impl DeployContext {
    pub fn new(config: DeployConfig, accounts: NamedAccounts, deployments: Deployments) -> Self {
        Self {
            config,
            accounts,
            deployments,
        }
    }

    /// Connect to the configured network and open its deployment store
    pub async fn connect(config: DeployConfig) -> Result<Self> {
        let rpc_url = config.rpc_url()?;
        let connector = EthereumConnector::connect(&rpc_url, &config.private_keys).await?;
        let signers = connector.signer_addresses().to_vec();
        let chain: SharedChain = Arc::new(connector);
        Self::with_chain(config, chain, &signers).await
    }

    /// Build a context over an existing chain handle
    pub async fn with_chain(
        config: DeployConfig,
        chain: SharedChain,
        signers: &[Address],
    ) -> Result<Self> {
        let chain_id = chain.chain_id().await?;
        if let Some(network) = NetworkRegistry::new().get(&config.network) {
            if network.chain_id != chain_id {
                warn!(
                    "network {} expects chain {} but the node reports {}",
                    network.name, network.chain_id, chain_id
                );
            }
        }

        let node_accounts = chain.accounts().await?;
        let accounts = NamedAccounts::resolve(&config, signers, &node_accounts)?;
        info!(
            "network {} (chain {}), deployer {:?}, admin {:?}",
            config.network, chain_id, accounts.deployer, accounts.admin
        );

        let store = DeploymentStore::open(&config.deployments_dir, &config.network, chain_id)?;
        let artifacts = ArtifactStore::from_dir(&config.artifacts_dir);
        let deployments = Deployments::new(chain, store, artifacts);
        Ok(Self::new(config, accounts, deployments))
    }

    pub fn chain(&self) -> &dyn Chain {
        self.deployments.chain().as_ref()
    }
}
