pub mod chain;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::{Abi, Token},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, TransactionReceipt,
        TransactionRequest, U256, U64,
    },
};
use log::debug;

use crate::error::{DeployError, Result};

/// Contract creation request
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Artifact name
    pub contract: String,
    pub abi: Abi,
    pub bytecode: Bytes,
    pub args: Vec<Token>,
    pub from: Address,
    pub gas_limit: Option<U256>,
}

/// State-changing call request
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: Option<U256>,
    pub gas_limit: Option<U256>,
}

/// Connection to the chain the pipeline deploys to.
///
/// Every method waits for its result: transactions are awaited until they
/// are included and a reverted receipt is returned as an error.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Chain ID of the connected node
    async fn chain_id(&self) -> Result<u64>;

    /// Accounts managed by the node
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Native balance of an account
    async fn balance(&self, account: Address) -> Result<U256>;

    /// Submit a contract creation and wait for its receipt
    async fn deploy(&self, request: DeployRequest) -> Result<TransactionReceipt>;

    /// Submit a transaction and wait for its receipt
    async fn send(&self, request: SendRequest) -> Result<TransactionReceipt>;

    /// Call-only query
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}

/// Interface to an EVM node over JSON-RPC
pub struct EthereumConnector {
    provider: Provider<Http>,
    signers: HashMap<Address, LocalWallet>,
    signer_order: Vec<Address>,
    chain_id: u64,
}

impl EthereumConnector {
    /// Connect to a node and register the given private keys as signers
    pub async fn connect(rpc_url: &str, private_keys: &[String]) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| DeployError::Config(format!("invalid RPC URL {}: {}", rpc_url, e)))?;
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| DeployError::Rpc(e.to_string()))?
            .as_u64();

        let mut signers = HashMap::new();
        let mut signer_order = Vec::new();
        for key in private_keys {
            let wallet = key
                .trim_start_matches("0x")
                .parse::<LocalWallet>()
                .map_err(|e| DeployError::Config(format!("invalid private key: {}", e)))?
                .with_chain_id(chain_id);
            signer_order.push(wallet.address());
            signers.insert(wallet.address(), wallet);
        }

        Ok(Self {
            provider,
            signers,
            signer_order,
            chain_id,
        })
    }

    /// Addresses of the registered signers, in the order the keys were given
    pub fn signer_addresses(&self) -> &[Address] {
        &self.signer_order
    }

    // Keyed senders sign locally; any other sender must be unlocked on the node
    async fn submit(&self, from: Address, tx: TypedTransaction) -> Result<TransactionReceipt> {
        let receipt = match self.signers.get(&from) {
            Some(wallet) => {
                let client = SignerMiddleware::new(self.provider.clone(), wallet.clone());
                let receipt = client
                    .send_transaction(tx, None)
                    .await
                    .map_err(|e| DeployError::Reverted {
                        reason: e.to_string(),
                    })?
                    .await
                    .map_err(|e| DeployError::Rpc(e.to_string()))?;
                receipt
            }
            None => self
                .provider
                .send_transaction(tx, None)
                .await
                .map_err(|e| DeployError::Reverted {
                    reason: e.to_string(),
                })?
                .await
                .map_err(|e| DeployError::Rpc(e.to_string()))?,
        };

        let receipt = receipt.ok_or_else(|| {
            DeployError::Rpc("transaction dropped from the mempool".to_string())
        })?;
        if receipt.status == Some(U64::zero()) {
            return Err(DeployError::Reverted {
                reason: format!("status 0 in transaction {:?}", receipt.transaction_hash),
            });
        }
        debug!(
            "transaction {:?} included in block {:?}",
            receipt.transaction_hash, receipt.block_number
        );
        Ok(receipt)
    }
}

#[async_trait]
impl Chain for EthereumConnector {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        self.provider
            .get_accounts()
            .await
            .map_err(|e| DeployError::Rpc(e.to_string()))
    }

    async fn balance(&self, account: Address) -> Result<U256> {
        self.provider
            .get_balance(account, None)
            .await
            .map_err(|e| DeployError::Rpc(e.to_string()))
    }

    async fn deploy(&self, request: DeployRequest) -> Result<TransactionReceipt> {
        let data = match request.abi.constructor() {
            Some(constructor) => constructor.encode_input(request.bytecode.to_vec(), &request.args)?,
            None if request.args.is_empty() => request.bytecode.to_vec(),
            None => {
                return Err(DeployError::Abi(format!(
                    "{} has no constructor but {} arguments were given",
                    request.contract,
                    request.args.len()
                )))
            }
        };

        let mut tx = TransactionRequest::new().from(request.from).data(data);
        if let Some(gas) = request.gas_limit {
            tx = tx.gas(gas);
        }
        let receipt = self.submit(request.from, tx.into()).await?;
        if receipt.contract_address.is_none() {
            return Err(DeployError::Rpc(format!(
                "creation receipt for {} has no contract address",
                request.contract
            )));
        }
        Ok(receipt)
    }

    async fn send(&self, request: SendRequest) -> Result<TransactionReceipt> {
        let mut tx = TransactionRequest::new()
            .from(request.from)
            .to(request.to)
            .data(request.data);
        if let Some(value) = request.value {
            tx = tx.value(value);
        }
        if let Some(gas) = request.gas_limit {
            tx = tx.gas(gas);
        }
        self.submit(request.from, tx.into()).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        self.provider
            .call(&tx, None)
            .await
            .map_err(|e| DeployError::Reverted {
                reason: e.to_string(),
            })
    }
}

/// Shared chain handle
pub type SharedChain = Arc<dyn Chain>;
