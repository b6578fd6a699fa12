// Deployment wrapper
//
// Idempotent deploy-by-name plus encoded calls and queries against named
// deployments. All chain access made by pipeline steps goes through here.

pub mod artifacts;
pub mod store;

pub use artifacts::{Artifact, ArtifactStore};
pub use store::DeploymentStore;

use common::DeploymentRecord;
use ethers::{
    abi::{Abi, Function, Token},
    types::{Address, TransactionReceipt, U256},
};
use log::{debug, info};

use crate::error::{DeployError, Result};
use crate::ethereum::{DeployRequest, SendRequest, SharedChain};

/// Options for deploying a named contract
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Artifact to deploy when it differs from the deployment name
    pub contract: Option<String>,
    pub from: Address,
    pub args: Vec<Token>,
    pub gas_limit: Option<U256>,
}

impl DeployOptions {
    pub fn new(from: Address) -> Self {
        Self {
            contract: None,
            from,
            args: Vec::new(),
            gas_limit: None,
        }
    }

    pub fn contract(mut self, contract: &str) -> Self {
        self.contract = Some(contract.to_string());
        self
    }

    pub fn args(mut self, args: Vec<Token>) -> Self {
        self.args = args;
        self
    }

    pub fn gas_limit(mut self, gas_limit: U256) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// Options for a state-changing call
#[derive(Debug, Clone)]
pub struct TxOptions {
    pub from: Address,
    pub value: Option<U256>,
    pub gas_limit: Option<U256>,
}

impl TxOptions {
    pub fn new(from: Address) -> Self {
        Self {
            from,
            value: None,
            gas_limit: None,
        }
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn gas_limit(mut self, gas_limit: U256) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// Outcome of a deploy request
#[derive(Debug, Clone)]
pub struct DeployResult {
    pub record: DeploymentRecord,
    /// False when an existing deployment was reused
    pub newly_deployed: bool,
}

impl DeployResult {
    pub fn address(&self) -> Address {
        self.record.address
    }
}

/// Address paired with the ABI used to talk to it
#[derive(Debug, Clone)]
pub struct ContractHandle {
    /// Name used in logs and errors
    pub name: String,
    pub address: Address,
    pub abi: Abi,
}

impl ContractHandle {
    fn function(&self, method: &str) -> Result<&Function> {
        self.abi
            .function(method)
            .map_err(|_| DeployError::Abi(format!("{} has no method {}", self.name, method)))
    }
}

/// Named deployments on one network
pub struct Deployments {
    chain: SharedChain,
    store: DeploymentStore,
    artifacts: ArtifactStore,
}

impl Deployments {
    pub fn new(chain: SharedChain, store: DeploymentStore, artifacts: ArtifactStore) -> Self {
        Self {
            chain,
            store,
            artifacts,
        }
    }

    pub fn chain(&self) -> &SharedChain {
        &self.chain
    }

    pub fn store(&self) -> &DeploymentStore {
        &self.store
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Record of a named deployment
    pub fn get(&self, name: &str) -> Result<&DeploymentRecord> {
        self.store
            .get(name)
            .ok_or_else(|| DeployError::MissingDeployment(name.to_string()))
    }

    /// Address of a named deployment
    pub fn address(&self, name: &str) -> Result<Address> {
        Ok(self.get(name)?.address)
    }

    /// Handle on a named deployment using its recorded ABI
    pub fn contract(&self, name: &str) -> Result<ContractHandle> {
        self.contract_at(name, name)
    }

    /// Handle on the address of `address_from` using the ABI of `abi_from`.
    ///
    /// Used to talk to a proxy through its implementation's interface.
    pub fn contract_at(&self, abi_from: &str, address_from: &str) -> Result<ContractHandle> {
        let address = self.address(address_from)?;
        let abi = self.deployment_abi(abi_from)?;
        Ok(ContractHandle {
            name: address_from.to_string(),
            address,
            abi,
        })
    }

    fn deployment_abi(&self, name: &str) -> Result<Abi> {
        let record = self.get(name)?;
        match record.abi() {
            Ok(abi) => Ok(abi),
            Err(e) => {
                debug!("stored ABI of {} unreadable ({}), using artifact", name, e);
                Ok(self.artifacts.get(&record.contract_name)?.abi)
            }
        }
    }

    /// Deploy a contract under a name unless a deployment of that name exists
    pub async fn deploy(&mut self, name: &str, options: DeployOptions) -> Result<DeployResult> {
        if let Some(existing) = self.store.get(name) {
            info!(
                "- Deployment of {} skipped, using previous deployment at: {:?}",
                name, existing.address
            );
            return Ok(DeployResult {
                record: existing.clone(),
                newly_deployed: false,
            });
        }

        let contract_name = options.contract.unwrap_or_else(|| name.to_string());
        let artifact = self.artifacts.get(&contract_name)?;
        let constructor_args = options.args.iter().map(|arg| arg.to_string()).collect();
        let request = DeployRequest {
            contract: contract_name.clone(),
            abi: artifact.abi.clone(),
            bytecode: artifact.bytecode.clone(),
            args: options.args,
            from: options.from,
            gas_limit: options.gas_limit,
        };
        let receipt = self
            .chain
            .deploy(request)
            .await
            .map_err(|e| DeployError::Deployment {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let address = receipt.contract_address.ok_or_else(|| DeployError::Deployment {
            name: name.to_string(),
            reason: "receipt carries no contract address".to_string(),
        })?;

        let record = DeploymentRecord {
            contract_name,
            address,
            abi: artifact.abi_json,
            constructor_args,
            transaction_hash: Some(receipt.transaction_hash),
            receipt: Some(receipt),
        };
        match record.gas_used() {
            Some(gas) => info!("- {} deployed at {:?} using {} gas", name, address, gas),
            None => info!("- {} deployed at {:?}", name, address),
        }
        self.store.save(name, record.clone())?;

        Ok(DeployResult {
            record,
            newly_deployed: true,
        })
    }

    /// Call a state-changing method on a named deployment
    pub async fn execute(
        &mut self,
        name: &str,
        options: TxOptions,
        method: &str,
        args: &[Token],
    ) -> Result<TransactionReceipt> {
        let contract = self.contract(name)?;
        self.execute_on(&contract, options, method, args).await
    }

    /// Call a state-changing method on a contract handle
    pub async fn execute_on(
        &mut self,
        contract: &ContractHandle,
        options: TxOptions,
        method: &str,
        args: &[Token],
    ) -> Result<TransactionReceipt> {
        let data = contract.function(method)?.encode_input(args)?;
        let request = SendRequest {
            from: options.from,
            to: contract.address,
            data: data.into(),
            value: options.value,
            gas_limit: options.gas_limit,
        };
        debug!("{}.{} from {:?}", contract.name, method, options.from);
        self.chain
            .send(request)
            .await
            .map_err(|e| DeployError::Execution {
                contract: contract.name.clone(),
                method: method.to_string(),
                reason: e.to_string(),
            })
    }

    /// Query a view method on a named deployment
    pub async fn read(&self, name: &str, method: &str, args: &[Token]) -> Result<Vec<Token>> {
        let contract = self.contract(name)?;
        self.read_on(&contract, method, args).await
    }

    /// Query a view method on a contract handle
    pub async fn read_on(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: &[Token],
    ) -> Result<Vec<Token>> {
        let function = contract.function(method)?;
        let data = function.encode_input(args)?;
        let output = self
            .chain
            .call(contract.address, data.into())
            .await
            .map_err(|e| DeployError::Execution {
                contract: contract.name.clone(),
                method: method.to_string(),
                reason: e.to_string(),
            })?;
        Ok(function.decode_output(&output)?)
    }

    /// Query a method returning a single address
    pub async fn read_address(&self, name: &str, method: &str, args: &[Token]) -> Result<Address> {
        let contract = self.contract(name)?;
        self.read_address_on(&contract, method, args).await
    }

    pub async fn read_address_on(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: &[Token],
    ) -> Result<Address> {
        let tokens = self.read_on(contract, method, args).await?;
        match tokens.into_iter().next() {
            Some(Token::Address(address)) => Ok(address),
            _ => Err(DeployError::UnexpectedOutput {
                contract: contract.name.clone(),
                method: method.to_string(),
            }),
        }
    }

    /// Query a method returning a single unsigned integer
    pub async fn read_uint(&self, name: &str, method: &str, args: &[Token]) -> Result<U256> {
        let contract = self.contract(name)?;
        self.read_uint_on(&contract, method, args).await
    }

    pub async fn read_uint_on(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: &[Token],
    ) -> Result<U256> {
        let tokens = self.read_on(contract, method, args).await?;
        match tokens.into_iter().next() {
            Some(Token::Uint(value)) => Ok(value),
            _ => Err(DeployError::UnexpectedOutput {
                contract: contract.name.clone(),
                method: method.to_string(),
            }),
        }
    }

    /// Native balance of an account
    pub async fn balance(&self, account: Address) -> Result<U256> {
        self.chain.balance(account).await
    }
}
