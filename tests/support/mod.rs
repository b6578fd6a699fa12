// Shared fixtures for integration tests: an in-memory chain that executes
// the governance contracts' observable behavior, plus artifact files.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use ethers::{
    abi::{encode, parse_abi, Function, ParamType, Token},
    types::{Address, Bytes, TransactionReceipt, H256, U256, U64},
    utils::keccak256,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::json;

use yak_deploy::config::{ConfigManager, DeployConfig, MasterYakParams};
use yak_deploy::ethereum::{Chain, DeployRequest, SendRequest};
use yak_deploy::{DeployContext, DeployError, Result, SharedChain};

pub const CHAIN_ID: u64 = 31337;
pub const TOKEN_SUPPLY: u64 = 10_000_000;

pub fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

/// Whole tokens in base units
pub fn tokens(whole: u64) -> U256 {
    U256::from(whole) * U256::exp10(18)
}

fn revert(reason: impl Into<String>) -> DeployError {
    DeployError::Reverted {
        reason: reason.into(),
    }
}

fn arg_address(inputs: &[Token], index: usize) -> Result<Address> {
    match inputs.get(index) {
        Some(Token::Address(address)) => Ok(*address),
        _ => Err(revert(format!("argument {} is not an address", index))),
    }
}

fn arg_uint(inputs: &[Token], index: usize) -> Result<U256> {
    match inputs.get(index) {
        Some(Token::Uint(value)) => Ok(*value),
        _ => Err(revert(format!("argument {} is not a uint", index))),
    }
}

fn arg_array(inputs: &[Token], index: usize) -> Result<Vec<Token>> {
    match inputs.get(index) {
        Some(Token::Array(items)) => Ok(items.clone()),
        _ => Err(revert(format!("argument {} is not an array", index))),
    }
}

#[derive(Debug, Clone, Default)]
struct MockContract {
    kind: String,
    deployer: Address,
    args: Vec<Token>,
    values: HashMap<String, Token>,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    grants: HashMap<Address, U256>,
    pools: Vec<(Address, U256)>,
    user_info: HashMap<(U256, Address), U256>,
    roles: HashSet<(Vec<u8>, Address)>,
    rewards: U256,
}

#[derive(Debug, Clone, Default)]
struct ChainState {
    contracts: HashMap<Address, MockContract>,
    functions: HashMap<[u8; 4], Function>,
    native: HashMap<Address, U256>,
    next_address: u64,
    deploys: usize,
    transactions: usize,
    calls_by_method: HashMap<String, usize>,
    fail_on: Option<(String, usize)>,
}

impl ChainState {
    fn contract(&self, address: Address) -> Result<&MockContract> {
        self.contracts
            .get(&address)
            .ok_or_else(|| revert(format!("no contract at {:?}", address)))
    }

    fn contract_mut(&mut self, address: Address) -> Result<&mut MockContract> {
        self.contracts
            .get_mut(&address)
            .ok_or_else(|| revert(format!("no contract at {:?}", address)))
    }

    fn move_tokens(&mut self, token: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        let contract = self.contract_mut(token)?;
        let balance = contract.balances.get(&from).copied().unwrap_or_default();
        if balance < amount {
            return Err(revert("transfer amount exceeds balance"));
        }
        contract.balances.insert(from, balance - amount);
        *contract.balances.entry(to).or_default() += amount;
        Ok(())
    }

    fn pull_tokens(
        &mut self,
        token: Address,
        spender: Address,
        owner: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let contract = self.contract_mut(token)?;
        let allowance = contract
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default();
        if allowance < amount {
            return Err(revert("transfer amount exceeds allowance"));
        }
        if allowance != U256::MAX {
            contract.allowances.insert((owner, spender), allowance - amount);
        }
        self.move_tokens(token, owner, to, amount)
    }

    fn execute(&mut self, from: Address, to: Address, data: &[u8], value: U256) -> Result<Vec<Token>> {
        if data.len() < 4 {
            return Err(revert("missing selector"));
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&data[..4]);
        let function = self
            .functions
            .get(&selector)
            .cloned()
            .ok_or_else(|| revert(format!("unknown selector 0x{}", hex::encode(selector))))?;
        let inputs = function
            .decode_input(&data[4..])
            .map_err(|e| revert(e.to_string()))?;

        if !value.is_zero() {
            let balance = self.native.get(&from).copied().unwrap_or_default();
            if balance < value {
                return Err(revert("insufficient funds"));
            }
            self.native.insert(from, balance - value);
            *self.native.entry(to).or_default() += value;
        }

        let kind = self.contract(to)?.kind.clone();
        match (kind.as_str(), function.name.as_str()) {
            ("YakToken", "totalSupply") => Ok(vec![Token::Uint(self.contract(to)?.total_supply)]),
            ("YakToken", "balanceOf") => {
                let account = arg_address(&inputs, 0)?;
                let balance = self.contract(to)?.balances.get(&account).copied();
                Ok(vec![Token::Uint(balance.unwrap_or_default())])
            }
            ("YakToken", "allowance") => {
                let key = (arg_address(&inputs, 0)?, arg_address(&inputs, 1)?);
                let allowance = self.contract(to)?.allowances.get(&key).copied();
                Ok(vec![Token::Uint(allowance.unwrap_or_default())])
            }
            ("YakToken", "approve") => {
                let spender = arg_address(&inputs, 0)?;
                let amount = arg_uint(&inputs, 1)?;
                self.contract_mut(to)?.allowances.insert((from, spender), amount);
                Ok(vec![Token::Bool(true)])
            }
            ("YakToken", "transfer") => {
                let recipient = arg_address(&inputs, 0)?;
                self.move_tokens(to, from, recipient, arg_uint(&inputs, 1)?)?;
                Ok(vec![Token::Bool(true)])
            }
            ("Claim", "owner") => Ok(vec![Token::Address(self.contract(to)?.deployer)]),
            ("Claim", "getTokenGrant") => {
                let recipient = arg_address(&inputs, 0)?;
                let granted = self.contract(to)?.grants.get(&recipient).copied();
                Ok(vec![Token::Uint(granted.unwrap_or_default())])
            }
            ("Claim", "addTokenGrant") => {
                let claim = self.contract(to)?.clone();
                if from != claim.deployer {
                    return Err(revert("Claim::addTokenGrant: not owner"));
                }
                let recipient = arg_address(&inputs, 0)?;
                let amount = arg_uint(&inputs, 1)?;
                if amount.is_zero() {
                    return Err(revert("Claim::addTokenGrant: amount must be greater than 0"));
                }
                let token = arg_address(&claim.args, 0)?;
                self.pull_tokens(token, to, from, to, amount)?;
                *self.contract_mut(to)?.grants.entry(recipient).or_default() += amount;
                Ok(vec![])
            }
            ("Claim", "addTokenGrants") => {
                let claim = self.contract(to)?.clone();
                if from != claim.deployer {
                    return Err(revert("Claim::addTokenGrants: not owner"));
                }
                let recipients = arg_array(&inputs, 0)?;
                let amounts = arg_array(&inputs, 1)?;
                let total = arg_uint(&inputs, 2)?;
                if recipients.len() != amounts.len() {
                    return Err(revert("Claim::addTokenGrants: different lengths"));
                }
                let mut sum = U256::zero();
                for amount in &amounts {
                    sum += arg_uint(std::slice::from_ref(amount), 0)?;
                }
                if sum != total {
                    return Err(revert("Claim::addTokenGrants: total does not match"));
                }
                let token = arg_address(&claim.args, 0)?;
                self.pull_tokens(token, to, from, to, total)?;
                let contract = self.contract_mut(to)?;
                for (recipient, amount) in recipients.iter().zip(&amounts) {
                    let recipient = arg_address(std::slice::from_ref(recipient), 0)?;
                    let amount = arg_uint(std::slice::from_ref(amount), 0)?;
                    *contract.grants.entry(recipient).or_default() += amount;
                }
                Ok(vec![])
            }
            ("LockManager", "hasRole") => {
                let role = match inputs.first() {
                    Some(Token::FixedBytes(role)) => role.clone(),
                    _ => return Err(revert("role is not bytes32")),
                };
                let account = arg_address(&inputs, 1)?;
                let held = self.contract(to)?.roles.contains(&(role, account));
                Ok(vec![Token::Bool(held)])
            }
            ("LockManager", "grantRole") => {
                let role = match inputs.first() {
                    Some(Token::FixedBytes(role)) => role.clone(),
                    _ => return Err(revert("role is not bytes32")),
                };
                let account = arg_address(&inputs, 1)?;
                self.contract_mut(to)?.roles.insert((role, account));
                Ok(vec![])
            }
            ("MasterYak", "add") => {
                let alloc_points = arg_uint(&inputs, 0)?;
                let token = arg_address(&inputs, 1)?;
                self.contract_mut(to)?.pools.push((token, alloc_points));
                Ok(vec![])
            }
            ("MasterYak", "poolInfo") => {
                let pid = arg_uint(&inputs, 0)?;
                let pools = &self.contract(to)?.pools;
                if pid >= U256::from(pools.len()) {
                    return Err(revert("invalid pool"));
                }
                let (token, alloc_points) = pools[pid.low_u64() as usize];
                Ok(vec![
                    Token::Address(token),
                    Token::Uint(alloc_points),
                    Token::Uint(U256::zero()),
                    Token::Uint(U256::zero()),
                    Token::Uint(U256::zero()),
                    Token::Bool(false),
                    Token::Bool(true),
                ])
            }
            ("MasterYak", "poolLength") => {
                Ok(vec![Token::Uint(U256::from(self.contract(to)?.pools.len()))])
            }
            ("MasterYak", "addRewardsBalance") => {
                self.contract_mut(to)?.rewards += value;
                Ok(vec![])
            }
            ("MasterYak", "rewardsPerSecond") => {
                Ok(vec![Token::Uint(arg_uint(&self.contract(to)?.args, 3)?)])
            }
            ("MasterYak", "userInfo") => {
                let key = (arg_uint(&inputs, 0)?, arg_address(&inputs, 1)?);
                let amount = self.contract(to)?.user_info.get(&key).copied();
                Ok(vec![Token::Uint(amount.unwrap_or_default()), Token::Uint(U256::zero())])
            }
            ("MasterVesting", "addTokenGrant") => {
                let vesting = self.contract(to)?.clone();
                let token = arg_address(&vesting.args, 0)?;
                let master_yak = arg_address(&vesting.args, 1)?;
                let amount = arg_uint(&inputs, 0)?;
                self.pull_tokens(token, to, from, master_yak, amount)?;
                *self
                    .contract_mut(master_yak)?
                    .user_info
                    .entry((U256::zero(), to))
                    .or_default() += amount;
                Ok(vec![])
            }
            _ => self.generic(to, &function, &inputs),
        }
    }

    // Setters store their argument, zero-argument getters read it back
    fn generic(&mut self, to: Address, function: &Function, inputs: &[Token]) -> Result<Vec<Token>> {
        let name = function.name.as_str();
        if name == "initialize" {
            let token = inputs.first().cloned().ok_or_else(|| revert("missing token"))?;
            self.contract_mut(to)?.values.insert("yakToken".to_string(), token);
            return Ok(vec![]);
        }
        if name == "become" {
            let prism = arg_address(inputs, 0)?;
            self.contract_mut(prism)?
                .values
                .insert("implementation".to_string(), Token::Address(to));
            return Ok(vec![]);
        }
        if let Some(field) = name.strip_prefix("set") {
            if inputs.len() == 1 {
                let mut key = field.to_string();
                if let Some(first) = key.get_mut(0..1) {
                    first.make_ascii_lowercase();
                }
                self.contract_mut(to)?.values.insert(key, inputs[0].clone());
                return Ok(vec![]);
            }
        }
        if inputs.is_empty() && function.outputs.len() == 1 {
            if let Some(value) = self.contract(to)?.values.get(name) {
                return Ok(vec![value.clone()]);
            }
            return match function.outputs[0].kind {
                ParamType::Address => Ok(vec![Token::Address(Address::zero())]),
                ParamType::Uint(_) => Ok(vec![Token::Uint(U256::zero())]),
                ParamType::Bool => Ok(vec![Token::Bool(false)]),
                _ => Err(revert(format!("no value for {}", name))),
            };
        }
        self.contract(to)?;
        Ok(vec![])
    }
}

/// In-memory chain executing the governance contracts
pub struct MockChain {
    accounts: Vec<Address>,
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new() -> Self {
        let accounts: Vec<Address> = (1..=10).map(addr).collect();
        let mut state = ChainState {
            next_address: 0x1000,
            ..Default::default()
        };
        for account in &accounts {
            state.native.insert(*account, tokens(1_000));
        }
        Self {
            accounts,
            state: Mutex::new(state),
        }
    }

    /// Contract creations so far
    pub fn deploy_count(&self) -> usize {
        self.state.lock().unwrap().deploys
    }

    /// Submitted non-creation transactions so far, including reverted ones
    pub fn transaction_count(&self) -> usize {
        self.state.lock().unwrap().transactions
    }

    /// Make the `nth` (1-based) transaction calling `method` revert
    pub fn fail_nth(&self, method: &str, nth: usize) {
        self.state.lock().unwrap().fail_on = Some((method.to_string(), nth));
    }

    pub fn token_balance(&self, token: Address, account: Address) -> U256 {
        let state = self.state.lock().unwrap();
        state.contracts[&token]
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    pub fn grant_of(&self, claim: Address, recipient: Address) -> U256 {
        let state = self.state.lock().unwrap();
        state.contracts[&claim]
            .grants
            .get(&recipient)
            .copied()
            .unwrap_or_default()
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        let state = self.state.lock().unwrap();
        state.contracts[&token]
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Staking tokens of the farm's pools, by pool id
    pub fn pool_tokens(&self, master_yak: Address) -> Vec<Address> {
        let state = self.state.lock().unwrap();
        state.contracts[&master_yak]
            .pools
            .iter()
            .map(|(token, _)| *token)
            .collect()
    }

    pub fn has_locker_role(&self, lock_manager: Address, account: Address) -> bool {
        let role = keccak256("LOCKER_ROLE").to_vec();
        let state = self.state.lock().unwrap();
        state.contracts[&lock_manager].roles.contains(&(role, account))
    }

    pub fn native_balance(&self, account: Address) -> U256 {
        let state = self.state.lock().unwrap();
        state.native.get(&account).copied().unwrap_or_default()
    }

    fn receipt(hash: u64, from: Address, to: Option<Address>, created: Option<Address>) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: H256::from_low_u64_be(hash),
            from,
            to,
            contract_address: created,
            gas_used: Some(U256::from(21_000)),
            status: Some(U64::one()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Chain for MockChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(CHAIN_ID)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    async fn balance(&self, account: Address) -> Result<U256> {
        let state = self.state.lock().unwrap();
        Ok(state.native.get(&account).copied().unwrap_or_default())
    }

    async fn deploy(&self, request: DeployRequest) -> Result<TransactionReceipt> {
        let mut state = self.state.lock().unwrap();
        state.deploys += 1;
        let address = addr(state.next_address);
        state.next_address += 1;
        for function in request.abi.functions() {
            state
                .functions
                .insert(function.short_signature(), function.clone());
        }

        let mut contract = MockContract {
            kind: request.contract.clone(),
            deployer: request.from,
            args: request.args.clone(),
            ..Default::default()
        };
        if request.contract == "YakToken" {
            let holder = arg_address(&request.args, 0)?;
            contract.total_supply = tokens(TOKEN_SUPPLY);
            contract.balances.insert(holder, contract.total_supply);
        }
        state.contracts.insert(address, contract);

        let hash = (state.deploys + state.transactions) as u64;
        Ok(Self::receipt(hash, request.from, None, Some(address)))
    }

    async fn send(&self, request: SendRequest) -> Result<TransactionReceipt> {
        let mut state = self.state.lock().unwrap();
        state.transactions += 1;

        if let Some(function) = request
            .data
            .get(..4)
            .and_then(|selector| <[u8; 4]>::try_from(selector).ok())
            .and_then(|selector| state.functions.get(&selector).cloned())
        {
            let count = state.calls_by_method.entry(function.name.clone()).or_default();
            *count += 1;
            let count = *count;
            if let Some((method, nth)) = &state.fail_on {
                if *method == function.name && *nth == count {
                    return Err(revert(format!("{} forced to fail", method)));
                }
            }
        }

        let mut next = state.clone();
        next.execute(
            request.from,
            request.to,
            &request.data,
            request.value.unwrap_or_default(),
        )?;
        *state = next;

        let hash = (state.deploys + state.transactions) as u64;
        Ok(Self::receipt(hash, request.from, Some(request.to), None))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let mut scratch = self.state.lock().unwrap().clone();
        let output = scratch.execute(Address::zero(), to, &data, U256::zero())?;
        Ok(Bytes::from(encode(&output)))
    }
}

fn params_json(types: &[ParamType]) -> Vec<serde_json::Value> {
    types
        .iter()
        .map(|kind| json!({"name": "", "type": kind.to_string()}))
        .collect()
}

/// JSON ABI from a constructor signature and human-readable functions
pub fn abi_json(constructor: &[ParamType], functions: &[&str]) -> serde_json::Value {
    let parsed = parse_abi(functions).unwrap();
    let mut entries = Vec::new();
    if !constructor.is_empty() {
        entries.push(json!({
            "type": "constructor",
            "inputs": params_json(constructor),
            "stateMutability": "nonpayable"
        }));
    }
    for function in parsed.functions() {
        let inputs: Vec<ParamType> = function.inputs.iter().map(|p| p.kind.clone()).collect();
        let outputs: Vec<ParamType> = function.outputs.iter().map(|p| p.kind.clone()).collect();
        entries.push(json!({
            "type": "function",
            "name": function.name,
            "inputs": params_json(&inputs),
            "outputs": params_json(&outputs),
            "stateMutability": "nonpayable"
        }));
    }
    serde_json::Value::Array(entries)
}

/// Write one artifact file
pub fn write_artifact(dir: &Path, name: &str, constructor: &[ParamType], functions: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    let artifact = json!({
        "contractName": name,
        "abi": abi_json(constructor, functions),
        "bytecode": "0x6080604052"
    });
    fs::write(dir.join(format!("{}.json", name)), artifact.to_string()).unwrap();
}

pub const VOTING_POWER_FUNCTIONS: [&str; 7] = [
    "function become(address)",
    "function initialize(address)",
    "function yakToken() view returns (address)",
    "function tokenRegistry() view returns (address)",
    "function lockManager() view returns (address)",
    "function setTokenRegistry(address)",
    "function setLockManager(address)",
];

pub const PRISM_FUNCTIONS: [&str; 4] = [
    "function setPendingProxyImplementation(address) returns (bool)",
    "function setPendingProxyAdmin(address) returns (bool)",
    "function acceptProxyAdmin() returns (bool)",
    "function proxyAdmin() view returns (address)",
];

/// Write artifacts for every contract of the deployment
pub fn write_artifacts(dir: &Path) {
    use ParamType::{Address as A, Array, Uint};
    let formula = ["function convertTokensToVotingPower(uint256) view returns (uint256)"];

    write_artifact(
        dir,
        "YakToken",
        &[A],
        &[
            "function totalSupply() view returns (uint256)",
            "function balanceOf(address) view returns (uint256)",
            "function transfer(address,uint256) returns (bool)",
            "function approve(address,uint256) returns (bool)",
            "function allowance(address,address) view returns (uint256)",
        ],
    );
    write_artifact(dir, "VotingPower", &[], &VOTING_POWER_FUNCTIONS);
    write_artifact(dir, "VotingPowerPrism", &[A], &PRISM_FUNCTIONS);
    write_artifact(dir, "YakFormula", &[], &formula);
    write_artifact(dir, "UpgradableFormula", &[A, Uint(256)], &formula);
    write_artifact(
        dir,
        "TokenRegistry",
        &[A, Array(Box::new(A)), Array(Box::new(A))],
        &[
            "function tokenFormulas(address) view returns (address)",
            "function setTokenFormula(address,address)",
        ],
    );
    write_artifact(
        dir,
        "LockManager",
        &[A, A],
        &[
            "function grantRole(bytes32,address)",
            "function hasRole(bytes32,address) view returns (bool)",
        ],
    );
    write_artifact(
        dir,
        "MasterYak",
        &[A, A, Uint(256), Uint(256)],
        &[
            "function add(uint256,address,bool,bool)",
            "function poolLength() view returns (uint256)",
            "function poolInfo(uint256) view returns (address,uint256,uint256,uint256,uint256,bool,bool)",
            "function addRewardsBalance()",
            "function rewardsPerSecond() view returns (uint256)",
            "function userInfo(uint256,address) view returns (uint256,uint256)",
        ],
    );
    write_artifact(
        dir,
        "Claim",
        &[A, Uint(256)],
        &[
            "function owner() view returns (address)",
            "function addTokenGrant(address,uint256)",
            "function addTokenGrants(address[],uint256[],uint256)",
            "function getTokenGrant(address) view returns (uint256)",
        ],
    );
    write_artifact(
        dir,
        "MasterVesting",
        &[A, A, Uint(256), A],
        &["function addTokenGrant(uint256,uint16)"],
    );
}

/// Configuration with every step requirement present, rooted at `root`
pub fn create_mock_config(root: &Path) -> DeployConfig {
    ConfigManager::builder()
        .network("localhost")
        .days_to_claim(90)
        .master_yak(MasterYakParams {
            rewards_per_second: U256::exp10(15),
            rewards_start_timestamp: U256::from(1_700_000_000u64),
            initial_rewards_balance: tokens(10),
            yak_alloc_points: U256::from(1_000),
            pgl_alloc_points: U256::from(3_000),
            pgl_token: addr(0xabc),
        })
        .pgl_token(addr(0xabc), 5_000)
        .grants_dir(root.join("grants"))
        .deployments_dir(root.join("deployments"))
        .artifacts_dir(root.join("artifacts"))
        .build()
}

/// Context over the mock chain with artifacts written under `root`
pub async fn create_mock_context(config: DeployConfig, chain: &Arc<MockChain>) -> DeployContext {
    write_artifacts(&config.artifacts_dir);
    let shared: SharedChain = chain.clone();
    DeployContext::with_chain(config, shared, &[]).await.unwrap()
}

/// Write a grants file for the network
pub fn write_grants(root: &Path, network: &str, grants: &[(Address, &str, &str)]) {
    let dir = root.join("grants");
    fs::create_dir_all(&dir).unwrap();
    let entries: Vec<serde_json::Value> = grants
        .iter()
        .map(|(recipient, amount, class)| {
            json!({"recipient": recipient, "amount": amount, "class": class})
        })
        .collect();
    fs::write(
        dir.join(format!("airdrop-{}.json", network)),
        serde_json::to_string(&entries).unwrap(),
    )
    .unwrap();
}

/// Write a transfers file for the network
pub fn write_transfers(root: &Path, network: &str, transfers: &[(Address, &str)]) {
    let dir = root.join("grants");
    fs::create_dir_all(&dir).unwrap();
    let entries: Vec<serde_json::Value> = transfers
        .iter()
        .map(|(recipient, amount)| json!({"recipient": recipient, "amount": amount}))
        .collect();
    fs::write(
        dir.join(format!("transfer-{}.json", network)),
        serde_json::to_string(&entries).unwrap(),
    )
    .unwrap();
}

thread_local! {
    static CAPTURED: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

// Records messages per thread, so concurrent tests see only their own lines
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            CAPTURED.with(|lines| lines.borrow_mut().push(record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Start capturing log lines emitted on the current thread
pub fn capture_logs() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Info);
        }
    });
    CAPTURED.with(|lines| lines.borrow_mut().clear());
}

/// Lines captured on the current thread since `capture_logs`
pub fn captured_logs() -> Vec<String> {
    CAPTURED.with(|lines| lines.borrow().clone())
}
