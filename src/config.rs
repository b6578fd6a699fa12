// Configuration for the deployment pipeline
//
// Every tunable of the pipeline is resolved once, at startup, into a
// `DeployConfig`. Step-specific values stay optional here; steps ask for them
// through the typed accessors, which report the missing environment key.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};
use crate::ethereum::chain::NetworkRegistry;

/// Default gas limit for deployments and configuration calls
pub const DEFAULT_GAS_LIMIT: u64 = 4_000_000;
/// Default number of recipients per `addTokenGrants` call
pub const DEFAULT_GRANT_BATCH_SIZE: usize = 200;
/// Default gas limit for one grant batch
pub const DEFAULT_GRANT_GAS_LIMIT: u64 = 8_000_000;
/// Default gas limit for one unlocked token transfer
pub const DEFAULT_TRANSFER_GAS_LIMIT: u64 = 100_000;
/// Default team vesting amount, in whole tokens
pub const DEFAULT_TEAM_VESTING_TOKENS: u64 = 1_500;
/// Default team vesting duration, in days
pub const DEFAULT_TEAM_VESTING_DAYS: u16 = 365;

// (deployment name, label, token address key, conversion rate key)
const YIELD_TOKEN_KEYS: [(&str, &str, &str, &str); 4] = [
    (
        "YRTJLPFormula",
        "YRT JLP YAK/AVAX",
        "YRT_JLP_YAK_AVAX_ADDRESS",
        "YRT_JLP_CVR_RATE_BIPS",
    ),
    (
        "YRTPGLFormula",
        "YRT PGL YAK/AVAX",
        "YRT_PGL_YAK_AVAX_ADDRESS",
        "YRT_PGL_CVR_RATE_BIPS",
    ),
    (
        "Formula-YRT-GDL-mYAK-YAK",
        "YRT GDL mYAK/YAK",
        "YRT_GDL_MYAK_YAK_ADDRESS",
        "YRT_GDL_MYAK_YAK_CVR_RATE_BIPS",
    ),
    (
        "Formula-YRT-JLP-mYAK-AVAX",
        "YRT JLP mYAK/AVAX",
        "YRT_JLP_MYAK_AVAX_ADDRESS",
        "YRT_JLP_MYAK_AVAX_CVR_RATE_BIPS",
    ),
];

/// A yield-bearing token that gets its own voting-power formula and farm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldTokenFormula {
    /// Deployment name of the formula contract
    pub deployment_name: String,
    /// Human readable pool label used in logs
    pub label: String,
    /// Yield token address
    pub token: Address,
    /// Conversion rate in basis points
    pub cvr_rate_bips: U256,
}

/// Parameters of the MasterYak farming contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterYakParams {
    pub rewards_per_second: U256,
    pub rewards_start_timestamp: U256,
    pub initial_rewards_balance: U256,
    pub yak_alloc_points: U256,
    pub pgl_alloc_points: U256,
    pub pgl_token: Address,
}

/// Parameters of the token registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRegistryParams {
    pub pgl_token: Address,
    pub pgl_cvr_rate_bips: U256,
}

/// Resolved configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Target network name
    pub network: String,
    /// RPC endpoint
    pub rpc_url: Option<String>,
    /// Signer keys, deployer first
    #[serde(skip_serializing, default)]
    pub private_keys: Vec<String>,
    /// Deployer address when no key is configured
    pub deployer_address: Option<Address>,
    /// Admin address
    pub admin_address: Option<Address>,
    pub days_to_claim: Option<U256>,
    pub avax_rewards_per_second: Option<U256>,
    pub avax_rewards_start_timestamp: Option<U256>,
    pub initial_avax_rewards_balance: Option<U256>,
    pub master_yak_alloc_points: Option<U256>,
    pub master_yak_pgl_alloc_points: Option<U256>,
    pub pgl_yak_avax_address: Option<Address>,
    pub pgl_cvr_rate_bips: Option<U256>,
    pub yield_tokens: Vec<YieldTokenFormula>,
    /// Team vesting amount in base units
    pub team_vesting_tokens: U256,
    pub team_vesting_days: u16,
    pub grants_dir: PathBuf,
    pub deployments_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub gas_limit: U256,
    pub grant_batch_size: usize,
    pub grant_gas_limit: U256,
    pub transfer_gas_limit: U256,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            network: "hardhat".to_string(),
            rpc_url: None,
            private_keys: Vec::new(),
            deployer_address: None,
            admin_address: None,
            days_to_claim: None,
            avax_rewards_per_second: None,
            avax_rewards_start_timestamp: None,
            initial_avax_rewards_balance: None,
            master_yak_alloc_points: None,
            master_yak_pgl_alloc_points: None,
            pgl_yak_avax_address: None,
            pgl_cvr_rate_bips: None,
            yield_tokens: Vec::new(),
            team_vesting_tokens: U256::from(DEFAULT_TEAM_VESTING_TOKENS) * U256::exp10(18),
            team_vesting_days: DEFAULT_TEAM_VESTING_DAYS,
            grants_dir: PathBuf::from("./grants"),
            deployments_dir: PathBuf::from("./deployments"),
            artifacts_dir: PathBuf::from("./artifacts"),
            gas_limit: U256::from(DEFAULT_GAS_LIMIT),
            grant_batch_size: DEFAULT_GRANT_BATCH_SIZE,
            grant_gas_limit: U256::from(DEFAULT_GRANT_GAS_LIMIT),
            transfer_gas_limit: U256::from(DEFAULT_TRANSFER_GAS_LIMIT),
        }
    }
}

fn required<T: Clone>(value: &Option<T>, key: &'static str) -> Result<T> {
    value.clone().ok_or(DeployError::MissingEnv { key })
}

impl DeployConfig {
    /// RPC endpoint for the configured network
    pub fn rpc_url(&self) -> Result<String> {
        if let Some(url) = &self.rpc_url {
            return Ok(url.clone());
        }
        let registry = NetworkRegistry::new();
        let network = registry.get(&self.network).ok_or_else(|| {
            DeployError::Config(format!(
                "unknown network '{}' and RPC_URL is not set (known: {})",
                self.network,
                registry.names().join(", ")
            ))
        })?;
        match (&network.default_url, network.url_env) {
            (Some(url), _) => Ok(url.clone()),
            (None, Some(key)) => Err(DeployError::MissingEnv { key }),
            (None, None) => Err(DeployError::MissingEnv { key: "RPC_URL" }),
        }
    }

    pub fn days_to_claim(&self) -> Result<U256> {
        required(&self.days_to_claim, "DAYS_TO_CLAIM")
    }

    pub fn master_yak(&self) -> Result<MasterYakParams> {
        Ok(MasterYakParams {
            rewards_per_second: required(&self.avax_rewards_per_second, "AVAX_REWARDS_PER_SECOND")?,
            rewards_start_timestamp: required(
                &self.avax_rewards_start_timestamp,
                "AVAX_REWARDS_START_TIMESTAMP",
            )?,
            initial_rewards_balance: required(
                &self.initial_avax_rewards_balance,
                "INITIAL_AVAX_REWARDS_BALANCE",
            )?,
            yak_alloc_points: required(&self.master_yak_alloc_points, "MASTER_YAK_ALLOC_POINTS")?,
            pgl_alloc_points: required(
                &self.master_yak_pgl_alloc_points,
                "MASTER_YAK_PGL_ALLOC_POINTS",
            )?,
            pgl_token: required(&self.pgl_yak_avax_address, "PGL_YAK_AVAX_ADDRESS")?,
        })
    }

    pub fn token_registry(&self) -> Result<TokenRegistryParams> {
        Ok(TokenRegistryParams {
            pgl_token: required(&self.pgl_yak_avax_address, "PGL_YAK_AVAX_ADDRESS")?,
            pgl_cvr_rate_bips: required(&self.pgl_cvr_rate_bips, "PGL_CVR_RATE_BIPS")?,
        })
    }
}

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Resolve configuration from the process environment
    pub fn load_from_env() -> Result<DeployConfig> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::load_from_vars(&vars)
    }

    /// Resolve configuration from a key/value map. Empty values count as unset.
    pub fn load_from_vars(vars: &HashMap<String, String>) -> Result<DeployConfig> {
        let env = EnvReader { vars };
        let defaults = DeployConfig::default();
        let network = env.string("NETWORK").unwrap_or(defaults.network);

        let registry = NetworkRegistry::new();
        let rpc_url = env.string("RPC_URL").or_else(|| {
            registry
                .get(&network)
                .and_then(|n| n.url_env)
                .and_then(|key| env.string(key))
        });

        let private_keys = ["DEPLOYER_PRIVATE_KEY", "TOKEN_DEPLOYER_PRIVATE_KEY"]
            .iter()
            .filter_map(|key| env.string(key))
            .collect();

        let mut yield_tokens = Vec::new();
        for (deployment_name, label, address_key, rate_key) in YIELD_TOKEN_KEYS {
            match (env.address(address_key)?, env.u256(rate_key)?) {
                (Some(token), Some(cvr_rate_bips)) => yield_tokens.push(YieldTokenFormula {
                    deployment_name: deployment_name.to_string(),
                    label: label.to_string(),
                    token,
                    cvr_rate_bips,
                }),
                (None, None) => {}
                (Some(_), None) => {
                    return Err(DeployError::InvalidEnv {
                        key: rate_key,
                        reason: format!("must be set together with {}", address_key),
                    })
                }
                (None, Some(_)) => {
                    return Err(DeployError::InvalidEnv {
                        key: address_key,
                        reason: format!("must be set together with {}", rate_key),
                    })
                }
            }
        }

        let team_vesting_tokens = match env.string("TEAM_VESTING_TOKENS") {
            Some(amount) => common::utils::parse_token_amount(&amount).map_err(|e| {
                DeployError::InvalidEnv {
                    key: "TEAM_VESTING_TOKENS",
                    reason: e.to_string(),
                }
            })?,
            None => defaults.team_vesting_tokens,
        };

        Ok(DeployConfig {
            network,
            rpc_url,
            private_keys,
            deployer_address: env.address("DEPLOYER_ADDRESS")?,
            admin_address: env.address("ADMIN_ADDRESS")?,
            days_to_claim: env.u256("DAYS_TO_CLAIM")?,
            avax_rewards_per_second: env.u256("AVAX_REWARDS_PER_SECOND")?,
            avax_rewards_start_timestamp: env.u256("AVAX_REWARDS_START_TIMESTAMP")?,
            initial_avax_rewards_balance: env.u256("INITIAL_AVAX_REWARDS_BALANCE")?,
            master_yak_alloc_points: env.u256("MASTER_YAK_ALLOC_POINTS")?,
            master_yak_pgl_alloc_points: env.u256("MASTER_YAK_PGL_ALLOC_POINTS")?,
            pgl_yak_avax_address: env.address("PGL_YAK_AVAX_ADDRESS")?,
            pgl_cvr_rate_bips: env.u256("PGL_CVR_RATE_BIPS")?,
            yield_tokens,
            team_vesting_tokens,
            team_vesting_days: env
                .parsed::<u16>("TEAM_VESTING_DAYS")?
                .unwrap_or(defaults.team_vesting_days),
            grants_dir: env.path("GRANTS_DIR").unwrap_or(defaults.grants_dir),
            deployments_dir: env.path("DEPLOYMENTS_DIR").unwrap_or(defaults.deployments_dir),
            artifacts_dir: env.path("ARTIFACTS_DIR").unwrap_or(defaults.artifacts_dir),
            gas_limit: env.u256("DEPLOY_GAS_LIMIT")?.unwrap_or(defaults.gas_limit),
            grant_batch_size: env
                .parsed::<usize>("GRANT_BATCH_SIZE")?
                .unwrap_or(defaults.grant_batch_size),
            grant_gas_limit: env.u256("GRANT_GAS_LIMIT")?.unwrap_or(defaults.grant_gas_limit),
            transfer_gas_limit: env
                .u256("TRANSFER_GAS_LIMIT")?
                .unwrap_or(defaults.transfer_gas_limit),
        })
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<DeployConfig> {
        let config_str = fs::read_to_string(path)?;
        let config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Save configuration to a JSON file. Private keys are never written.
    pub fn save_to_file<P: AsRef<Path>>(config: &DeployConfig, path: P) -> Result<()> {
        let config_str = serde_json::to_string_pretty(config)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Create a builder for configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

struct EnvReader<'a> {
    vars: &'a HashMap<String, String>,
}

impl EnvReader<'_> {
    fn string(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.string(key).map(PathBuf::from)
    }

    fn u256(&self, key: &'static str) -> Result<Option<U256>> {
        self.string(key)
            .map(|value| {
                U256::from_dec_str(&value).map_err(|e| DeployError::InvalidEnv {
                    key,
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    fn address(&self, key: &'static str) -> Result<Option<Address>> {
        self.string(key)
            .map(|value| {
                Address::from_str(&value).map_err(|e| DeployError::InvalidEnv {
                    key,
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    fn parsed<T>(&self, key: &'static str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.string(key)
            .map(|value| {
                value.parse::<T>().map_err(|e| DeployError::InvalidEnv {
                    key,
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

/// Builder for creating configurations
#[derive(Default)]
pub struct ConfigBuilder {
    config: DeployConfig,
}

impl ConfigBuilder {
    pub fn network(mut self, value: &str) -> Self {
        self.config.network = value.to_string();
        self
    }

    pub fn rpc_url(mut self, value: &str) -> Self {
        self.config.rpc_url = Some(value.to_string());
        self
    }

    pub fn private_key(mut self, value: &str) -> Self {
        self.config.private_keys.push(value.to_string());
        self
    }

    pub fn deployer(mut self, value: Address) -> Self {
        self.config.deployer_address = Some(value);
        self
    }

    pub fn admin(mut self, value: Address) -> Self {
        self.config.admin_address = Some(value);
        self
    }

    pub fn days_to_claim(mut self, value: u64) -> Self {
        self.config.days_to_claim = Some(U256::from(value));
        self
    }

    /// Set every MasterYak parameter at once
    pub fn master_yak(mut self, params: MasterYakParams) -> Self {
        self.config.avax_rewards_per_second = Some(params.rewards_per_second);
        self.config.avax_rewards_start_timestamp = Some(params.rewards_start_timestamp);
        self.config.initial_avax_rewards_balance = Some(params.initial_rewards_balance);
        self.config.master_yak_alloc_points = Some(params.yak_alloc_points);
        self.config.master_yak_pgl_alloc_points = Some(params.pgl_alloc_points);
        self.config.pgl_yak_avax_address = Some(params.pgl_token);
        self
    }

    pub fn pgl_token(mut self, token: Address, cvr_rate_bips: u64) -> Self {
        self.config.pgl_yak_avax_address = Some(token);
        self.config.pgl_cvr_rate_bips = Some(U256::from(cvr_rate_bips));
        self
    }

    pub fn yield_token(mut self, formula: YieldTokenFormula) -> Self {
        self.config.yield_tokens.push(formula);
        self
    }

    pub fn grants_dir<P: Into<PathBuf>>(mut self, value: P) -> Self {
        self.config.grants_dir = value.into();
        self
    }

    pub fn deployments_dir<P: Into<PathBuf>>(mut self, value: P) -> Self {
        self.config.deployments_dir = value.into();
        self
    }

    pub fn artifacts_dir<P: Into<PathBuf>>(mut self, value: P) -> Self {
        self.config.artifacts_dir = value.into();
        self
    }

    pub fn grant_batch_size(mut self, value: usize) -> Self {
        self.config.grant_batch_size = value;
        self
    }

    /// Build the configuration
    pub fn build(self) -> DeployConfig {
        self.config
    }
}
