// Network definitions
//
// Known networks the deployment pipeline targets, mirroring the network
// section of the protocol's build configuration.

use std::collections::HashMap;

/// Network configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name as used on the command line and in file names
    pub name: String,

    /// Expected chain ID
    pub chain_id: u64,

    /// Environment variable holding the RPC URL for this network
    pub url_env: Option<&'static str>,

    /// RPC URL used when no environment variable is set
    pub default_url: Option<String>,

    /// Native currency symbol
    pub currency_symbol: String,

    /// Whether the network is a public chain rather than a local node
    pub live: bool,
}

impl NetworkConfig {
    /// Create a new network configuration
    pub fn new(
        name: &str,
        chain_id: u64,
        url_env: Option<&'static str>,
        default_url: Option<&str>,
        live: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            chain_id,
            url_env,
            default_url: default_url.map(str::to_string),
            currency_symbol: "AVAX".to_string(),
            live,
        }
    }

    /// Local development node (forks mainnet, so shares its chain ID)
    pub fn hardhat() -> Self {
        Self::new("hardhat", 43114, None, Some("http://127.0.0.1:8545"), false)
    }

    /// Local node reached over localhost
    pub fn localhost() -> Self {
        Self::new("localhost", 31337, None, Some("http://127.0.0.1:8545"), false)
    }

    /// Avalanche Fuji testnet
    pub fn fuji() -> Self {
        Self::new("fuji", 43113, Some("AVALANCHE_FUJI_URL"), None, true)
    }

    /// Avalanche C-Chain mainnet
    pub fn mainnet() -> Self {
        Self::new("mainnet", 43114, Some("AVALANCHE_MAINNET_URL"), None, true)
    }
}

/// Registry for looking up networks by name
pub struct NetworkRegistry {
    networks: HashMap<String, NetworkConfig>,
}

impl NetworkRegistry {
    /// Create a registry with the default networks
    pub fn new() -> Self {
        let mut registry = Self {
            networks: HashMap::new(),
        };
        registry.add(NetworkConfig::hardhat());
        registry.add(NetworkConfig::localhost());
        registry.add(NetworkConfig::fuji());
        registry.add(NetworkConfig::mainnet());
        registry
    }

    /// Get a network by name
    pub fn get(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.get(name)
    }

    /// Add or replace a network
    pub fn add(&mut self, config: NetworkConfig) {
        self.networks.insert(config.name.clone(), config);
    }

    /// Names of all known networks, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.networks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new()
    }
}
