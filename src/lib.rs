pub mod config;
pub mod context;
pub mod deployments;
pub mod error;
pub mod ethereum;
pub mod grants;
pub mod prism;
pub mod report;
pub mod runner;
pub mod steps;

pub use config::{ConfigManager, DeployConfig};
pub use context::{DeployContext, NamedAccounts};
pub use deployments::{DeployOptions, DeployResult, Deployments, TxOptions};
pub use error::{DeployError, Result};
pub use ethereum::{Chain, EthereumConnector, SharedChain};
pub use runner::{RunReport, Runner, Step, StepRegistry, StepStatus};
pub use steps::{default_registry, default_steps};
