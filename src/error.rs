use std::path::PathBuf;

use common::AmountError;
use thiserror::Error;

/// Errors surfaced by the deployment orchestrator
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Missing required environment variable {key}")]
    MissingEnv { key: &'static str },
    #[error("Invalid value for {key}: {reason}")]
    InvalidEnv { key: &'static str, reason: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to read {path}: {reason}")]
    DataFile { path: PathBuf, reason: String },
    #[error("Invalid amount: {0}")]
    Amount(#[from] AmountError),
    #[error("No artifact found for contract {0}")]
    MissingArtifact(String),
    #[error("No deployment named {0}")]
    MissingDeployment(String),
    #[error("ABI error: {0}")]
    Abi(String),
    #[error("Unexpected output from {contract}.{method}")]
    UnexpectedOutput { contract: String, method: String },
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Transaction reverted: {reason}")]
    Reverted { reason: String },
    #[error("{contract}.{method} failed: {reason}")]
    Execution {
        contract: String,
        method: String,
        reason: String,
    },
    #[error("Deployment of {name} failed: {reason}")]
    Deployment { name: String, reason: String },
    #[error("Grant batch {index} of {total} failed: {source}")]
    BatchFailed {
        index: usize,
        total: usize,
        #[source]
        source: Box<DeployError>,
    },
    #[error("Claim grant of {recipient:?} is {granted}, which does not match the grants file (total {expected})")]
    GrantMismatch {
        recipient: ethers::types::Address,
        granted: ethers::types::U256,
        expected: ethers::types::U256,
    },
    #[error("Dependency cycle between steps: {}", .steps.join(", "))]
    DependencyCycle { steps: Vec<String> },
    #[error("Step {step} depends on tag {tag} which no step provides")]
    UnknownDependency { step: String, tag: String },
    #[error("No step carries tag {0}")]
    UnknownTag(String),
    #[error("Invalid step {id}: {reason}")]
    InvalidStep { id: String, reason: String },
    #[error("Step {step} failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Deployments in {dir} belong to chain {stored}, connected chain is {connected}")]
    ChainMismatch {
        dir: PathBuf,
        stored: u64,
        connected: u64,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ethers::abi::Error> for DeployError {
    fn from(err: ethers::abi::Error) -> Self {
        DeployError::Abi(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
