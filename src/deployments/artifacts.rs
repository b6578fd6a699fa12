use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;

use crate::error::{DeployError, Result};

/// Compiled contract: ABI plus creation bytecode
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub abi: Abi,
    /// ABI as found in the artifact file, persisted with deployment records
    pub abi_json: serde_json::Value,
    pub bytecode: Bytes,
}

impl Artifact {
    /// Build an artifact from a parsed ABI
    pub fn new(contract_name: &str, abi_json: serde_json::Value, bytecode: Bytes) -> Result<Self> {
        let abi: Abi = serde_json::from_value(abi_json.clone())?;
        Ok(Self {
            contract_name: contract_name.to_string(),
            abi,
            abi_json,
            bytecode,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object { object: String },
}

#[derive(Deserialize)]
struct RawArtifact {
    abi: serde_json::Value,
    bytecode: RawBytecode,
}

/// Source of compiled artifacts.
///
/// Artifacts registered in memory take precedence over files. On disk, an
/// artifact is looked up as `<dir>/<Name>.json`, then in the Hardhat layout
/// `<dir>/contracts/<Name>.sol/<Name>.json`, then `<dir>/<Name>.sol/<Name>.json`.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    dir: Option<PathBuf>,
    registered: HashMap<String, Artifact>,
}

impl ArtifactStore {
    /// Store reading from an artifacts directory
    pub fn from_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: Some(dir.into()),
            registered: HashMap::new(),
        }
    }

    /// Store holding only registered artifacts
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Register an artifact under its contract name
    pub fn register(&mut self, artifact: Artifact) {
        self.registered
            .insert(artifact.contract_name.clone(), artifact);
    }

    /// Look up an artifact by contract name
    pub fn get(&self, contract_name: &str) -> Result<Artifact> {
        if let Some(artifact) = self.registered.get(contract_name) {
            return Ok(artifact.clone());
        }
        let dir = self
            .dir
            .as_ref()
            .ok_or_else(|| DeployError::MissingArtifact(contract_name.to_string()))?;
        let path = Self::candidates(dir, contract_name)
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| DeployError::MissingArtifact(contract_name.to_string()))?;
        Self::load_file(&path, contract_name)
    }

    fn candidates(dir: &Path, contract_name: &str) -> Vec<PathBuf> {
        let file_name = format!("{}.json", contract_name);
        let source_dir = format!("{}.sol", contract_name);
        vec![
            dir.join(&file_name),
            dir.join("contracts").join(&source_dir).join(&file_name),
            dir.join(&source_dir).join(&file_name),
        ]
    }

    fn load_file(path: &Path, contract_name: &str) -> Result<Artifact> {
        let content = fs::read_to_string(path).map_err(|e| DeployError::DataFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let raw: RawArtifact = serde_json::from_str(&content).map_err(|e| DeployError::DataFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let hex_code = match raw.bytecode {
            RawBytecode::Hex(code) => code,
            RawBytecode::Object { object } => object,
        };
        let bytecode = hex::decode(hex_code.trim_start_matches("0x")).map_err(|e| {
            DeployError::DataFile {
                path: path.to_path_buf(),
                reason: format!("invalid bytecode: {}", e),
            }
        })?;
        Artifact::new(contract_name, raw.abi, Bytes::from(bytecode))
    }
}
