// Deployment store
//
// Persists one record per deployment name under
// `<deployments_dir>/<network>/<Name>.json`, guarded by a `.chainId` file
// so records made on one chain are never reused on another.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use common::DeploymentRecord;
use log::debug;

use crate::error::{DeployError, Result};

const CHAIN_ID_FILE: &str = ".chainId";

/// Records of completed deployments for one network
#[derive(Debug, Default)]
pub struct DeploymentStore {
    dir: Option<PathBuf>,
    records: BTreeMap<String, DeploymentRecord>,
}

impl DeploymentStore {
    /// Store that keeps records in memory only
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store for a network, creating its directory when needed
    pub fn open(root: &Path, network: &str, chain_id: u64) -> Result<Self> {
        let dir = root.join(network);
        fs::create_dir_all(&dir)?;

        let chain_id_path = dir.join(CHAIN_ID_FILE);
        if chain_id_path.exists() {
            let stored = fs::read_to_string(&chain_id_path)?;
            let stored: u64 = stored.trim().parse().map_err(|_| DeployError::DataFile {
                path: chain_id_path.clone(),
                reason: format!("not a chain ID: {:?}", stored.trim()),
            })?;
            if stored != chain_id {
                return Err(DeployError::ChainMismatch {
                    dir,
                    stored,
                    connected: chain_id,
                });
            }
        } else {
            fs::write(&chain_id_path, chain_id.to_string())?;
        }

        let mut records = BTreeMap::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let name = match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            let content = fs::read_to_string(&path)?;
            let record: DeploymentRecord =
                serde_json::from_str(&content).map_err(|e| DeployError::DataFile {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            records.insert(name, record);
        }
        debug!("loaded {} deployment records from {}", records.len(), dir.display());

        Ok(Self {
            dir: Some(dir),
            records,
        })
    }

    /// Directory backing this store, if any
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&DeploymentRecord> {
        self.records.get(name)
    }

    /// Record a deployment, writing it through to disk
    pub fn save(&mut self, name: &str, record: DeploymentRecord) -> Result<()> {
        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{}.json", name));
            fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        }
        self.records.insert(name.to_string(), record);
        Ok(())
    }

    /// All records, ordered by deployment name
    pub fn all(&self) -> impl Iterator<Item = (&String, &DeploymentRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
