// Grant and transfer distribution
//
// Reads the per-network grant files and turns them into token grants on the
// claim contract or plain token transfers.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use common::utils::{checked_sum, format_token_amount};
use common::{AmountError, Grant, Transfer};
use ethers::{
    abi::Token,
    types::{Address, U256},
};
use log::info;
use serde::de::DeserializeOwned;

use crate::deployments::{Deployments, TxOptions};
use crate::error::{DeployError, Result};

/// Path of the grants file for a network
pub fn grants_path(dir: &Path, network: &str) -> PathBuf {
    dir.join(format!("airdrop-{}.json", network))
}

/// Path of the unlocked transfers file for a network
pub fn transfers_path(dir: &Path, network: &str) -> PathBuf {
    dir.join(format!("transfer-{}.json", network))
}

fn read_entries<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| DeployError::DataFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let entries = serde_json::from_str(&content).map_err(|e| DeployError::DataFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(Some(entries))
}

/// Grants for a network, or `None` when the network has no grants file
pub fn load_grants(dir: &Path, network: &str) -> Result<Option<Vec<Grant>>> {
    read_entries(&grants_path(dir, network))
}

/// Transfers for a network, or `None` when the network has no transfers file
pub fn load_transfers(dir: &Path, network: &str) -> Result<Option<Vec<Transfer>>> {
    read_entries(&transfers_path(dir, network))
}

/// One `addTokenGrants` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantBatch {
    pub recipients: Vec<Address>,
    pub amounts: Vec<U256>,
    /// Exact sum of `amounts`
    pub total: U256,
}

impl GrantBatch {
    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    fn tokens(&self) -> Vec<Token> {
        vec![
            Token::Array(self.recipients.iter().copied().map(Token::Address).collect()),
            Token::Array(self.amounts.iter().copied().map(Token::Uint).collect()),
            Token::Uint(self.total),
        ]
    }
}

/// Split grants into contiguous batches of at most `batch_size`, in file order
pub fn batch_grants(grants: &[Grant], batch_size: usize) -> Result<Vec<GrantBatch>> {
    if batch_size == 0 {
        return Err(DeployError::Config("grant batch size must be positive".to_string()));
    }

    grants
        .chunks(batch_size)
        .map(|chunk| -> Result<GrantBatch> {
            let amounts = chunk
                .iter()
                .map(Grant::amount_wei)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let total = checked_sum(&amounts)?;
            Ok(GrantBatch {
                recipients: chunk.iter().map(|grant| grant.recipient).collect(),
                amounts,
                total,
            })
        })
        .collect()
}

/// Grants not yet recorded on the claim contract, in file order.
///
/// Batches are applied in file order, so the grant a recipient holds must be
/// the sum of a prefix of that recipient's entries. Anything else fails with
/// `GrantMismatch`.
pub async fn pending_grants(
    deployments: &Deployments,
    claim: &str,
    grants: &[Grant],
) -> Result<Vec<Grant>> {
    let mut recipients = Vec::new();
    let mut entries: HashMap<Address, Vec<usize>> = HashMap::new();
    for (index, grant) in grants.iter().enumerate() {
        entries
            .entry(grant.recipient)
            .or_insert_with(|| {
                recipients.push(grant.recipient);
                Vec::new()
            })
            .push(index);
    }

    let mut pending = Vec::new();
    for recipient in recipients {
        let indices = &entries[&recipient];
        let granted = deployments
            .read_uint(claim, "getTokenGrant", &[Token::Address(recipient)])
            .await?;

        let mut applied = granted.is_zero().then_some(0);
        let mut expected = U256::zero();
        for (count, index) in indices.iter().enumerate() {
            expected = expected
                .checked_add(grants[*index].amount_wei()?)
                .ok_or(AmountError::Overflow)?;
            if expected == granted {
                applied = Some(count + 1);
            }
        }

        match applied {
            Some(count) => pending.extend_from_slice(&indices[count..]),
            None => {
                return Err(DeployError::GrantMismatch {
                    recipient,
                    granted,
                    expected,
                })
            }
        }
    }

    pending.sort_unstable();
    Ok(pending.into_iter().map(|index| grants[index].clone()).collect())
}

/// Submit batches to the claim contract in order.
///
/// Stops at the first failing batch. Earlier batches stay applied.
pub async fn submit_grant_batches(
    deployments: &mut Deployments,
    claim: &str,
    owner: Address,
    batches: &[GrantBatch],
    gas_limit: U256,
) -> Result<()> {
    let total = batches.len();
    for (index, batch) in batches.iter().enumerate() {
        info!(
            "- Creating grants for {} recipients - Amt: {} YAK",
            batch.len(),
            format_token_amount(batch.total)
        );
        deployments
            .execute(
                claim,
                TxOptions::new(owner).gas_limit(gas_limit),
                "addTokenGrants",
                &batch.tokens(),
            )
            .await
            .map_err(|source| DeployError::BatchFailed {
                index: index + 1,
                total,
                source: Box::new(source),
            })?;
    }
    Ok(())
}

/// Transfer unlocked tokens from `from` to each recipient, in file order
pub async fn distribute_transfers(
    deployments: &mut Deployments,
    token: &str,
    from: Address,
    transfers: &[Transfer],
    gas_limit: U256,
) -> Result<()> {
    info!("- Distributing unlocked tokens...");
    for transfer in transfers {
        let amount = transfer.amount_wei()?;
        info!(
            "- Transferring tokens to {:?} - Amt: {} YAK",
            transfer.recipient,
            format_token_amount(amount)
        );
        deployments
            .execute(
                token,
                TxOptions::new(from).gas_limit(gas_limit),
                "transfer",
                &[Token::Address(transfer.recipient), Token::Uint(amount)],
            )
            .await?;
        let balance = deployments
            .read_uint(token, "balanceOf", &[Token::Address(transfer.recipient)])
            .await?;
        info!(
            "  Tokens transferred to {:?} - Bal: {} YAK",
            transfer.recipient,
            format_token_amount(balance)
        );
    }
    Ok(())
}
