use ethers::abi::Abi;
use ethers::types::{Address, TransactionReceipt, H256, U256};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use std::fmt;

use crate::AmountError;

/// Number of decimals of the YAK token
pub const TOKEN_DECIMALS: u32 = 18;

/// Persisted record of a single named deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Artifact the deployment was created from
    pub contract_name: String,
    /// Address of the deployed contract
    pub address: Address,
    /// Contract ABI, kept as raw JSON
    pub abi: serde_json::Value,
    /// Display form of each constructor argument
    #[serde(default)]
    pub constructor_args: Vec<String>,
    /// Hash of the creation transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<H256>,
    /// Receipt of the creation transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<TransactionReceipt>,
}

impl DeploymentRecord {
    /// Parse the stored ABI
    pub fn abi(&self) -> Result<Abi, serde_json::Error> {
        serde_json::from_value(self.abi.clone())
    }

    /// Gas used by the creation transaction, if the receipt is known
    pub fn gas_used(&self) -> Option<U256> {
        self.receipt.as_ref().and_then(|receipt| receipt.gas_used)
    }
}

/// Distribution class of a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantClass {
    Team,
    Partners,
    Unlocked,
}

impl fmt::Display for GrantClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantClass::Team => write!(f, "team"),
            GrantClass::Partners => write!(f, "partners"),
            GrantClass::Unlocked => write!(f, "unlocked"),
        }
    }
}

/// Token grant entry from an airdrop file.
///
/// `amount` is denominated in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub recipient: Address,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: String,
    pub class: GrantClass,
}

impl Grant {
    /// Amount in base units
    pub fn amount_wei(&self) -> Result<U256, AmountError> {
        let amount = self.amount.trim();
        if amount.is_empty() {
            return Err(AmountError::InvalidInteger(self.amount.clone()));
        }
        U256::from_dec_str(amount).map_err(|_| AmountError::InvalidInteger(self.amount.clone()))
    }
}

/// Unlocked token transfer entry from a transfer file.
///
/// `amount` is a decimal string in whole tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub recipient: Address,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: String,
}

impl Transfer {
    /// Amount in base units
    pub fn amount_wei(&self) -> Result<U256, AmountError> {
        crate::utils::parse_token_amount(&self.amount)
    }
}

// Data files write amounts either as JSON strings or as plain numbers.
// Numbers are kept as written, since base-unit amounts overflow u64.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Box::<RawValue>::deserialize(deserializer)?;
    let text = raw.get().trim();
    if text.starts_with('"') {
        return serde_json::from_str(text).map_err(D::Error::custom);
    }
    match serde_json::from_str::<serde_json::Number>(text) {
        Ok(_) => Ok(text.to_string()),
        Err(_) => Err(D::Error::custom(format!(
            "amount must be a string or a number, found {}",
            text
        ))),
    }
}
