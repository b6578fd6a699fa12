use ethers::types::U256;
use ethers::utils::{format_ether, parse_units};

use crate::AmountError;

/// Convert a decimal whole-token amount ("12.5") to base units
pub fn parse_token_amount(amount: &str) -> Result<U256, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::InvalidDecimal {
            amount: amount.to_string(),
            reason: "empty amount".to_string(),
        });
    }
    if amount.starts_with('-') {
        return Err(AmountError::InvalidDecimal {
            amount: amount.to_string(),
            reason: "negative amount".to_string(),
        });
    }
    let units = parse_units(amount, "ether").map_err(|e| AmountError::InvalidDecimal {
        amount: amount.to_string(),
        reason: e.to_string(),
    })?;
    Ok(units.into())
}

/// Render a base-unit amount as whole tokens
pub fn format_token_amount(amount: U256) -> String {
    format_ether(amount)
}

/// Sum amounts without wrapping
pub fn checked_sum<'a, I>(amounts: I) -> Result<U256, AmountError>
where
    I: IntoIterator<Item = &'a U256>,
{
    amounts
        .into_iter()
        .try_fold(U256::zero(), |total, amount| total.checked_add(*amount))
        .ok_or(AmountError::Overflow)
}
