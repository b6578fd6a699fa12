pub mod types;
pub mod utils;

pub use types::*;

use thiserror::Error;

/// Errors raised while interpreting token amounts from data files
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid integer amount '{0}'")]
    InvalidInteger(String),
    #[error("Invalid decimal amount '{amount}': {reason}")]
    InvalidDecimal { amount: String, reason: String },
    #[error("Amount overflow while summing")]
    Overflow,
}
