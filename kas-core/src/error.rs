//! Errors raised when input cannot become a transaction.

use crate::transaction::TransactionType;

/// Rejected input. Nothing is stored when one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Zero or negative amount.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),

    /// Amount is missing, NaN or infinite.
    #[error("amount is not a valid number")]
    NonNumericAmount,

    /// The category is not in the vocabulary for the transaction type.
    #[error("\"{category}\" is not a known {kind} category")]
    UnknownCategory {
        kind: TransactionType,
        category: String,
    },

    /// A type string that is neither `income` nor `expense`.
    #[error("unknown transaction type \"{0}\" (expected income or expense)")]
    UnknownType(String),

    /// An explicit id collides with a record already in the store.
    #[error("a transaction with id {0} already exists")]
    DuplicateId(i64),

    /// The store already holds id `i64::MAX`, so no larger id can be issued.
    #[error("no transaction id left after {0}")]
    IdsExhausted(i64),
}
