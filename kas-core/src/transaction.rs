//! Transaction record types: the one shape persisted, exported and aggregated.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::category;
use crate::error::ValidationError;

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Signed contribution of `amount` to a running balance.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(ValidationError::UnknownType(other.to_string())),
        }
    }
}

/// A recorded income or expense event.
///
/// Records are never edited in place; the only way to change one is to
/// delete it and add a new one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique within a store
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    /// Always > 0; the sign comes from `kind`
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    /// Effective date of the transaction (YYYY-MM-DD)
    pub date: NaiveDate,
    /// When the record was created. Audit/export only.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// `+amount` for income, `-amount` for expense
    pub fn signed_amount(&self) -> f64 {
        self.kind.signed(self.amount)
    }
}

/// Unvalidated input for a new transaction.
///
/// Missing `id`, `date` and `created_at` are filled in by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub id: Option<i64>,
    pub kind: TransactionType,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn new(kind: TransactionType, category: impl Into<String>, amount: f64) -> Self {
        Self {
            id: None,
            kind,
            category: category.into(),
            amount,
            description: String::new(),
            date: None,
            created_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Check the amount and the category against the vocabulary of `kind`.
    ///
    /// Id uniqueness depends on the store and is checked there.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_amount(self.amount)?;
        if !category::is_known(self.kind, &self.category) {
            return Err(ValidationError::UnknownCategory {
                kind: self.kind,
                category: self.category.clone(),
            });
        }
        Ok(())
    }

    /// Build the final record. Callers must have validated first.
    pub fn into_transaction(self, id: i64, today: NaiveDate, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            category: self.category,
            amount: self.amount,
            description: self.description,
            date: self.date.unwrap_or(today),
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

impl From<Transaction> for NewTransaction {
    fn from(t: Transaction) -> Self {
        Self {
            id: Some(t.id),
            kind: t.kind,
            category: t.category,
            amount: t.amount,
            description: t.description,
            date: Some(t.date),
            created_at: Some(t.created_at),
        }
    }
}

/// Amounts must be finite and strictly positive.
pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::NonNumericAmount);
    }
    if amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    Ok(())
}
