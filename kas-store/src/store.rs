//! TransactionStore: the authoritative, persisted list of transactions.
//!
//! Order is newest-first by insertion (not by `date`). Every mutation
//! re-serializes the whole list and writes it back under [`STORAGE_KEY`].
//! A failed write does not undo the in-memory change; it is reported in the
//! returned [`Change`] so the caller can warn the user.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use kas_core::time::local_date;
use kas_core::{NewTransaction, Transaction, ValidationError};
use std::collections::HashSet;

use crate::intent::{Confirm, Decision, DestructiveIntent};
use crate::storage::{PersistError, Storage};

/// Key of the persisted blob.
pub const STORAGE_KEY: &str = "kasVirtualTransactions";

/// What a mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Added(i64),
    Removed { id: i64, found: bool },
    Cleared { removed: usize },
    Imported { added: usize, skipped: usize },
}

/// Notification returned by every mutation, in place of a re-render hook.
#[derive(Debug)]
pub struct Change {
    pub kind: ChangeKind,
    /// Store length after the mutation
    pub len: usize,
    /// Set when the in-memory change could not be written back.
    pub persist_error: Option<PersistError>,
}

impl Change {
    pub fn persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Keep existing records; skip imported ids that are already present.
    #[default]
    Merge,
    /// Drop everything, then import.
    Replace,
}

pub struct TransactionStore<S: Storage> {
    storage: S,
    transactions: Vec<Transaction>,
    last_id: i64,
    tz: Tz,
}

impl<S: Storage> TransactionStore<S> {
    /// Read the persisted list. Missing, unreadable or malformed data gives an
    /// empty store; this never fails.
    pub fn load(storage: S) -> Self {
        let transactions = match storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => parse_blob(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("could not read stored transactions, starting empty: {e}");
                Vec::new()
            }
        };

        let last_id = transactions.iter().map(|t| t.id).max().unwrap_or(0);
        tracing::debug!(count = transactions.len(), "loaded transactions");

        Self {
            storage,
            transactions,
            last_id,
            tz: Tz::UTC,
        }
    }

    /// Timezone used to pick the default date of new transactions.
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Read-only view, newest first.
    pub fn snapshot(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Validate and prepend a new transaction, stamped with the current time.
    pub fn add(&mut self, new: NewTransaction) -> Result<Change, ValidationError> {
        self.add_at(new, Utc::now())
    }

    /// Same as [`add`](Self::add) with an explicit clock.
    pub fn add_at(
        &mut self,
        new: NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<Change, ValidationError> {
        new.validate()?;

        let id = match new.id {
            Some(id) if self.contains(id) => return Err(ValidationError::DuplicateId(id)),
            Some(id) => id,
            None => self.next_id(now)?,
        };
        self.last_id = self.last_id.max(id);

        let txn = new.into_transaction(id, local_date(now, self.tz), now);
        tracing::debug!(id, kind = %txn.kind, amount = txn.amount, "adding transaction");
        self.transactions.insert(0, txn);

        Ok(self.finish(ChangeKind::Added(id)))
    }

    /// Remove by id. Absent ids are a no-op, but the store is still persisted.
    pub fn remove(&mut self, id: i64) -> Change {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        let found = self.transactions.len() != before;
        tracing::debug!(id, found, "removing transaction");

        self.finish(ChangeKind::Removed { id, found })
    }

    pub fn clear(&mut self) -> Change {
        let removed = self.transactions.len();
        self.transactions.clear();
        tracing::debug!(removed, "cleared transactions");

        self.finish(ChangeKind::Cleared { removed })
    }

    /// Bring in records from an export. Invalid records and ids already in
    /// the store are skipped. Imported records keep their relative order and
    /// go in front of existing ones.
    pub fn import(&mut self, records: Vec<Transaction>, mode: ImportMode) -> Change {
        if mode == ImportMode::Replace {
            self.transactions.clear();
        }

        let mut seen: HashSet<i64> = self.transactions.iter().map(|t| t.id).collect();
        let mut incoming = Vec::with_capacity(records.len());
        let mut skipped = 0;

        for record in records {
            let candidate = NewTransaction::from(record.clone());
            if let Err(e) = candidate.validate() {
                tracing::warn!(id = record.id, "skipping imported transaction: {e}");
                skipped += 1;
                continue;
            }
            if !seen.insert(record.id) {
                skipped += 1;
                continue;
            }
            incoming.push(record);
        }

        let added = incoming.len();
        if let Some(max) = incoming.iter().map(|t| t.id).max() {
            self.last_id = self.last_id.max(max);
        }
        incoming.append(&mut self.transactions);
        self.transactions = incoming;

        self.finish(ChangeKind::Imported { added, skipped })
    }

    /// Phase one of a single delete.
    pub fn request_remove(&self, id: i64) -> DestructiveIntent {
        DestructiveIntent::RemoveOne(id)
    }

    /// Phase one of a full reset.
    pub fn request_clear(&self) -> DestructiveIntent {
        DestructiveIntent::ClearAll
    }

    /// Phase two: execute the intent only on [`Decision::Proceed`].
    pub fn resolve(&mut self, intent: DestructiveIntent, decision: Decision) -> Option<Change> {
        if decision == Decision::Abort {
            tracing::debug!(?intent, "destructive intent aborted");
            return None;
        }
        Some(match intent {
            DestructiveIntent::RemoveOne(id) => self.remove(id),
            DestructiveIntent::ClearAll => self.clear(),
        })
    }

    /// Ask `confirmer` about `intent`, then resolve it.
    pub fn confirm_and_resolve<C: Confirm + ?Sized>(
        &mut self,
        intent: DestructiveIntent,
        confirmer: &mut C,
    ) -> Option<Change> {
        let decision = confirmer.confirm(&intent);
        self.resolve(intent, decision)
    }

    fn contains(&self, id: i64) -> bool {
        self.transactions.iter().any(|t| t.id == id)
    }

    /// Creation time in ms, bumped past the last id so two adds in the same
    /// millisecond still get distinct ids.
    fn next_id(&self, now: DateTime<Utc>) -> Result<i64, ValidationError> {
        let after_last = self
            .last_id
            .checked_add(1)
            .ok_or(ValidationError::IdsExhausted(self.last_id))?;
        Ok(now.timestamp_millis().max(after_last))
    }

    fn finish(&mut self, kind: ChangeKind) -> Change {
        let persist_error = self.persist().err();
        if let Some(e) = &persist_error {
            tracing::warn!("transactions were not saved: {e}");
        }
        Change {
            kind,
            len: self.transactions.len(),
            persist_error,
        }
    }

    fn persist(&mut self) -> Result<(), PersistError> {
        let json = serde_json::to_string(&self.transactions)?;
        self.storage.set_item(STORAGE_KEY, &json)
    }
}

/// Malformed data counts as no data. Duplicate ids keep their first
/// occurrence.
fn parse_blob(raw: &str) -> Vec<Transaction> {
    let parsed: Vec<Transaction> = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("stored transactions are malformed, starting empty: {e}");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let before = parsed.len();
    let unique: Vec<Transaction> = parsed.into_iter().filter(|t| seen.insert(t.id)).collect();
    if unique.len() != before {
        tracing::warn!(dropped = before - unique.len(), "dropped stored transactions with duplicate ids");
    }
    unique
}
