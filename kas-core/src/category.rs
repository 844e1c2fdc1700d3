//! Fixed category vocabulary, keyed by transaction type.
//!
//! The two lists are independent: a label such as "Belanja" can appear in
//! both, so every lookup is scoped by [`TransactionType`].

use crate::transaction::TransactionType;

pub const INCOME_CATEGORIES: &[&str] = &["Kas", "Bonus", "Belanja", "Penjualan", "Lainnya"];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Makanan",
    "Transportasi",
    "Belanja",
    "Tagihan",
    "Hiburan",
    "Kesehatan",
    "Pendidikan",
    "Lainnya",
];

/// Categories a form should offer for `kind`, in display order.
pub fn categories_for(kind: TransactionType) -> &'static [&'static str] {
    match kind {
        TransactionType::Income => INCOME_CATEGORIES,
        TransactionType::Expense => EXPENSE_CATEGORIES,
    }
}

/// Exact, case-sensitive membership check.
pub fn is_known(kind: TransactionType, category: &str) -> bool {
    categories_for(kind).contains(&category)
}

/// Resolve user input to the canonical label, ignoring case and surrounding
/// whitespace. Returns `None` when nothing matches.
pub fn resolve(kind: TransactionType, input: &str) -> Option<&'static str> {
    let needle = input.trim();
    categories_for(kind)
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(needle))
}

/// First entry of the list, used as the form default.
pub fn default_for(kind: TransactionType) -> &'static str {
    categories_for(kind)[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_scoped_by_type() {
        assert!(is_known(TransactionType::Income, "Penjualan"));
        assert!(!is_known(TransactionType::Expense, "Penjualan"));
        assert!(is_known(TransactionType::Expense, "Kesehatan"));
        assert!(!is_known(TransactionType::Income, "Kesehatan"));

        // shared label
        assert!(is_known(TransactionType::Income, "Belanja"));
        assert!(is_known(TransactionType::Expense, "Belanja"));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(resolve(TransactionType::Expense, " makanan "), Some("Makanan"));
        assert_eq!(resolve(TransactionType::Income, "BONUS"), Some("Bonus"));
        assert_eq!(resolve(TransactionType::Income, "Makanan"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_for(TransactionType::Income), "Kas");
        assert_eq!(default_for(TransactionType::Expense), "Makanan");
        assert_eq!(categories_for(TransactionType::Expense).len(), 8);
    }
}
