//! Two-phase protocol for destructive operations.
//!
//! Phase one raises a [`DestructiveIntent`]; phase two hands it to a
//! [`Confirm`] collaborator. The store mutates only on [`Decision::Proceed`].

/// A pending delete that has not been confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructiveIntent {
    RemoveOne(i64),
    ClearAll,
}

impl DestructiveIntent {
    pub fn title(&self) -> &'static str {
        match self {
            DestructiveIntent::RemoveOne(_) => "Delete transaction?",
            DestructiveIntent::ClearAll => "Delete all data?",
        }
    }

    pub fn warning(&self) -> &'static str {
        match self {
            DestructiveIntent::RemoveOne(_) => "This transaction will be deleted permanently!",
            DestructiveIntent::ClearAll => "Every transaction will be deleted permanently!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Resolves an intent, typically by asking the user.
pub trait Confirm {
    fn confirm(&mut self, intent: &DestructiveIntent) -> Decision;
}

/// A fixed decision answers every intent the same way (`--yes`, tests).
impl Confirm for Decision {
    fn confirm(&mut self, _intent: &DestructiveIntent) -> Decision {
        *self
    }
}
