//! Core type definitions for the send pipeline

use serde::{Deserialize, Serialize};

/// A validated recipient
///
/// `phone` is the normalized international form, digits only (WhatsApp reads
/// `8801711111111` as `+8801711111111`). Contacts are created by ingestion
/// and immutable afterwards; anything that failed normalization never
/// becomes a `Contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
}

impl Contact {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

impl std::fmt::Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <+{}>", self.name, self.phone)
    }
}

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success,
    Failure(String),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Cumulative run state, emitted after every delivery attempt
///
/// `success_count` only ever grows and `total_count` is fixed for the run.
/// `failed` lists every contact that has failed so far, in attempt order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub success_count: usize,
    pub total_count: usize,
    pub failed: Vec<Contact>,
}

impl ProgressSnapshot {
    /// Terminal snapshot for runs that never reach a delivery attempt:
    /// session start failure, or an empty contact sequence. `total_count`
    /// is reported as 1 in both cases so the front-end sees a single
    /// sentinel shape.
    pub fn aborted() -> Self {
        Self {
            success_count: 0,
            total_count: 1,
            failed: Vec::new(),
        }
    }
}

/// Lifecycle phases of the browser session
///
/// `Uninitialized → Launching → AwaitingAuth → Ready → Closed`, with
/// `AwaitingAuth → Closed` on login timeout and `Ready → Closed` on
/// explicit close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Uninitialized,
    Launching,
    AwaitingAuth,
    Ready,
    Closed,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Launching => write!(f, "launching"),
            Self::AwaitingAuth => write!(f, "awaiting_auth"),
            Self::Ready => write!(f, "ready"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_display_includes_plus_prefix() {
        let contact = Contact::new("Alice", "8801711111111");
        assert_eq!(contact.to_string(), "Alice <+8801711111111>");
    }

    #[test]
    fn aborted_snapshot_reports_one_total() {
        let snapshot = ProgressSnapshot::aborted();
        assert_eq!(snapshot.success_count, 0);
        assert_eq!(snapshot.total_count, 1);
        assert!(snapshot.failed.is_empty());
    }

    #[test]
    fn outcome_success_check() {
        assert!(DeliveryOutcome::Success.is_success());
        assert!(!DeliveryOutcome::Failure("timeout".to_string()).is_success());
    }
}
