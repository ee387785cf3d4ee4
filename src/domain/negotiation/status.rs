//! Negotiation lifecycle status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a negotiation.
///
/// `Initiated` is entered on creation and moves to `InProgress` on the
/// first non-creation message. The four terminal states are absorbing:
/// any further mutation attempt fails with `NegotiationClosed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStatus {
    Initiated,
    InProgress,
    Accepted,
    Rejected,
    Expired,
    Cancelled,
}

impl NegotiationStatus {
    /// Returns the snake_case wire string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationStatus::Initiated => "initiated",
            NegotiationStatus::InProgress => "in_progress",
            NegotiationStatus::Accepted => "accepted",
            NegotiationStatus::Rejected => "rejected",
            NegotiationStatus::Expired => "expired",
            NegotiationStatus::Cancelled => "cancelled",
        }
    }

    /// Returns true if state-changing operations are still allowed.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            NegotiationStatus::Initiated | NegotiationStatus::InProgress
        )
    }
}

impl StateMachine for NegotiationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use NegotiationStatus::*;
        matches!(
            (self, target),
            (Initiated, InProgress)
                | (Initiated, Expired)
                | (Initiated, Cancelled)
                | (InProgress, Accepted)
                | (InProgress, Rejected)
                | (InProgress, Expired)
                | (InProgress, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use NegotiationStatus::*;
        match self {
            Initiated => vec![InProgress, Expired, Cancelled],
            InProgress => vec![Accepted, Rejected, Expired, Cancelled],
            Accepted | Rejected | Expired | Cancelled => vec![],
        }
    }
}

impl std::fmt::Display for NegotiationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_absorbing() {
        for status in [
            NegotiationStatus::Accepted,
            NegotiationStatus::Rejected,
            NegotiationStatus::Expired,
            NegotiationStatus::Cancelled,
        ] {
            assert!(status.is_terminal());
            assert!(!status.is_open());
        }
    }

    #[test]
    fn initiated_cannot_jump_to_accepted() {
        assert!(!NegotiationStatus::Initiated.can_transition_to(&NegotiationStatus::Accepted));
    }

    #[test]
    fn in_progress_reaches_all_terminals() {
        let from = NegotiationStatus::InProgress;
        assert!(from.can_transition_to(&NegotiationStatus::Accepted));
        assert!(from.can_transition_to(&NegotiationStatus::Rejected));
        assert!(from.can_transition_to(&NegotiationStatus::Expired));
        assert!(from.can_transition_to(&NegotiationStatus::Cancelled));
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&NegotiationStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
