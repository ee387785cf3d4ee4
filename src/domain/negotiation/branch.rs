//! Conversation branches: named overlays of a negotiation timeline.
//!
//! A branch shares the parent's history up to its fork point; no
//! messages are copied. New messages are tagged with the branch name.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Name of the branch that always exists and has no parent.
pub const MAIN_BRANCH: &str = "main";

/// Maximum length for a branch name.
const MAX_BRANCH_NAME_LENGTH: usize = 100;

/// Validated branch name, unique within a negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Creates a branch name.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is empty or whitespace
    /// - `InvalidFormat` if the name exceeds 100 characters
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("branch_name"));
        }
        if trimmed.len() > MAX_BRANCH_NAME_LENGTH {
            return Err(ValidationError::invalid_format(
                "branch_name",
                format!("must be {} characters or less", MAX_BRANCH_NAME_LENGTH),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the main branch name.
    pub fn main() -> Self {
        Self(MAIN_BRANCH.to_string())
    }

    /// Returns true if this is the main branch.
    pub fn is_main(&self) -> bool {
        self.0 == MAIN_BRANCH
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a branch is for.
///
/// `Alternative` is reserved for exploring different deal terms;
/// pricing and rounds stay root-scoped regardless (branches are view
/// layers over the conversation, not parallel deals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    Scenario,
    Alternative,
    Annotation,
}

/// A named fork of the negotiation timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch this one forked from; `None` only for main.
    pub parent: Option<BranchName>,
    /// Purpose of the branch.
    pub kind: BranchKind,
    /// Global message index at which this branch forked. Messages
    /// before this index on the parent chain are inherited.
    pub fork_point: usize,
    /// When the branch was created.
    pub created_at: Timestamp,
}

impl Branch {
    /// Returns the root branch descriptor.
    pub fn root() -> Self {
        Self {
            parent: None,
            kind: BranchKind::Scenario,
            fork_point: 0,
            created_at: Timestamp::now(),
        }
    }

    /// Returns a fork of `parent` at the given message index.
    pub fn fork(parent: BranchName, kind: BranchKind, fork_point: usize) -> Self {
        Self {
            parent: Some(parent),
            kind,
            fork_point,
            created_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_name_rejects_empty() {
        assert!(BranchName::new("").is_err());
        assert!(BranchName::new("   ").is_err());
    }

    #[test]
    fn branch_name_rejects_too_long() {
        assert!(BranchName::new("b".repeat(MAX_BRANCH_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn main_is_main() {
        assert!(BranchName::main().is_main());
        assert!(!BranchName::new("scenario-a").unwrap().is_main());
    }

    #[test]
    fn fork_records_parent_and_point() {
        let branch = Branch::fork(BranchName::main(), BranchKind::Scenario, 7);
        assert_eq!(branch.parent, Some(BranchName::main()));
        assert_eq!(branch.fork_point, 7);
    }

    #[test]
    fn root_has_no_parent() {
        assert!(Branch::root().parent.is_none());
    }
}
