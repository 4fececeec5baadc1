//! Audit log domain model.
//!
//! # Invariants
//! - `actor` is never empty; unresolved identity is stored as [`UNKNOWN_ACTOR`].
//! - `timestamp` is non-decreasing in `seq` order.
//! - Entries are immutable once written.

use super::document::DocumentId;
use super::ParseNameError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Actor recorded when identity resolution yields nothing.
pub const UNKNOWN_ACTOR: &str = "unknown";

/// Identity attributed to a mutation, usually an e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Builds an actor from an optional resolved identity.
    ///
    /// Blank or missing identities collapse to [`UNKNOWN_ACTOR`].
    pub fn resolve(identity: Option<&str>) -> Self {
        match identity.map(str::trim) {
            Some(value) if !value.is_empty() => Self(value.to_string()),
            _ => Self::unknown(),
        }
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_ACTOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_ACTOR
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::unknown()
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of accepted mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(ParseNameError {
                value: value.to_string(),
                expected: "create|update|delete",
            }),
        }
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Append sequence assigned by the store.
    pub seq: i64,
    pub actor: Actor,
    pub action: Action,
    pub doc_id: DocumentId,
    /// Document title at the time of the mutation.
    pub title: Option<String>,
    /// Unix epoch milliseconds assigned at append time.
    pub timestamp: i64,
}

/// Read ordering for audit listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOrder {
    /// Newest first.
    #[default]
    TimeDesc,
}

impl LogOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TimeDesc => "time_desc",
        }
    }
}

impl FromStr for LogOrder {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "time_desc" => Ok(Self::TimeDesc),
            _ => Err(ParseNameError {
                value: value.to_string(),
                expected: "time_desc",
            }),
        }
    }
}

/// Filter and paging options for audit listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub order: LogOrder,
    /// Restricts the listing to one document's history.
    pub doc_id: Option<DocumentId>,
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::{Action, Actor, UNKNOWN_ACTOR};

    #[test]
    fn actor_resolve_falls_back_to_unknown() {
        assert_eq!(Actor::resolve(None).as_str(), UNKNOWN_ACTOR);
        assert_eq!(Actor::resolve(Some("   ")).as_str(), UNKNOWN_ACTOR);
        assert!(Actor::default().is_unknown());

        let actor = Actor::resolve(Some(" kim@bl-m.kr "));
        assert_eq!(actor.as_str(), "kim@bl-m.kr");
        assert!(!actor.is_unknown());
    }

    #[test]
    fn action_names_match_storage_values() {
        for action in [Action::Create, Action::Update, Action::Delete] {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert!("archive".parse::<Action>().is_err());
    }
}
