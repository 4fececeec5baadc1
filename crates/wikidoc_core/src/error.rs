//! Machine-checkable error classification shared by every core component.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Outcome category of a failed core operation.
///
/// `Validation`, `NotFound` and `Cycle` are detected before any mutation and
/// leave stored state untouched. `Storage` during a mutation rolls the whole
/// operation back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Cycle,
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Cycle => "cycle",
            Self::Storage => "storage",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
