use std::fmt;

use crate::model::AnimalId;

/// Machine-readable error codes for presentation layers and scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    AnimalNotFound,
    InvalidInput,
    CycleDetected,
    DuplicateName,
    InvalidQuery,
    NoCommonAncestor,
    CorruptSnapshot,
    SnapshotWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::AnimalNotFound => "E2001",
            Self::InvalidInput => "E2002",
            Self::CycleDetected => "E2003",
            Self::DuplicateName => "E2004",
            Self::InvalidQuery => "E2005",
            Self::NoCommonAncestor => "E2006",
            Self::CorruptSnapshot => "E3001",
            Self::SnapshotWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::AnimalNotFound => "Animal not found",
            Self::InvalidInput => "Invalid input",
            Self::CycleDetected => "Ancestry cycle",
            Self::DuplicateName => "Animal name already registered",
            Self::InvalidQuery => "Invalid common-ancestor query",
            Self::NoCommonAncestor => "No common ancestor",
            Self::CorruptSnapshot => "Corrupt forest snapshot",
            Self::SnapshotWriteFailed => "Snapshot write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `evo init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .evograph/config.toml and retry."),
            Self::AnimalNotFound => Some("Run `evo list` to see the registered animals."),
            Self::InvalidInput => None,
            Self::CycleDetected => {
                Some("Pick an ancestor that is not a descendant of the animal being moved.")
            }
            Self::DuplicateName => Some("Use `evo show` on the existing animal instead."),
            Self::InvalidQuery => Some("Select two different leaf species (with a scientific name)."),
            Self::NoCommonAncestor => {
                Some("The animals belong to disjoint trees or one lineage has a broken link.")
            }
            Self::CorruptSnapshot => Some("Restore .evograph/forest.json from a backup."),
            Self::SnapshotWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `evo` process releases its lock."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Domain errors raised by the ancestry store and the query engine.
///
/// Every variant is a distinct, inspectable kind; none of them is retried
/// internally because the core performs no I/O of its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AncestryError {
    /// Bad input shape (empty name, over-long field, control characters).
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The id does not resolve to a stored animal.
    #[error("animal id={0} not found")]
    NotFound(AnimalId),

    /// The ancestry relation would cycle, or an already-corrupt chain was
    /// walked. `path` lists the ids in walk order, ending at the repeat.
    #[error("ancestry cycle through animal id={id}: {}", format_path(.path))]
    Cycle { id: AnimalId, path: Vec<AnimalId> },

    /// A nonsensical common-ancestor request.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The two ancestor chains never intersect.
    #[error("no common ancestor found for animals id={a} and id={b}")]
    NoCommonAncestor { a: AnimalId, b: AnimalId },

    /// Another animal already carries this name.
    #[error("'{0}' is already registered")]
    DuplicateName(String),
}

impl AncestryError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::InvalidInput,
            Self::NotFound(_) => ErrorCode::AnimalNotFound,
            Self::Cycle { .. } => ErrorCode::CycleDetected,
            Self::InvalidQuery(_) => ErrorCode::InvalidQuery,
            Self::NoCommonAncestor { .. } => ErrorCode::NoCommonAncestor,
            Self::DuplicateName(_) => ErrorCode::DuplicateName,
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

fn format_path(path: &[AnimalId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" → ")
}
