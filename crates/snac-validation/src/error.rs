//! Validation error types
//!
//! Validation errors are data: every offending node is reported in one pass
//! so an editor can show all problems at once. Only a missing graph is a
//! precondition failure raised immediately.

use snac_model::Operation;

/// One data problem found by a validator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Child edit intent incompatible with the binding ancestor's
    #[error("{path}: '{child}' not allowed below '{parent}'")]
    OperationConflict {
        path: String,
        parent: Operation,
        child: Operation,
    },

    /// Root carries no operation where one is required
    #[error("constellation has no operation")]
    MissingOperation,

    /// Identifier or version present but not well-formed
    #[error("{path}: malformed identifier: {reason}")]
    MalformedIdentifier { path: String, reason: String },

    /// Resource relation without any resource
    #[error("{path}: resource relation has no resource")]
    MissingResource { path: String },

    /// Resource relation pointing at an empty placeholder
    #[error("{path}: resource relation points at an empty resource")]
    EmptyResource { path: String },

    /// Existing resource referenced without id and version
    #[error("{path}: resource must carry id and version unless it is being inserted")]
    UnidentifiedResource { path: String },
}

impl ValidationError {
    /// Create operation conflict error
    pub fn conflict(path: impl Into<String>, parent: Operation, child: Operation) -> Self {
        Self::OperationConflict {
            path: path.into(),
            parent,
            child,
        }
    }

    /// Create malformed identifier error
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Node path the error concerns, if any
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::OperationConflict { path, .. }
            | Self::MalformedIdentifier { path, .. }
            | Self::MissingResource { path }
            | Self::EmptyResource { path }
            | Self::UnidentifiedResource { path } => Some(path),
            Self::MissingOperation => None,
        }
    }
}

/// Outcome of the caller-facing validation wrapper
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// The input was not a graph at all
    #[error("validation precondition failed: {0}")]
    Precondition(String),

    /// The graph has data problems
    #[error("{} validation error(s)", .0.len())]
    Invalid(Vec<ValidationError>),
}

impl ValidationFailure {
    /// Collected data errors (empty for a precondition failure)
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Invalid(errors) => errors,
            Self::Precondition(_) => &[],
        }
    }
}

/// Result alias used by every validator
pub type ValidationResult = Result<(), Vec<ValidationError>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_display() {
        let err = ValidationError::conflict(
            "constellation/nameEntry[0]",
            Operation::Insert,
            Operation::Delete,
        );
        assert_eq!(
            err.to_string(),
            "constellation/nameEntry[0]: 'delete' not allowed below 'insert'"
        );
        assert_eq!(err.path(), Some("constellation/nameEntry[0]"));
    }

    #[test]
    fn failure_display_counts_errors() {
        let failure = ValidationFailure::Invalid(vec![
            ValidationError::MissingOperation,
            ValidationError::malformed("constellation", "negative id"),
        ]);
        assert_eq!(failure.to_string(), "2 validation error(s)");
        assert_eq!(failure.errors().len(), 2);
        assert!(ValidationFailure::Precondition("no graph".into())
            .errors()
            .is_empty());
    }
}
