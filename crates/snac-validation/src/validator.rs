//! Validator trait and named kinds

use crate::error::ValidationResult;
use crate::identifier::IdentifierValidator;
use crate::operation::{HasOperationValidator, OperationValidator};
use crate::resource::ResourceRelationValidator;
use serde::{Deserialize, Serialize};
use snac_model::Constellation;

/// A check over a whole constellation
///
/// Implementations must not mutate the graph and must report every problem
/// they find rather than stopping at the first.
pub trait ConstellationValidator: Send + Sync {
    /// Stable name used in logs and configuration
    fn name(&self) -> &'static str;

    /// Run the check
    fn validate(&self, graph: &Constellation) -> ValidationResult;
}

/// Validators selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    Operation,
    HasOperation,
    Identifier,
    ResourceReference,
}

impl ValidatorKind {
    /// Default set run before a write
    pub const DEFAULTS: [Self; 3] = [Self::Operation, Self::Identifier, Self::ResourceReference];

    /// Instantiate the validator
    #[must_use]
    pub fn build(self) -> Box<dyn ConstellationValidator> {
        match self {
            Self::Operation => Box::new(OperationValidator::new()),
            Self::HasOperation => Box::new(HasOperationValidator::new()),
            Self::Identifier => Box::new(IdentifierValidator::new()),
            Self::ResourceReference => Box::new(ResourceRelationValidator::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_built_validators() {
        for (kind, name) in [
            (ValidatorKind::Operation, "operation"),
            (ValidatorKind::HasOperation, "has_operation"),
            (ValidatorKind::Identifier, "identifier"),
            (ValidatorKind::ResourceReference, "resource_reference"),
        ] {
            assert_eq!(kind.build().name(), name);
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{name}\"")
            );
        }
    }
}
