//! Identifier-shape validation
//!
//! Ids and versions are optional, but when present they must be positive,
//! and a version never appears without an id. The root's ark, when present,
//! must be a single token containing an `ark:/` segment.

use crate::error::{ValidationError, ValidationResult};
use crate::validator::ConstellationValidator;
use crate::walk::{for_each_node, root_path};
use snac_model::{Constellation, GraphNode};

/// Checks that every present identifier is well-formed
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierValidator;

impl IdentifierValidator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check_node(path: &str, node: &dyn GraphNode, errors: &mut Vec<ValidationError>) {
        let meta = node.meta();
        if let Some(id) = meta.id {
            if id <= 0 {
                errors.push(ValidationError::malformed(
                    path,
                    format!("id must be positive, got {id}"),
                ));
            }
        }
        if let Some(version) = meta.version {
            if version <= 0 {
                errors.push(ValidationError::malformed(
                    path,
                    format!("version must be positive, got {version}"),
                ));
            }
            if meta.id.is_none() {
                errors.push(ValidationError::malformed(path, "version without id"));
            }
        }
    }

    /// Check ark shape
    #[must_use]
    pub fn is_well_formed_ark(ark: &str) -> bool {
        !ark.is_empty() && !ark.chars().any(char::is_whitespace) && ark.contains("ark:/")
    }
}

impl ConstellationValidator for IdentifierValidator {
    fn name(&self) -> &'static str {
        "identifier"
    }

    fn validate(&self, graph: &Constellation) -> ValidationResult {
        let mut errors = Vec::new();
        if let Some(ark) = &graph.ark {
            if !Self::is_well_formed_ark(ark) {
                errors.push(ValidationError::malformed(
                    root_path(graph),
                    format!("not an ark: '{ark}'"),
                ));
            }
        }
        for_each_node(graph, &mut |path, node| {
            Self::check_node(path, node, &mut errors);
        });
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
