//! Operation-consistency validation
//!
//! A parent's edit intent constrains its children's, top-down, at every
//! depth. The binding constraint for a node is the operation of its nearest
//! ancestor that has one, so a `Delete` three levels up still forbids an
//! `Insert` at the leaf even when the levels in between carry no operation.

use crate::error::{ValidationError, ValidationResult};
use crate::validator::ConstellationValidator;
use crate::walk::{labelled_children, root_path};
use snac_model::{Constellation, GraphNode, Operation};

/// Checks parent/child operation compatibility across the whole graph
///
/// A root without an operation is a no-op graph: any component operation
/// passes. All violations are collected; nothing short-circuits.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationValidator;

impl OperationValidator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check(
        node: &dyn GraphNode,
        binding: Operation,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        for (child, child_path) in labelled_children(node, path) {
            let op = child.operation();
            if !binding.permits_child(op) {
                errors.push(ValidationError::conflict(&child_path, binding, op));
            }
            // An offending child binds its own subtree so one mistake is
            // reported once rather than again for every descendant.
            let next = if op.is_set() { op } else { binding };
            Self::check(child, next, &child_path, errors);
        }
    }
}

impl ConstellationValidator for OperationValidator {
    fn name(&self) -> &'static str {
        "operation"
    }

    fn validate(&self, graph: &Constellation) -> ValidationResult {
        let mut errors = Vec::new();
        Self::check(graph, graph.operation(), &root_path(graph), &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Variant that additionally requires the root to carry an operation
#[derive(Debug, Clone, Copy, Default)]
pub struct HasOperationValidator;

impl HasOperationValidator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ConstellationValidator for HasOperationValidator {
    fn name(&self) -> &'static str {
        "has_operation"
    }

    fn validate(&self, graph: &Constellation) -> ValidationResult {
        let mut errors = Vec::new();
        if !graph.operation().is_set() {
            errors.push(ValidationError::MissingOperation);
        }
        if let Err(more) = OperationValidator.validate(graph) {
            errors.extend(more);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snac_model::{NameContributor, NameEntry, NodeMeta};

    fn with_name(root: Operation, child: Operation) -> Constellation {
        let mut c = Constellation::new().with_operation(root);
        let mut entry = NameEntry::new("Smith, John", Some(99.0));
        entry.meta.operation = child;
        c.name_entries.push(entry);
        c
    }

    #[test]
    fn insert_root_accepts_insert_child() {
        assert!(OperationValidator
            .validate(&with_name(Operation::Insert, Operation::Insert))
            .is_ok());
    }

    #[test]
    fn insert_root_rejects_delete_and_update_children() {
        for child in [Operation::Delete, Operation::Update] {
            let errors = OperationValidator
                .validate(&with_name(Operation::Insert, child))
                .unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors[0],
                ValidationError::conflict("constellation/nameEntry[0]", Operation::Insert, child)
            );
        }
    }

    #[test]
    fn delete_root_rules() {
        assert!(OperationValidator
            .validate(&with_name(Operation::Delete, Operation::Delete))
            .is_ok());
        for child in [Operation::Insert, Operation::Update] {
            let errors = OperationValidator
                .validate(&with_name(Operation::Delete, child))
                .unwrap_err();
            assert_eq!(errors.len(), 1);
        }
    }

    #[test]
    fn update_root_accepts_everything() {
        for child in [
            Operation::Insert,
            Operation::Update,
            Operation::Delete,
            Operation::None,
        ] {
            assert!(OperationValidator
                .validate(&with_name(Operation::Update, child))
                .is_ok());
        }
    }

    #[test]
    fn unset_root_accepts_component_insert() {
        assert!(OperationValidator
            .validate(&with_name(Operation::None, Operation::Insert))
            .is_ok());
    }

    #[test]
    fn delete_binds_through_unset_levels() {
        let mut c = with_name(Operation::Delete, Operation::None);
        c.name_entries[0].contributors.push(NameContributor {
            meta: NodeMeta::with_operation(Operation::Insert),
            name: "VIAF".into(),
            ..NameContributor::default()
        });
        let errors = OperationValidator.validate(&c).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::conflict(
                "constellation/nameEntry[0]/contributor[0]",
                Operation::Delete,
                Operation::Insert
            )]
        );
    }

    #[test]
    fn collects_every_violation() {
        let mut c = with_name(Operation::Insert, Operation::Delete);
        let mut second = NameEntry::new("Smith, J.", None);
        second.meta.operation = Operation::Update;
        c.name_entries.push(second);
        let errors = OperationValidator.validate(&c).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].path(), Some("constellation/nameEntry[1]"));
    }

    #[test]
    fn empty_graph_passes_operation_but_not_has_operation() {
        let c = Constellation::new();
        assert!(OperationValidator.validate(&c).is_ok());
        assert_eq!(
            HasOperationValidator.validate(&c).unwrap_err(),
            vec![ValidationError::MissingOperation]
        );
        assert!(HasOperationValidator
            .validate(&Constellation::new().with_operation(Operation::Update))
            .is_ok());
    }
}
