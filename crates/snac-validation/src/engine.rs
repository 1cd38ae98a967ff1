//! Validation engine
//!
//! Runs a configurable list of validators over one graph and merges their
//! errors. The engine never mutates the graph.

use crate::error::{ValidationError, ValidationFailure};
use crate::validator::{ConstellationValidator, ValidatorKind};
use snac_model::{Constellation, Diagnostic, Level, SharedSink, Stage, TracingSink};
use std::fmt;

/// Ordered collection of validators
pub struct ValidationEngine {
    validators: Vec<Box<dyn ConstellationValidator>>,
    sink: SharedSink,
}

impl ValidationEngine {
    /// Engine with no validators
    #[must_use]
    pub fn new(sink: SharedSink) -> Self {
        Self {
            validators: Vec::new(),
            sink,
        }
    }

    /// Engine running [`ValidatorKind::DEFAULTS`], logging through `tracing`
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::from_kinds(&ValidatorKind::DEFAULTS, TracingSink::shared())
    }

    /// Engine running the given kinds in order
    #[must_use]
    pub fn from_kinds(kinds: &[ValidatorKind], sink: SharedSink) -> Self {
        let mut engine = Self::new(sink);
        for kind in kinds {
            engine.push(kind.build());
        }
        engine
    }

    /// Append a validator
    pub fn push(&mut self, validator: Box<dyn ConstellationValidator>) {
        self.validators.push(validator);
    }

    /// Names of the configured validators, in run order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Run every validator and return the merged error list
    ///
    /// An empty list means the graph is valid.
    #[must_use]
    pub fn validate(&self, graph: &Constellation) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for validator in &self.validators {
            if let Err(found) = validator.validate(graph) {
                for err in &found {
                    let diagnostic = Diagnostic::new(Stage::Validate, Level::Warn, err.to_string());
                    self.sink.emit(match err.path() {
                        Some(path) => diagnostic.at(path),
                        None => diagnostic,
                    });
                }
                errors.extend(found);
            }
        }
        self.sink.debug(
            Stage::Validate,
            &format!(
                "{} validator(s) ran, {} error(s)",
                self.validators.len(),
                errors.len()
            ),
        );
        errors
    }

    /// Validate an optional graph
    ///
    /// A missing graph is a precondition failure, raised before any
    /// validator runs.
    pub fn validate_graph(&self, graph: Option<&Constellation>) -> Result<(), ValidationFailure> {
        let Some(graph) = graph else {
            return Err(ValidationFailure::Precondition(
                "no constellation to validate".into(),
            ));
        };
        tracing::debug!("Validating constellation with {} validator(s)", self.validators.len());
        let errors = self.validate(graph);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::Invalid(errors))
        }
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("validators", &self.names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snac_model::{CollectingSink, NameEntry, NodeMeta, Operation, Resource, ResourceRelation};
    use std::sync::Arc;

    #[test]
    fn defaults_in_order() {
        assert_eq!(
            ValidationEngine::with_defaults().names(),
            vec!["operation", "identifier", "resource_reference"]
        );
    }

    #[test]
    fn merges_errors_from_every_validator() {
        let sink = Arc::new(CollectingSink::new());
        let engine = ValidationEngine::from_kinds(&ValidatorKind::DEFAULTS, sink.clone());

        let mut c = Constellation::new().with_operation(Operation::Insert);
        let mut entry = NameEntry::new("x", None);
        entry.meta.operation = Operation::Delete;
        c.name_entries.push(entry);
        c.resource_relations.push(ResourceRelation {
            meta: NodeMeta::with_operation(Operation::Insert),
            resource: Some(Resource::default()),
            ..ResourceRelation::default()
        });

        let errors = engine.validate(&c);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::OperationConflict { .. }));
        assert!(matches!(errors[1], ValidationError::EmptyResource { .. }));

        let warnings: Vec<_> = sink
            .for_stage(Stage::Validate)
            .into_iter()
            .filter(|d| d.level == Level::Warn)
            .collect();
        assert_eq!(warnings.len(), 2);
        assert_eq!(
            warnings[0].path.as_deref(),
            Some("constellation/nameEntry[0]")
        );
    }

    #[test]
    fn missing_graph_is_precondition() {
        let engine = ValidationEngine::with_defaults();
        assert!(matches!(
            engine.validate_graph(None),
            Err(ValidationFailure::Precondition(_))
        ));
        assert!(engine.validate_graph(Some(&Constellation::new())).is_ok());
    }
}
