//! Resource-reference validation
//!
//! Every resource relation must reference a resource. Unless the resource is
//! being inserted alongside the relation, it must already be stored and so
//! carry both id and version. An empty placeholder is never acceptable.

use crate::error::{ValidationError, ValidationResult};
use crate::validator::ConstellationValidator;
use snac_model::{Constellation, Operation};

/// Checks resource relations point at real resources
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceRelationValidator;

impl ResourceRelationValidator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ConstellationValidator for ResourceRelationValidator {
    fn name(&self) -> &'static str {
        "resource_reference"
    }

    fn validate(&self, graph: &Constellation) -> ValidationResult {
        let mut errors = Vec::new();
        for (i, relation) in graph.resource_relations.iter().enumerate() {
            let path = format!("constellation/resourceRelation[{i}]");
            let Some(resource) = &relation.resource else {
                errors.push(ValidationError::MissingResource { path });
                continue;
            };
            if resource.is_placeholder() {
                errors.push(ValidationError::EmptyResource { path });
            } else if resource.meta.operation != Operation::Insert
                && (resource.meta.id.is_none() || resource.meta.version.is_none())
            {
                errors.push(ValidationError::UnidentifiedResource { path });
            }
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
    use snac_model::{NodeMeta, Resource, ResourceRelation};

    fn with_resource(resource: Option<Resource>) -> Constellation {
        let mut c = Constellation::new();
        c.resource_relations.push(ResourceRelation {
            resource,
            ..ResourceRelation::default()
        });
        c
    }

    #[test]
    fn empty_resource_fails() {
        let errors = ResourceRelationValidator
            .validate(&with_resource(Some(Resource::default())))
            .unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::EmptyResource {
                path: "constellation/resourceRelation[0]".into()
            }]
        );
    }

    #[test]
    fn stored_resource_passes() {
        let resource = Resource {
            meta: NodeMeta::stored(1, 2),
            ..Resource::default()
        };
        assert!(ResourceRelationValidator
            .validate(&with_resource(Some(resource)))
            .is_ok());
    }

    #[test]
    fn missing_resource_fails() {
        let errors = ResourceRelationValidator
            .validate(&with_resource(None))
            .unwrap_err();
        assert!(matches!(errors[0], ValidationError::MissingResource { .. }));
    }

    #[test]
    fn inserted_resource_needs_no_identity() {
        let resource = Resource {
            meta: NodeMeta::with_operation(Operation::Insert),
            title: Some("Papers, 1900-1950".into()),
            ..Resource::default()
        };
        assert!(ResourceRelationValidator
            .validate(&with_resource(Some(resource)))
            .is_ok());
    }

    #[test]
    fn existing_resource_without_version_fails() {
        let resource = Resource {
            meta: NodeMeta {
                id: Some(4),
                ..NodeMeta::default()
            },
            link: Some("http://example.org/findingaid".into()),
            ..Resource::default()
        };
        let errors = ResourceRelationValidator
            .validate(&with_resource(Some(resource)))
            .unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::UnidentifiedResource { .. }
        ));
    }
}
