//! `sameAs` promotion
//!
//! An `otherRecordId` typed `sameAs` asserts the record is the same entity as
//! another one. On emission that assertion is rewritten as a `cpfRelation`
//! so downstream consumers see it as a relation. The graph itself is never
//! touched; callers get fresh lists back.

use snac_model::{ConstellationRelation, SameAs, Term};

/// Record-type label that triggers promotion
pub const SAME_AS: &str = "sameAs";

/// Whether `id` is a `sameAs` assertion
#[must_use]
pub fn is_same_as(id: &SameAs) -> bool {
    id.record_type
        .as_ref()
        .is_some_and(|t| t.has_label(SAME_AS))
}

/// Split `sameAs` identifiers out into relations
///
/// Returns the identifiers that stay identifiers and the relation list with
/// one appended relation per promoted identifier, in input order. The target
/// of a `sameAs` is the same entity, so it inherits `entity_type`.
#[must_use]
pub fn reconcile(
    other_record_ids: &[SameAs],
    relations: &[ConstellationRelation],
    entity_type: Option<&Term>,
) -> (Vec<SameAs>, Vec<ConstellationRelation>) {
    let mut kept = Vec::with_capacity(other_record_ids.len());
    let mut relations = relations.to_vec();
    for id in other_record_ids {
        if is_same_as(id) {
            relations.push(ConstellationRelation {
                target_ark_id: Some(id.uri.clone()),
                target_entity_type: entity_type.cloned(),
                relation_type: id.record_type.clone(),
                content: id.text.clone(),
                ..ConstellationRelation::default()
            });
        } else {
            kept.push(id.clone());
        }
    }
    (kept, relations)
}
