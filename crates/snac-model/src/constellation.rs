//! The constellation root aggregate
//!
//! A [`Constellation`] is one archival identity record: created empty by the
//! walker or by editing logic, filled field by field, then handed to the
//! validators and the serializer as immutable input.

use crate::components::{
    BiogHist, ConstellationRelation, ConventionDeclaration, Language, MaintenanceEvent,
    NameEntry, Place, ResourceRelation, SameAs, Source, TermNode,
};
use crate::date::SnacDate;
use crate::node::{DataType, GraphNode, NodeMeta, Operation};
use crate::term::Term;
use serde::{Deserialize, Serialize};

/// Root aggregate of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Constellation {
    #[serde(default)]
    pub meta: NodeMeta,
    /// `recordId`
    pub ark: Option<String>,
    pub entity_type: Option<Term>,
    pub name_entries: Vec<NameEntry>,
    pub biog_hists: Vec<BiogHist>,
    pub other_record_ids: Vec<SameAs>,
    pub relations: Vec<ConstellationRelation>,
    pub resource_relations: Vec<ResourceRelation>,
    pub maintenance_events: Vec<MaintenanceEvent>,
    pub exist_dates: Vec<SnacDate>,

    pub maintenance_status: Option<Term>,
    /// First child text of `maintenanceAgency`
    pub maintenance_agency: Option<String>,
    pub language_declaration: Option<Language>,
    pub convention_declarations: Vec<ConventionDeclaration>,
    pub sources: Vec<Source>,
    pub places: Vec<Place>,
    pub subjects: Vec<TermNode>,
    pub nationalities: Vec<TermNode>,
    pub genders: Vec<TermNode>,
    pub occupations: Vec<TermNode>,
    pub functions: Vec<TermNode>,
    pub languages_used: Vec<Language>,
}

impl Constellation {
    /// Create empty constellation
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root operation
    #[inline]
    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.meta.operation = operation;
        self
    }

    /// The preferred name entry
    ///
    /// Highest preference score wins; ties go to the first entry in document
    /// order and a missing score ranks below any present one.
    #[must_use]
    pub fn preferred_name_entry(&self) -> Option<&NameEntry> {
        let mut best: Option<&NameEntry> = None;
        for entry in &self.name_entries {
            best = match best {
                None => Some(entry),
                Some(current) if outranks(entry.preference_score, current.preference_score) => {
                    Some(entry)
                }
                keep => keep,
            };
        }
        best
    }

    /// Whether no component at all has been populated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ark.is_none() && self.entity_type.is_none() && self.children().is_empty()
    }

    /// Total number of component nodes, at every depth
    #[must_use]
    pub fn node_count(&self) -> usize {
        fn count(node: &dyn GraphNode) -> usize {
            node.children().into_iter().map(|c| 1 + count(c)).sum()
        }
        count(self)
    }
}

fn outranks(candidate: Option<f64>, current: Option<f64>) -> bool {
    match (candidate, current) {
        (Some(a), Some(b)) => a > b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn push_all<'a, T: GraphNode>(out: &mut Vec<&'a dyn GraphNode>, items: &'a [T]) {
    out.extend(items.iter().map(|i| i as &dyn GraphNode));
}

impl GraphNode for Constellation {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn data_type(&self) -> DataType {
        DataType::Constellation
    }

    fn children(&self) -> Vec<&dyn GraphNode> {
        let mut out: Vec<&dyn GraphNode> = Vec::new();
        push_all(&mut out, &self.other_record_ids);
        push_all(&mut out, &self.maintenance_events);
        if let Some(language) = &self.language_declaration {
            out.push(language);
        }
        push_all(&mut out, &self.convention_declarations);
        push_all(&mut out, &self.sources);
        push_all(&mut out, &self.name_entries);
        push_all(&mut out, &self.exist_dates);
        push_all(&mut out, &self.places);
        push_all(&mut out, &self.subjects);
        push_all(&mut out, &self.nationalities);
        push_all(&mut out, &self.genders);
        push_all(&mut out, &self.occupations);
        push_all(&mut out, &self.functions);
        push_all(&mut out, &self.languages_used);
        push_all(&mut out, &self.biog_hists);
        push_all(&mut out, &self.relations);
        push_all(&mut out, &self.resource_relations);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{NameContributor, Resource};
    use proptest::prelude::*;

    fn names(scores: &[Option<f64>]) -> Constellation {
        let mut c = Constellation::new();
        for (i, score) in scores.iter().enumerate() {
            c.name_entries
                .push(NameEntry::new(format!("name-{i}"), *score));
        }
        c
    }

    #[test]
    fn preferred_name_is_highest_score() {
        let c = names(&[Some(10.0), Some(99.0), Some(50.0)]);
        assert_eq!(c.preferred_name_entry().unwrap().original, "name-1");
    }

    #[test]
    fn preferred_name_tie_goes_to_first() {
        let c = names(&[Some(5.0), Some(99.0), Some(99.0)]);
        assert_eq!(c.preferred_name_entry().unwrap().original, "name-1");
    }

    #[test]
    fn missing_score_ranks_lowest() {
        let c = names(&[None, Some(0.0)]);
        assert_eq!(c.preferred_name_entry().unwrap().original, "name-1");
        let c = names(&[None, None]);
        assert_eq!(c.preferred_name_entry().unwrap().original, "name-0");
        assert!(Constellation::new().preferred_name_entry().is_none());
    }

    #[test]
    fn node_count_includes_nested() {
        let mut c = names(&[Some(1.0)]);
        c.name_entries[0].contributors.push(NameContributor::default());
        c.resource_relations.push(ResourceRelation {
            resource: Some(Resource::default()),
            ..ResourceRelation::default()
        });
        assert_eq!(c.node_count(), 4);
        assert!(!c.is_empty());
        assert!(Constellation::new().is_empty());
    }

    proptest! {
        #[test]
        fn preferred_is_first_maximum(scores in proptest::collection::vec(0u8..5, 1..12)) {
            let c = names(&scores.iter().map(|s| Some(f64::from(*s))).collect::<Vec<_>>());
            let max = *scores.iter().max().unwrap();
            let first = scores.iter().position(|s| *s == max).unwrap();
            prop_assert_eq!(
                &c.preferred_name_entry().unwrap().original,
                &format!("name-{first}")
            );
        }
    }
}
