//! Component nodes of a constellation
//!
//! Each type embeds a [`NodeMeta`] and is visited by the validators through
//! [`GraphNode`]. Narrative content (`BiogHist::text`,
//! `Resource::object_xml_wrap`) is kept as raw serialized XML and never
//! reparsed into structure.

use crate::date::SnacDate;
use crate::leaf_node;
use crate::node::{DataType, GraphNode, NodeMeta};
use crate::term::{Term, VocabularyType};
use serde::{Deserialize, Serialize};

/// A language (and optional script) used or declared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Language {
    #[serde(default)]
    pub meta: NodeMeta,
    /// Term resolved from `languageCode`
    pub language: Option<Term>,
    /// Element text, e.g. `English`
    pub language_name: Option<String>,
    /// Term resolved from `scriptCode`
    pub script: Option<Term>,
    pub script_name: Option<String>,
}

leaf_node!(Language, DataType::Language);

/// Contributor of a name entry form (`alternativeForm`, `authorizedForm`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NameContributor {
    #[serde(default)]
    pub meta: NodeMeta,
    /// Resolved from the contributor's own tag name
    pub contributor_type: Option<Term>,
    pub name: String,
}

leaf_node!(NameContributor, DataType::NameContributor);

/// A name by which the identity is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NameEntry {
    #[serde(default)]
    pub meta: NodeMeta,
    /// The `part` text as written
    pub original: String,
    /// Raw `preferenceScore`; the preferred name is a read-time projection
    pub preference_score: Option<f64>,
    pub contributors: Vec<NameContributor>,
    pub language: Option<Language>,
    pub use_dates: Vec<SnacDate>,
}

impl NameEntry {
    /// Name entry with original text and score
    #[must_use]
    pub fn new(original: impl Into<String>, preference_score: Option<f64>) -> Self {
        Self {
            original: original.into(),
            preference_score,
            ..Self::default()
        }
    }
}

impl GraphNode for NameEntry {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn data_type(&self) -> DataType {
        DataType::NameEntry
    }

    fn children(&self) -> Vec<&dyn GraphNode> {
        let mut children: Vec<&dyn GraphNode> = Vec::new();
        children.extend(self.contributors.iter().map(|c| c as &dyn GraphNode));
        if let Some(language) = &self.language {
            children.push(language);
        }
        children.extend(self.use_dates.iter().map(|d| d as &dyn GraphNode));
        children
    }
}

/// Biographical history, stored as the raw `<biogHist>` fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BiogHist {
    #[serde(default)]
    pub meta: NodeMeta,
    pub text: String,
    pub language: Option<Language>,
}

impl GraphNode for BiogHist {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn data_type(&self) -> DataType {
        DataType::BiogHist
    }

    fn children(&self) -> Vec<&dyn GraphNode> {
        self.language
            .iter()
            .map(|l| l as &dyn GraphNode)
            .collect()
    }
}

/// A source cited by the record's control section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Source {
    #[serde(default)]
    pub meta: NodeMeta,
    /// From `xlink:type`
    pub source_type: Option<Term>,
    /// From `xlink:href`
    pub uri: Option<String>,
    /// `sourceEntry` text
    pub display_name: Option<String>,
    /// `descriptiveNote` text
    pub note: Option<String>,
}

leaf_node!(Source, DataType::Source);

/// An `otherRecordId`; those typed `sameAs` assert identity with another record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SameAs {
    #[serde(default)]
    pub meta: NodeMeta,
    pub record_type: Option<Term>,
    pub uri: String,
    pub text: Option<String>,
}

leaf_node!(SameAs, DataType::SameAs);

/// Relation to another constellation (`cpfRelation`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConstellationRelation {
    #[serde(default)]
    pub meta: NodeMeta,
    /// From `xlink:href`
    pub target_ark_id: Option<String>,
    /// From `xlink:role`
    pub target_entity_type: Option<Term>,
    /// From `xlink:arcrole`
    pub relation_type: Option<Term>,
    /// From `cpfRelationType`
    pub cpf_relation_type: Option<Term>,
    /// `relationEntry` text
    pub content: Option<String>,
    /// `descriptiveNote` text
    pub note: Option<String>,
    pub dates: Vec<SnacDate>,
}

impl GraphNode for ConstellationRelation {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn data_type(&self) -> DataType {
        DataType::ConstellationRelation
    }

    fn children(&self) -> Vec<&dyn GraphNode> {
        self.dates.iter().map(|d| d as &dyn GraphNode).collect()
    }
}

/// An archival resource referenced by a resource relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Resource {
    #[serde(default)]
    pub meta: NodeMeta,
    pub title: Option<String>,
    pub link: Option<String>,
    pub document_type: Option<Term>,
    /// Raw `<objectXMLWrap>` fragment
    pub object_xml_wrap: Option<String>,
}

impl Resource {
    /// Whether the resource is an empty placeholder (no identity, no content)
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.meta.id.is_none()
            && self.meta.version.is_none()
            && self.title.is_none()
            && self.link.is_none()
            && self.document_type.is_none()
            && self.object_xml_wrap.is_none()
    }
}

leaf_node!(Resource, DataType::Resource);

/// Relation to an archival resource (`resourceRelation`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceRelation {
    #[serde(default)]
    pub meta: NodeMeta,
    /// From `xlink:arcrole` (creatorOf, referencedIn, ...)
    pub role: Option<Term>,
    pub content: Option<String>,
    pub note: Option<String>,
    pub resource: Option<Resource>,
}

impl GraphNode for ResourceRelation {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn data_type(&self) -> DataType {
        DataType::ResourceRelation
    }

    fn children(&self) -> Vec<&dyn GraphNode> {
        self.resource
            .iter()
            .map(|r| r as &dyn GraphNode)
            .collect()
    }
}

/// One `maintenanceEvent` of the maintenance history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MaintenanceEvent {
    #[serde(default)]
    pub meta: NodeMeta,
    pub event_type: Option<Term>,
    /// `eventDateTime` text
    pub event_date_time: Option<String>,
    /// `standardDateTime` attribute
    pub standard_date_time: Option<String>,
    pub agent_type: Option<Term>,
    pub agent: Option<String>,
    pub event_description: Option<String>,
}

leaf_node!(MaintenanceEvent, DataType::MaintenanceEvent);

/// A `conventionDeclaration` citation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConventionDeclaration {
    #[serde(default)]
    pub meta: NodeMeta,
    pub citation: String,
}

leaf_node!(ConventionDeclaration, DataType::ConventionDeclaration);

/// A place associated with the identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Place {
    #[serde(default)]
    pub meta: NodeMeta,
    /// `placeEntry` text
    pub original: String,
    /// `placeRole` text
    pub role: Option<Term>,
    pub note: Option<String>,
}

leaf_node!(Place, DataType::Place);

/// Single-term descriptive value (subject, nationality, gender, occupation, function)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermNode {
    #[serde(default)]
    pub meta: NodeMeta,
    pub kind: DescriptiveKind,
    pub term: Term,
}

impl TermNode {
    /// New descriptive value
    #[must_use]
    pub fn new(kind: DescriptiveKind, term: Term) -> Self {
        Self {
            meta: NodeMeta::default(),
            kind,
            term,
        }
    }
}

/// Which descriptive list a [`TermNode`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptiveKind {
    Subject,
    Nationality,
    Gender,
    Occupation,
    Function,
}

impl DescriptiveKind {
    /// Vocabulary the kind's terms are drawn from
    #[must_use]
    pub const fn vocabulary(self) -> VocabularyType {
        match self {
            Self::Subject => VocabularyType::Subject,
            Self::Nationality => VocabularyType::Nationality,
            Self::Gender => VocabularyType::Gender,
            Self::Occupation => VocabularyType::Occupation,
            Self::Function => VocabularyType::Function,
        }
    }
}

impl GraphNode for TermNode {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn data_type(&self) -> DataType {
        match self.kind {
            DescriptiveKind::Subject => DataType::Subject,
            DescriptiveKind::Nationality => DataType::Nationality,
            DescriptiveKind::Gender => DataType::Gender,
            DescriptiveKind::Occupation => DataType::Occupation,
            DescriptiveKind::Function => DataType::Function,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Operation;

    #[test]
    fn name_entry_children_in_order() {
        let mut entry = NameEntry::new("Smith, John", Some(99.0));
        entry.contributors.push(NameContributor {
            name: "VIAF".into(),
            ..NameContributor::default()
        });
        entry.language = Some(Language::default());
        entry.use_dates.push(SnacDate::single("1900"));

        let kinds: Vec<_> = entry.children().iter().map(|c| c.data_type()).collect();
        assert_eq!(
            kinds,
            vec![
                DataType::NameContributor,
                DataType::Language,
                DataType::SnacDate
            ]
        );
    }

    #[test]
    fn resource_placeholder_detection() {
        assert!(Resource::default().is_placeholder());
        let stored = Resource {
            meta: NodeMeta::stored(1, 2),
            ..Resource::default()
        };
        assert!(!stored.is_placeholder());
        let titled = Resource {
            title: Some("Papers".into()),
            ..Resource::default()
        };
        assert!(!titled.is_placeholder());
    }

    #[test]
    fn term_node_reports_its_kind() {
        let node = TermNode::new(
            DescriptiveKind::Gender,
            Term::labelled("female", VocabularyType::Gender),
        );
        assert_eq!(node.data_type(), DataType::Gender);
        assert_eq!(node.operation(), Operation::None);
    }
}
