//! Controlled-vocabulary terms
//!
//! A [`Term`] is the leaf value every graph node may reference: entity types,
//! relation arcroles, date types and so on. Terms are produced by a
//! [`VocabularyLookup`] collaborator; the walker never invents one itself.

use serde::{Deserialize, Serialize};

/// Vocabulary a term belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyType {
    EntityType,
    NameComponent,
    RecordType,
    MaintenanceStatus,
    EventType,
    AgentType,
    LanguageCode,
    ScriptCode,
    DateType,
    RelationType,
    DocumentType,
    DocumentRole,
    SourceType,
    Subject,
    Nationality,
    Gender,
    Occupation,
    Function,
    PlaceType,
    #[default]
    Unknown,
}

impl VocabularyType {
    /// Stable name used by lookup services
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EntityType => "entity_type",
            Self::NameComponent => "name_component",
            Self::RecordType => "record_type",
            Self::MaintenanceStatus => "maintenance_status",
            Self::EventType => "event_type",
            Self::AgentType => "agent_type",
            Self::LanguageCode => "language_code",
            Self::ScriptCode => "script_code",
            Self::DateType => "date_type",
            Self::RelationType => "relation_type",
            Self::DocumentType => "document_type",
            Self::DocumentRole => "document_role",
            Self::SourceType => "source_type",
            Self::Subject => "subject",
            Self::Nationality => "nationality",
            Self::Gender => "gender",
            Self::Occupation => "occupation",
            Self::Function => "function",
            Self::PlaceType => "place_type",
            Self::Unknown => "unknown",
        }
    }
}

/// One controlled-vocabulary value
///
/// Two terms are equal when both carry ids and the ids match. Otherwise the
/// structural fields decide.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Term {
    pub id: Option<i64>,
    pub uri: Option<String>,
    pub label: String,
    pub description: Option<String>,
    pub vocabulary: VocabularyType,
}

impl Term {
    /// Term with a label only
    #[must_use]
    pub fn labelled(label: impl Into<String>, vocabulary: VocabularyType) -> Self {
        Self {
            label: label.into(),
            vocabulary,
            ..Self::default()
        }
    }

    /// Attach a URI
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Attach a storage id
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Value written into an XML attribute: the URI when known, else the label
    #[must_use]
    pub fn attribute_value(&self) -> &str {
        self.uri.as_deref().unwrap_or(&self.label)
    }

    /// Label comparison used by keyword dispatch (`sameAs`, `Gender`, ...)
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.label == label
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => {
                self.uri == other.uri
                    && self.label == other.label
                    && self.description == other.description
                    && self.vocabulary == other.vocabulary
            }
        }
    }
}

/// Vocabulary lookup collaborator
///
/// Consumed by the walker whenever raw text has to become a controlled term,
/// and by editing logic when constructing new nodes.
pub trait VocabularyLookup: Send + Sync {
    /// Resolve a raw value (keyword or URI) into a term
    fn resolve_term(&self, value: &str, vocabulary: VocabularyType) -> Term;

    /// Resolve a term by its storage id
    fn resolve_term_by_id(&self, id: i64, vocabulary: VocabularyType) -> Option<Term>;
}

/// Lookup that needs no backing store
///
/// URI-shaped values keep the URI and take the fragment (or last path
/// segment) as label. Anything else becomes the label verbatim. No ids are
/// ever assigned, so `resolve_term_by_id` always misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalVocabulary;

impl LocalVocabulary {
    /// Create new local lookup
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl VocabularyLookup for LocalVocabulary {
    fn resolve_term(&self, value: &str, vocabulary: VocabularyType) -> Term {
        let value = value.trim();
        if is_uri(value) {
            Term::labelled(uri_label(value), vocabulary).with_uri(value)
        } else {
            Term::labelled(value, vocabulary)
        }
    }

    fn resolve_term_by_id(&self, _id: i64, _vocabulary: VocabularyType) -> Option<Term> {
        None
    }
}

/// Whether a vocabulary value is a URI rather than a keyword
#[must_use]
pub fn is_uri(value: &str) -> bool {
    value.contains("://")
}

/// Keyword carried by a vocabulary URI
///
/// `http://socialarchive.iath.virginia.edu/control/term#sameAs` → `sameAs`,
/// `http://example.org/vocab/person` → `person`.
#[must_use]
pub fn uri_label(uri: &str) -> &str {
    if let Some((_, fragment)) = uri.rsplit_once('#') {
        if !fragment.is_empty() {
            return fragment;
        }
    }
    uri.trim_end_matches('/')
        .rsplit_once('/')
        .map_or(uri, |(_, last)| last)
}
