//! Per-node identity and edit intent
//!
//! Every component of a constellation embeds a [`NodeMeta`] and implements
//! [`GraphNode`], which is all the validators need to walk the graph.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Edit intent carried by a node
///
/// Set by editing logic, never by the walker: freshly parsed nodes carry
/// [`Operation::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Update,
    Delete,
    #[default]
    None,
}

impl Operation {
    /// Whether an explicit operation is present
    #[inline]
    #[must_use]
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether a child carrying `child` may sit below a node carrying `self`
    ///
    /// | parent | allowed child operations |
    /// |---|---|
    /// | `Insert` | `Insert`, `None` |
    /// | `Update` | any |
    /// | `Delete` | `Delete`, `None` |
    /// | `None`   | any |
    #[must_use]
    pub const fn permits_child(self, child: Self) -> bool {
        match self {
            Self::Insert => matches!(child, Self::Insert | Self::None),
            Self::Delete => matches!(child, Self::Delete | Self::None),
            Self::Update | Self::None => true,
        }
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::None => "none",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and edit intent shared by every node
///
/// `id` and `version` are assigned by the storage collaborator; nothing in
/// the pipeline fabricates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NodeMeta {
    pub id: Option<i64>,
    pub version: Option<i64>,
    #[serde(default)]
    pub operation: Operation,
}

impl NodeMeta {
    /// Meta carrying only an operation
    #[inline]
    #[must_use]
    pub const fn with_operation(operation: Operation) -> Self {
        Self {
            id: None,
            version: None,
            operation,
        }
    }

    /// Meta for a stored node
    #[inline]
    #[must_use]
    pub const fn stored(id: i64, version: i64) -> Self {
        Self {
            id: Some(id),
            version: Some(version),
            operation: Operation::None,
        }
    }
}

/// Kind of node, used for diagnostics paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Constellation,
    NameEntry,
    NameContributor,
    BiogHist,
    Language,
    Source,
    SameAs,
    ConstellationRelation,
    ResourceRelation,
    Resource,
    MaintenanceEvent,
    ConventionDeclaration,
    Place,
    Subject,
    Nationality,
    Gender,
    Occupation,
    Function,
    SnacDate,
}

impl DataType {
    /// Stable tag used in validator paths
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Constellation => "constellation",
            Self::NameEntry => "nameEntry",
            Self::NameContributor => "contributor",
            Self::BiogHist => "biogHist",
            Self::Language => "language",
            Self::Source => "source",
            Self::SameAs => "otherRecordId",
            Self::ConstellationRelation => "relation",
            Self::ResourceRelation => "resourceRelation",
            Self::Resource => "resource",
            Self::MaintenanceEvent => "maintenanceEvent",
            Self::ConventionDeclaration => "conventionDeclaration",
            Self::Place => "place",
            Self::Subject => "subject",
            Self::Nationality => "nationality",
            Self::Gender => "gender",
            Self::Occupation => "occupation",
            Self::Function => "function",
            Self::SnacDate => "date",
        }
    }
}

/// Contract implemented by every component type
pub trait GraphNode {
    /// Identity and operation
    fn meta(&self) -> &NodeMeta;

    /// Kind of node
    fn data_type(&self) -> DataType;

    /// Nested components, in document order
    fn children(&self) -> Vec<&dyn GraphNode> {
        Vec::new()
    }

    /// Shorthand for `meta().operation`
    fn operation(&self) -> Operation {
        self.meta().operation
    }
}

/// Implement [`GraphNode`] for a leaf type with a `meta` field
#[macro_export]
macro_rules! leaf_node {
    ($ty:ty, $kind:expr) => {
        impl $crate::node::GraphNode for $ty {
            fn meta(&self) -> &$crate::node::NodeMeta {
                &self.meta
            }

            fn data_type(&self) -> $crate::node::DataType {
                $kind
            }
        }
    };
}
