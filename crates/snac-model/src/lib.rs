//! SNAC graph model
//!
//! Typed, versioned in-memory representation of an archival identity record.
//!
//! # Core Concepts
//!
//! - [`Term`]: controlled-vocabulary leaf value
//! - [`SnacDate`]: single date or range, with the BC sign decomposition
//! - [`GraphNode`] / [`NodeMeta`]: per-node id, version and edit [`Operation`]
//! - [`Constellation`]: the root aggregate
//! - [`ElementPath`]: XPath-lite structural path used in diagnostics
//! - [`VocabularyLookup`] / [`ConstellationStore`]: collaborators the pipeline consumes
//!
//! # Example
//!
//! ```rust
//! use snac_model::{Constellation, NameEntry, Operation};
//!
//! let mut c = Constellation::new().with_operation(Operation::Insert);
//! c.name_entries.push(NameEntry::new("Smith, John", Some(99.0)));
//! assert_eq!(c.preferred_name_entry().unwrap().original, "Smith, John");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod components;
pub mod constellation;
pub mod date;
pub mod diagnostics;
mod digest;
pub mod node;
mod path;
pub mod store;
pub mod term;

pub use components::{
    BiogHist, ConstellationRelation, ConventionDeclaration, DescriptiveKind, Language,
    MaintenanceEvent, NameContributor, NameEntry, Place, Resource, ResourceRelation, SameAs,
    Source, TermNode,
};
pub use constellation::Constellation;
pub use date::{DatePoint, FuzzyRange, SnacDate};
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticsSink, Level, SharedSink, Stage, TracingSink,
};
pub use digest::{DigestError, SourceDigest};
pub use node::{DataType, GraphNode, NodeMeta, Operation};
pub use path::{ElementPath, PathError};
pub use store::{ConstellationStore, RecordStatus, StoreError, WriteReceipt};
pub use term::{is_uri, uri_label, LocalVocabulary, Term, VocabularyLookup, VocabularyType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
