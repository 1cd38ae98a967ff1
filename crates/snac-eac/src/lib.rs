//! EAC-CPF ingestion and emission
//!
//! Parses EAC-CPF XML into a [`snac_model::Constellation`], records every
//! construct it could not map in a [`Ledger`], and writes graphs back out as
//! EAC-CPF.
//!
//! # Pipeline
//!
//! - [`XmlDocument`]: namespace-erased tree with source spans
//! - [`EacParser`]: single-pass walker dispatching on [`EacElement`]
//! - [`EacSerializer`]: template-driven writer with the `sameAs` promotion
//! - [`EacPipeline`]: file ingress/egress, validation and validated commits
//!
//! # Example
//!
//! ```rust
//! let xml = br#"<eac-cpf xmlns="urn:isbn:1-931666-33-4">
//!   <control><recordId>ark:/99166/w6tb1zzb</recordId><bogus/></control>
//!   <cpfDescription><identity>
//!     <entityType>person</entityType>
//!     <nameEntry preferenceScore="99"><part>Smith, John</part></nameEntry>
//!   </identity></cpfDescription>
//! </eac-cpf>"#;
//!
//! let (graph, ledger) = snac_eac::parse(xml).unwrap();
//! assert_eq!(graph.ark.as_deref(), Some("ark:/99166/w6tb1zzb"));
//! assert_eq!(ledger.len(), 1);
//!
//! let out = snac_eac::serialize(&graph).unwrap();
//! let (again, _) = snac_eac::parse(&out).unwrap();
//! assert_eq!(again.name_entries[0].original, "Smith, John");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod element;
pub mod entities;
pub mod error;
pub mod layer;
pub mod ledger;
pub mod parser;
pub mod same_as;
pub mod serializer;
pub mod templates;
pub mod tree;

pub use config::PipelineConfig;
pub use element::EacElement;
pub use error::{ConfigError, ParseError, PipelineError, PipelineResult, SerializeError};
pub use layer::{EacPipeline, ParseOutcome, SourceMetadata};
pub use ledger::{Ledger, LedgerEntry};
pub use parser::EacParser;
pub use serializer::{biog_hist_markup, EacSerializer};
pub use templates::{ElementTemplate, FieldPath, TemplateTable};
pub use tree::{XmlDocument, XmlElement, XmlNode};

use snac_model::Constellation;

/// Parse EAC-CPF bytes with local term resolution
///
/// # Errors
/// `ParseError::MalformedMarkup` if the bytes are not well-formed XML
pub fn parse(bytes: &[u8]) -> Result<(Constellation, Ledger), ParseError> {
    EacParser::with_defaults().parse(bytes)
}

/// Serialize with the default configuration
///
/// # Errors
/// See [`EacSerializer::serialize`]
pub fn serialize(graph: &Constellation) -> Result<Vec<u8>, SerializeError> {
    EacSerializer::default().serialize(graph)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
