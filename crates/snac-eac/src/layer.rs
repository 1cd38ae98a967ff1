//! EAC-CPF pipeline - main entry point
//!
//! Provides the boundary for:
//! - File / bytes → Constellation parsing (ingress)
//! - Pre-commit validation
//! - Constellation → File serialization (egress)
//! - Validated writes to the storage collaborator

use crate::config::PipelineConfig;
use crate::error::{ParseError, PipelineResult, SerializeError};
use crate::ledger::Ledger;
use crate::parser::EacParser;
use crate::serializer::EacSerializer;
use snac_model::{
    Constellation, ConstellationStore, DiagnosticsSink, LocalVocabulary, SharedSink,
    SourceDigest, Stage, TracingSink, VocabularyLookup, WriteReceipt,
};
use snac_validation::{ValidationEngine, ValidationFailure};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Result of parsing a file
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The parsed graph
    pub constellation: Constellation,
    /// Constructs the walker did not map
    pub ledger: Ledger,
    /// Source file metadata
    pub metadata: SourceMetadata,
}

/// Source file metadata
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    /// File path
    pub path: PathBuf,
    /// Last modified time
    pub modified: SystemTime,
    /// Size in bytes
    pub size: usize,
    /// Content checksum
    pub checksum: SourceDigest,
}

/// Parse → validate → serialize → commit
///
/// The only component touching the filesystem or the store. Parsing and
/// serialization themselves are pure; this layer adds the size limit,
/// checksums and the validate-before-write rule.
#[derive(Clone)]
pub struct EacPipeline {
    config: PipelineConfig,
    parser: EacParser,
    serializer: EacSerializer,
    validation: Arc<ValidationEngine>,
    sink: SharedSink,
}

impl EacPipeline {
    /// Create pipeline resolving terms locally and logging through `tracing`
    #[inline]
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_collaborators(config, Arc::new(LocalVocabulary::new()), TracingSink::shared())
    }

    /// Create pipeline with injected collaborators
    #[must_use]
    pub fn with_collaborators(
        config: PipelineConfig,
        vocabulary: Arc<dyn VocabularyLookup>,
        sink: SharedSink,
    ) -> Self {
        Self {
            parser: EacParser::new(vocabulary, Arc::clone(&sink)).with_max_depth(config.max_depth),
            serializer: EacSerializer::new(&config, Arc::clone(&sink)),
            validation: Arc::new(ValidationEngine::from_kinds(
                &config.validators,
                Arc::clone(&sink),
            )),
            sink,
            config,
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn check_size(&self, size: usize) -> Result<(), ParseError> {
        if size > self.config.max_document_bytes {
            return Err(ParseError::TooLarge {
                size,
                max: self.config.max_document_bytes,
            });
        }
        Ok(())
    }

    /// Parse in-memory bytes
    ///
    /// # Errors
    /// - `ParseError::TooLarge` if `bytes` exceeds the configured limit
    /// - `ParseError::MalformedMarkup` if the markup is not well-formed
    /// - `ParseError::TooDeep` if nesting exceeds the configured limit
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<(Constellation, Ledger), ParseError> {
        self.check_size(bytes.len())?;
        self.parser.parse(bytes)
    }

    /// Parse file into a graph (Ingress)
    ///
    /// # Errors
    /// - `ParseError::Io` if file read fails
    /// - `ParseError::TooLarge` if the file exceeds the configured limit
    /// - `ParseError::MalformedMarkup` if the markup is not well-formed
    pub async fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParseOutcome, ParseError> {
        let path = path.as_ref();

        // Check file size before reading
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| ParseError::io_error(path, e))?;
        self.check_size(usize::try_from(meta.len()).unwrap_or(usize::MAX))?;

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| ParseError::io_error(path, e))?;
        let checksum = SourceDigest::compute(&content);
        tracing::debug!("Parsing {} ({})", path.display(), checksum.short());

        let (constellation, ledger) = self.parse_bytes(&content)?;
        if !ledger.is_empty() {
            self.sink.info(
                Stage::Parse,
                &format!("{}: {} unmapped construct(s)", path.display(), ledger.len()),
            );
        }

        Ok(ParseOutcome {
            constellation,
            ledger,
            metadata: SourceMetadata {
                path: path.to_path_buf(),
                modified: meta.modified().unwrap_or_else(|_| SystemTime::now()),
                size: content.len(),
                checksum,
            },
        })
    }

    /// Run the configured validators
    ///
    /// # Errors
    /// `ValidationFailure` carrying every violation found
    pub fn validate(&self, graph: &Constellation) -> Result<(), ValidationFailure> {
        self.validation.validate_graph(Some(graph))
    }

    /// Serialize to bytes
    ///
    /// # Errors
    /// See [`EacSerializer::serialize`]
    pub fn serialize(&self, graph: &Constellation) -> Result<Vec<u8>, SerializeError> {
        self.serializer.serialize(graph)
    }

    /// Serialize graph to file (Egress)
    ///
    /// # Errors
    /// - `SerializeError::MissingTemplate` / `SerializeError::Write` from emission
    /// - `SerializeError::Io` if file write fails
    pub async fn serialize_file(
        &self,
        graph: &Constellation,
        path: impl AsRef<Path>,
    ) -> Result<SourceDigest, SerializeError> {
        let path = path.as_ref();
        let bytes = self.serialize(graph)?;
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| SerializeError::io_error(path, e))?;
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(SourceDigest::compute(&bytes))
    }

    /// Validate, then hand the graph to storage
    ///
    /// Nothing is written unless validation passes. Storage errors,
    /// `StoreError::Conflict` included, are returned unchanged.
    ///
    /// # Errors
    /// - `PipelineError::Validation` on any validation failure
    /// - `PipelineError::Store` from the storage collaborator
    pub async fn commit(
        &self,
        store: &dyn ConstellationStore,
        graph: &Constellation,
        editor: &str,
        change_note: &str,
    ) -> PipelineResult<WriteReceipt> {
        self.validate(graph)?;
        let receipt = store.write(graph, editor, change_note).await?;
        self.sink.info(
            Stage::Store,
            &format!("committed version {} for {editor}", receipt.version),
        );
        Ok(receipt)
    }
}

impl Default for EacPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl fmt::Debug for EacPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EacPipeline")
            .field("config", &self.config)
            .field("validators", &self.validation.names())
            .finish_non_exhaustive()
    }
}
