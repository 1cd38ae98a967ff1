//! Error types for the EAC-CPF layer
//!
//! Provides error handling for:
//! - Parse operations (bytes → Constellation)
//! - Serialize operations (Constellation → bytes)
//! - Configuration loading
//! - The pipeline façade that strings them together

use crate::templates::FieldPath;
use snac_model::StoreError;
use snac_validation::ValidationFailure;
use std::path::PathBuf;

/// Errors during ingestion
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Input is not well-formed XML; no partial graph is returned
    #[error("malformed markup: {0}")]
    MalformedMarkup(String),

    /// Input exceeds the configured size limit
    #[error("document too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },

    /// Element nesting exceeds the configured depth limit
    #[error("document nested too deeply: more than {max} levels")]
    TooDeep { max: usize },

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Create malformed markup error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMarkup(message.into())
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors during emission
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// A populated field has no element mapping; the template table has
    /// drifted from the graph model
    #[error("no template for field '{0}'")]
    MissingTemplate(FieldPath),

    /// A raw fragment field does not hold the single element it is
    /// written as
    #[error("invalid fragment for field '{field}': {reason}")]
    InvalidFragment { field: FieldPath, reason: String },

    /// XML writer failed
    #[error("write failed: {0}")]
    Write(String),

    /// IO error during file write
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SerializeError {
    /// Create writer error
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors loading pipeline configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML did not deserialize
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid config value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },

    /// IO error during config read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create out-of-range error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Combined pipeline error
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("serialize error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// Storage errors, `Conflict` included, are surfaced verbatim
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::malformed("unexpected end of input");
        assert_eq!(err.to_string(), "malformed markup: unexpected end of input");

        let err = ParseError::TooLarge { size: 20, max: 10 };
        assert_eq!(err.to_string(), "document too large: 20 bytes (max: 10)");

        let err = ParseError::TooDeep { max: 64 };
        assert_eq!(err.to_string(), "document nested too deeply: more than 64 levels");
    }

    #[test]
    fn serialize_error_display() {
        let err = SerializeError::MissingTemplate(FieldPath::BiogHist);
        assert_eq!(err.to_string(), "no template for field 'biogHist'");

        let err = SerializeError::InvalidFragment {
            field: FieldPath::BiogHist,
            reason: "expected a <biogHist> element".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid fragment for field 'biogHist': expected a <biogHist> element"
        );
    }

    #[test]
    fn store_conflict_passes_through() {
        let err: PipelineError = StoreError::conflict(7, 2, 3).into();
        match err {
            PipelineError::Store(inner) => assert!(inner.is_conflict()),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn error_conversions() {
        let err: PipelineError = ParseError::malformed("x").into();
        assert!(matches!(err, PipelineError::Parse(_)));
        let err: PipelineError = ConfigError::invalid("indent_width", "too wide").into();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
