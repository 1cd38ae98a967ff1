//! Pipeline configuration
//!
//! Loaded from TOML; every field has a default so an empty document is a
//! valid configuration.
//!
//! ```toml
//! max_document_bytes = 10485760
//! max_depth = 256
//! indent_char = " "
//! indent_width = 2
//! validators = ["operation", "identifier", "resource_reference"]
//! apply_same_as = true
//! ```

use crate::error::ConfigError;
use crate::tree::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use snac_validation::ValidatorKind;
use std::path::Path;

/// Widest indentation accepted
pub const MAX_INDENT_WIDTH: usize = 16;

/// Knobs for parse, validate and serialize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Largest document accepted on ingress
    pub max_document_bytes: usize,
    /// Deepest element nesting accepted on ingress
    pub max_depth: usize,
    /// Indentation character for emitted XML
    pub indent_char: char,
    /// Indentation characters per nesting level; 0 disables pretty-printing
    pub indent_width: usize,
    /// Validators run before a commit, in order
    pub validators: Vec<ValidatorKind>,
    /// Promote `sameAs` record ids to relations on emission
    pub apply_same_as: bool,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With document size limit
    #[inline]
    #[must_use]
    pub fn with_max_document_bytes(mut self, max: usize) -> Self {
        self.max_document_bytes = max;
        self
    }

    /// With nesting limit
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    /// With indentation
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent_char: char, indent_width: usize) -> Self {
        self.indent_char = indent_char;
        self.indent_width = indent_width;
        self
    }

    /// With validator list
    #[inline]
    #[must_use]
    pub fn with_validators(mut self, validators: Vec<ValidatorKind>) -> Self {
        self.validators = validators;
        self
    }

    /// With or without the sameAs promotion
    #[inline]
    #[must_use]
    pub fn with_same_as(mut self, apply: bool) -> Self {
        self.apply_same_as = apply;
        self
    }

    /// Parse and check TOML text
    ///
    /// # Errors
    /// - `ConfigError::Toml` if the text does not deserialize
    /// - `ConfigError::Invalid` if a value is out of range
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// As [`Self::from_toml_str`], plus `ConfigError::Io` if the file cannot be read
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&text)
    }

    /// Range-check values serde cannot
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first offending field
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_document_bytes == 0 {
            return Err(ConfigError::invalid(
                "max_document_bytes",
                "must be greater than zero",
            ));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::invalid("max_depth", "must be greater than zero"));
        }
        if self.indent_width > MAX_INDENT_WIDTH {
            return Err(ConfigError::invalid(
                "indent_width",
                format!("{} exceeds {MAX_INDENT_WIDTH}", self.indent_width),
            ));
        }
        if !self.indent_char.is_ascii_whitespace() {
            return Err(ConfigError::invalid(
                "indent_char",
                format!("{:?} is not ASCII whitespace", self.indent_char),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 10 * 1024 * 1024, // 10MB
            max_depth: DEFAULT_MAX_DEPTH,
            indent_char: ' ',
            indent_width: 2,
            validators: ValidatorKind::DEFAULTS.to_vec(),
            apply_same_as: true,
        }
    }
}
