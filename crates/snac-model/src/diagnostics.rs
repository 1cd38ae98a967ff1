//! Diagnostics sink
//!
//! Walker, validators and serializer report through an injected
//! [`DiagnosticsSink`] rather than a global logger, so each stage can be
//! exercised in isolation. [`TracingSink`] forwards to `tracing`;
//! [`CollectingSink`] keeps everything for inspection in tests.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Pipeline stage a diagnostic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Validate,
    Transform,
    Serialize,
    Store,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse => "parse",
            Self::Validate => "validate",
            Self::Transform => "transform",
            Self::Serialize => "serialize",
            Self::Store => "store",
        })
    }
}

/// Severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
}

/// One diagnostic record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub level: Level,
    pub message: String,
    /// Structural path the message concerns, if any
    pub path: Option<String>,
}

impl Diagnostic {
    /// Create diagnostic without a path
    #[must_use]
    pub fn new(stage: Stage, level: Level, message: impl Into<String>) -> Self {
        Self {
            stage,
            level,
            message: message.into(),
            path: None,
        }
    }

    /// Attach a path
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Receiver of diagnostics
pub trait DiagnosticsSink: Send + Sync {
    /// Accept one diagnostic
    fn emit(&self, diagnostic: Diagnostic);

    /// Debug-level convenience
    fn debug(&self, stage: Stage, message: &str) {
        self.emit(Diagnostic::new(stage, Level::Debug, message));
    }

    /// Info-level convenience
    fn info(&self, stage: Stage, message: &str) {
        self.emit(Diagnostic::new(stage, Level::Info, message));
    }

    /// Warn-level convenience
    fn warn(&self, stage: Stage, message: &str) {
        self.emit(Diagnostic::new(stage, Level::Warn, message));
    }
}

/// Shared handle passed into stage constructors
pub type SharedSink = Arc<dyn DiagnosticsSink>;

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Shared tracing sink
    #[must_use]
    pub fn shared() -> SharedSink {
        Arc::new(Self)
    }
}

impl DiagnosticsSink for TracingSink {
    fn emit(&self, d: Diagnostic) {
        let path = d.path.as_deref().unwrap_or("");
        match d.level {
            Level::Debug => tracing::debug!(stage = %d.stage, path, "{}", d.message),
            Level::Info => tracing::info!(stage = %d.stage, path, "{}", d.message),
            Level::Warn => tracing::warn!(stage = %d.stage, path, "{}", d.message),
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    inner: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create new collecting sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything collected so far
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.lock().clone()
    }

    /// Diagnostics from one stage
    #[must_use]
    pub fn for_stage(&self, stage: Stage) -> Vec<Diagnostic> {
        self.inner
            .lock()
            .iter()
            .filter(|d| d.stage == stage)
            .cloned()
            .collect()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.inner.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_keeps_order_and_filters() {
        let sink = CollectingSink::new();
        sink.info(Stage::Parse, "first");
        sink.emit(Diagnostic::new(Stage::Validate, Level::Warn, "second").at("constellation"));
        sink.debug(Stage::Parse, "third");

        let all = sink.diagnostics();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].path.as_deref(), Some("constellation"));
        assert_eq!(sink.for_stage(Stage::Parse).len(), 2);
    }

    #[test]
    fn tracing_sink_accepts_all_levels() {
        let sink = TracingSink::shared();
        sink.debug(Stage::Serialize, "d");
        sink.info(Stage::Serialize, "i");
        sink.warn(Stage::Serialize, "w");
    }
}
