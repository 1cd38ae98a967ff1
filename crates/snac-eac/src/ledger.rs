//! Unknown-construct ledger
//!
//! Side channel filled by the walker with every element and attribute it did
//! not map to a graph field. Entries are kept in visit order with no
//! deduplication. The serializer never reads the ledger; it exists so audit
//! tooling can recover `(path, value)` pairs the typed model dropped.

use serde::{Deserialize, Serialize};
use snac_model::ElementPath;
use std::fmt::{self, Display, Formatter};

/// One unmapped element or attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Path of the element itself, or of the element carrying the attribute
    pub structural_path: ElementPath,
    pub is_attribute: bool,
    pub name: String,
    /// Attribute value, or the element's source markup
    pub value: String,
}

impl Display for LedgerEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_attribute {
            write!(f, "{}/@{}={:?}", self.structural_path, self.name, self.value)
        } else {
            write!(f, "{}", self.structural_path)
        }
    }
}

/// Append-only collection of [`LedgerEntry`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Create empty ledger
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry
    pub fn record(
        &mut self,
        path: ElementPath,
        name: impl Into<String>,
        value: impl Into<String>,
        is_attribute: bool,
    ) {
        self.entries.push(LedgerEntry {
            structural_path: path,
            is_attribute,
            name: name.into(),
            value: value.into(),
        });
    }

    /// Take every entry, leaving the ledger empty
    pub fn drain(&mut self) -> Vec<LedgerEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Entries recorded so far
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose path ends with `tail`
    pub fn ending_with<'a>(&'a self, tail: &'a [&'a str]) -> impl Iterator<Item = &'a LedgerEntry> {
        self.entries
            .iter()
            .filter(move |e| e.structural_path.ends_with(tail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn path(s: &str) -> ElementPath {
        ElementPath::from_str(s).unwrap()
    }

    #[test]
    fn record_keeps_visit_order_and_duplicates() {
        let mut ledger = Ledger::new();
        ledger.record(path("eac-cpf/control/bogus"), "bogus", "<bogus/>", false);
        ledger.record(path("eac-cpf/control"), "lang", "en", true);
        ledger.record(path("eac-cpf/control"), "lang", "en", true);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.entries()[0].name, "bogus");
        assert_eq!(ledger.ending_with(&["control"]).count(), 2);
    }

    #[test]
    fn drain_empties() {
        let mut ledger = Ledger::new();
        ledger.record(path("a/b"), "b", "<b/>", false);
        let drained = ledger.drain();
        assert_eq!(drained.len(), 1);
        assert!(ledger.is_empty());
        assert!(ledger.drain().is_empty());
    }

    #[test]
    fn display() {
        let mut ledger = Ledger::new();
        ledger.record(path("eac-cpf/control"), "lang", "en", true);
        ledger.record(path("eac-cpf/control/bogus"), "bogus", "<bogus/>", false);
        assert_eq!(ledger.entries()[0].to_string(), "eac-cpf/control/@lang=\"en\"");
        assert_eq!(ledger.entries()[1].to_string(), "eac-cpf/control/bogus");
    }
}
