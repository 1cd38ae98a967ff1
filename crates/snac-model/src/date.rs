//! Dates attached to constellations and relations
//!
//! A standardized date with a leading `-` is stored as `is_bc = true` plus the
//! unsigned magnitude. [`DatePoint::from_standard`] / [`DatePoint::to_standard`]
//! are the two halves of that contract and must stay exact inverses.

use crate::node::{DataType, GraphNode, NodeMeta};
use crate::term::Term;
use serde::{Deserialize, Serialize};

/// `notBefore` / `notAfter` bounds on an uncertain date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FuzzyRange {
    pub not_before: Option<String>,
    pub not_after: Option<String>,
}

impl FuzzyRange {
    /// Whether neither bound is present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.not_before.is_none() && self.not_after.is_none()
    }
}

/// One end of a date (or the whole of a single date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatePoint {
    /// Standardized magnitude, without sign
    pub date: Option<String>,
    /// Text as written in the source
    pub original: Option<String>,
    /// Birth, death, active, ...
    pub date_type: Option<Term>,
    pub is_bc: bool,
    pub fuzzy: FuzzyRange,
}

impl DatePoint {
    /// Decompose a standardized date string into magnitude and BC flag
    #[must_use]
    pub fn from_standard(standard: &str) -> (String, bool) {
        let standard = standard.trim();
        match standard.strip_prefix('-') {
            Some(magnitude) => (magnitude.to_string(), true),
            None => (standard.to_string(), false),
        }
    }

    /// Re-compose the standardized string, re-prepending `-` for BC dates
    #[must_use]
    pub fn to_standard(&self) -> Option<String> {
        self.date.as_ref().map(|d| {
            if self.is_bc {
                format!("-{d}")
            } else {
                d.clone()
            }
        })
    }

    /// Set the standardized date from a possibly negative string
    pub fn set_standard(&mut self, standard: &str) {
        let (date, is_bc) = Self::from_standard(standard);
        self.date = Some(date);
        self.is_bc = is_bc;
    }

    /// Whether nothing at all is recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.original.is_none()
            && self.date_type.is_none()
            && self.fuzzy.is_empty()
    }
}

/// A single date or a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SnacDate {
    #[serde(default)]
    pub meta: NodeMeta,
    pub from: DatePoint,
    pub to: DatePoint,
    pub is_range: bool,
    pub note: Option<String>,
}

impl SnacDate {
    /// Single date from a standardized string
    #[must_use]
    pub fn single(standard: &str) -> Self {
        let mut date = Self::default();
        date.from.set_standard(standard);
        date
    }

    /// Range between two standardized strings
    #[must_use]
    pub fn range(from: &str, to: &str) -> Self {
        let mut date = Self {
            is_range: true,
            ..Self::default()
        };
        date.from.set_standard(from);
        date.to.set_standard(to);
        date
    }
}

crate::leaf_node!(SnacDate, DataType::SnacDate);
