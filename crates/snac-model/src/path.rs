//! Structural paths into an EAC-CPF document
//!
//! Provides [`ElementPath`], the XPath-lite address used by the unknown-construct
//! ledger and by diagnostics. Paths are slash-joined local element names, e.g.
//! `eac-cpf/control/maintenanceAgency`. The rendering is meant for humans
//! reading diagnostics, not a stable interchange format.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path from the document root down to an element
///
/// # Examples
/// - `["eac-cpf", "control", "recordId"]` → `eac-cpf/control/recordId`
/// - `["eac-cpf", "cpfDescription", "identity", "nameEntry"]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementPath(Vec<String>);

impl ElementPath {
    /// Separator used by [`Display`] and [`FromStr`]
    pub const SEPARATOR: char = '/';

    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create path from a single segment
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Empty path (above the document element)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get last segment (the addressed element's own name)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Check whether the path ends with the given segments
    #[must_use]
    pub fn ends_with(&self, tail: &[&str]) -> bool {
        if tail.len() > self.0.len() {
            return false;
        }
        self.0[self.0.len() - tail.len()..]
            .iter()
            .zip(tail)
            .all(|(a, b)| a == b)
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for ElementPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for ElementPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = s
            .split(Self::SEPARATOR)
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if !is_xml_name(seg) {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

/// Loose XML `Name` check: letters, digits, `-`, `_`, `.`, `:`; not starting with a digit
fn is_xml_name(seg: &str) -> bool {
    let mut chars = seg.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

impl From<Vec<String>> for ElementPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for ElementPath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| (*s).to_string()).collect())
    }
}

impl Default for ElementPath {
    fn default() -> Self {
        Self::root()
    }
}

/// Errors related to element paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Segment is not an XML name
    #[error("invalid segment: {0} (must be an XML name)")]
    InvalidSegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_child_and_parent() {
        let control = ElementPath::single("eac-cpf").child("control");
        assert_eq!(control.segments(), &["eac-cpf", "control"]);
        assert_eq!(control.parent().unwrap(), ElementPath::single("eac-cpf"));
        assert!(ElementPath::root().parent().is_none());
    }

    #[test]
    fn path_display_is_slash_joined() {
        let path = ElementPath::from(&["eac-cpf", "control", "recordId"][..]);
        assert_eq!(path.to_string(), "eac-cpf/control/recordId");
        assert_eq!(ElementPath::root().to_string(), "");
    }

    #[test]
    fn path_from_str_accepts_xml_names() {
        let path: ElementPath = "eac-cpf/cpfDescription/snac:extra".parse().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some("snac:extra"));
    }

    #[test]
    fn path_from_str_rejects_bad_segments() {
        assert!(matches!(
            "a//b".parse::<ElementPath>(),
            Err(PathError::EmptySegment)
        ));
        assert!(matches!(
            "a/1b".parse::<ElementPath>(),
            Err(PathError::InvalidSegment(_))
        ));
    }

    #[test]
    fn path_ends_with() {
        let path: ElementPath = "eac-cpf/control/bogus".parse().unwrap();
        assert!(path.ends_with(&["bogus"]));
        assert!(path.ends_with(&["control", "bogus"]));
        assert!(!path.ends_with(&["recordId"]));
        assert!(!path.ends_with(&["x", "eac-cpf", "control", "bogus"]));
    }
}
