//! Entity decoding
//!
//! Records in the wild carry HTML named entities (`&nbsp;`, `&eacute;`) that
//! plain XML does not define. Ingestion resolves them alongside the five
//! predefined XML entities. Emission has two modes:
//!
//! - typed free text is fully decoded, then escaped by the writer
//! - raw fragments keep their markup and the predefined XML entities; only
//!   the HTML named entities are replaced with literal characters

use crate::error::ParseError;
use quick_xml::escape::{
    partial_escape, resolve_html5_entity, resolve_predefined_entity, unescape_with,
};
use std::borrow::Cow;

/// Longest entity name considered when scanning a fragment
const MAX_ENTITY_NAME: usize = 32;

fn resolve(name: &str) -> Option<&'static str> {
    resolve_predefined_entity(name).or_else(|| resolve_html5_entity(name))
}

/// Decode escaped character data read from a document
///
/// # Errors
/// `ParseError::MalformedMarkup` for an unknown or unterminated reference
pub fn decode_markup(raw: &str) -> Result<String, ParseError> {
    unescape_with(raw, resolve)
        .map(Cow::into_owned)
        .map_err(|e| ParseError::malformed(e.to_string()))
}

/// Decode typed free text carrying escaped entities
///
/// Text that does not decode cleanly is returned unchanged.
#[must_use]
pub fn decode_text(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    unescape_with(text, resolve).unwrap_or(Cow::Borrowed(text))
}

/// Replace HTML named entities in a markup fragment
///
/// Predefined XML entities and character references are left alone so the
/// fragment stays well-formed.
#[must_use]
pub fn decode_fragment(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let name = tail
            .find(';')
            .filter(|&end| end <= MAX_ENTITY_NAME)
            .map(|end| &tail[..end]);
        match name {
            Some(name)
                if !name.starts_with('#') && resolve_predefined_entity(name).is_none() =>
            {
                match resolve_html5_entity(name) {
                    Some(value) => out.push_str(&partial_escape(value)),
                    None => {
                        out.push('&');
                        out.push_str(name);
                        out.push(';');
                    }
                }
                rest = &tail[name.len() + 1..];
            }
            _ => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_resolves_html_and_xml_entities() {
        assert_eq!(decode_markup("a &amp; b&nbsp;c &#65;").unwrap(), "a & b\u{a0}c A");
        assert!(decode_markup("&nosuch;").is_err());
        assert!(decode_markup("a & b").is_err());
    }

    #[test]
    fn text_decodes_or_passes_through() {
        assert_eq!(decode_text("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_text("caf&eacute;"), "café");
        assert_eq!(decode_text("AT&T"), "AT&T");
        assert!(matches!(decode_text("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn fragment_keeps_markup_and_xml_entities() {
        assert_eq!(
            decode_fragment("<p>caf&eacute; &amp; &lt;b&gt; &#233;&nbsp;</p>"),
            "<p>café &amp; &lt;b&gt; &#233;\u{a0}</p>"
        );
        assert_eq!(decode_fragment("<p>&unknown; x</p>"), "<p>&unknown; x</p>");
        assert_eq!(decode_fragment("a & b"), "a & b");
    }

    #[test]
    fn fragment_with_only_xml_entities_is_unchanged() {
        let raw = "<p>1 &lt; 2 &amp;&amp; 3 &gt; 2</p>";
        assert_eq!(decode_fragment(raw), raw);
    }
}
