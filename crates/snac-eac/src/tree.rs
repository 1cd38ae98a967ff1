//! Namespace-erased document tree
//!
//! EAC-CPF mixes a base namespace with extension prefixes (`snac:`, `xlink:`)
//! that reuse local names. The document is flattened once, up front, into a
//! tree keyed by local name only; the walker then traverses that tree a
//! single time. Namespace declarations are collected into
//! [`XmlDocument::namespaces`] and never appear as attributes.
//!
//! Every element keeps the byte span of its source markup so opaque subtrees
//! (`biogHist`, `objectXMLWrap`, unrecognized elements) can be captured
//! verbatim.

use crate::entities;
use crate::error::ParseError;
use crate::serializer::{EAC_NS, SNAC_NS, XLINK_NS};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;

/// Default limit on element nesting
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Element or character data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// One element with namespace prefixes stripped
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Local name
    pub name: String,
    /// Local attribute names with decoded values, in document order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Byte range of the whole element in the source text
    pub span: Range<usize>,
    /// Byte range between the start and end tags
    pub inner: Range<usize>,
}

impl XmlElement {
    /// Attribute value by local name
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct character data, trimmed
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let XmlNode::Text(t) = node {
                out.push_str(t);
            }
        }
        out.trim().to_string()
    }

    /// Character data of the whole subtree with whitespace collapsed
    #[must_use]
    pub fn deep_text(&self) -> String {
        fn collect(el: &XmlElement, out: &mut String) {
            for node in &el.children {
                match node {
                    XmlNode::Text(t) => {
                        out.push(' ');
                        out.push_str(t);
                    }
                    XmlNode::Element(child) => collect(child, out),
                }
            }
        }
        let mut raw = String::new();
        collect(self, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Parsed document
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub root: XmlElement,
    /// Declared prefixes (`""` for the default namespace) → namespace URI;
    /// the first declaration of a prefix wins
    pub namespaces: BTreeMap<String, String>,
    source: String,
}

impl XmlDocument {
    /// Flatten `bytes` into a namespace-erased tree, nesting at most
    /// [`DEFAULT_MAX_DEPTH`] levels
    ///
    /// # Errors
    /// See [`Self::parse_with_depth`]
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        Self::parse_with_depth(bytes, DEFAULT_MAX_DEPTH)
    }

    /// Flatten `bytes` into a namespace-erased tree
    ///
    /// Everything downstream of the tree (text collection, date sets,
    /// dropping) recurses per level, so depth is capped here.
    ///
    /// # Errors
    /// - `ParseError::MalformedMarkup` for non-UTF-8 input, unbalanced or
    ///   mismatched tags, a missing or repeated root, duplicate attributes and
    ///   unresolvable entity references
    /// - `ParseError::TooDeep` if an element sits more than `max_depth` levels down
    pub fn parse_with_depth(bytes: &[u8], max_depth: usize) -> Result<Self, ParseError> {
        let source = std::str::from_utf8(bytes)
            .map_err(|e| ParseError::malformed(format!("input is not UTF-8: {e}")))?;
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);

        let mut reader = Reader::from_str(source);
        let mut namespaces = BTreeMap::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                ParseError::malformed(format!("at byte {}: {e}", reader.buffer_position()))
            })?;
            let end = reader.buffer_position() as usize;
            if matches!(event, Event::Start(_) | Event::Empty(_)) && stack.len() >= max_depth {
                return Err(ParseError::TooDeep { max: max_depth });
            }
            match event {
                Event::Start(e) => {
                    let start = find_back(source, end, "<")?;
                    let mut el = element(&e, &mut namespaces)?;
                    el.span = start..end;
                    el.inner = end..end;
                    stack.push(el);
                }
                Event::Empty(e) => {
                    let start = find_back(source, end, "<")?;
                    let mut el = element(&e, &mut namespaces)?;
                    el.span = start..end;
                    el.inner = end..end;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::End(_) => {
                    let Some(mut el) = stack.pop() else {
                        return Err(ParseError::malformed("closing tag without opening tag"));
                    };
                    el.inner.end = find_back(source, end, "</")?;
                    el.span.end = end;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::Text(t) => {
                    let text = entities::decode_markup(
                        std::str::from_utf8(&t)
                            .map_err(|e| ParseError::malformed(e.to_string()))?,
                    )?;
                    push_text(&mut stack, text)?;
                }
                Event::CData(c) => {
                    let text = std::str::from_utf8(&c)
                        .map_err(|e| ParseError::malformed(e.to_string()))?
                        .to_string();
                    push_text(&mut stack, text)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ParseError::malformed(format!(
                "unexpected end of input inside <{}>",
                open.name
            )));
        }
        let root = root.ok_or_else(|| ParseError::malformed("document has no root element"))?;

        Ok(Self {
            root,
            namespaces,
            source: source.to_string(),
        })
    }

    /// Source markup of `el`, byte for byte
    #[must_use]
    pub fn raw(&self, el: &XmlElement) -> &str {
        self.source.get(el.span.clone()).unwrap_or_default()
    }

    /// Source markup of `el`, rebound to the namespaces written on output
    ///
    /// Emission declares EAC-CPF as the default namespace plus the `xlink`
    /// and `snac` prefixes. Prefixes bound to EAC-CPF are dropped from the
    /// fragment's tags; any other prefix it uses without declaring is
    /// declared on its root tag. Markup that needs neither comes back
    /// byte for byte.
    #[must_use]
    pub fn fragment(&self, el: &XmlElement) -> Cow<'_, str> {
        let mut markup = Cow::Borrowed(self.raw(el));
        for prefix in self
            .namespaces
            .iter()
            .filter(|(prefix, uri)| !prefix.is_empty() && uri.as_str() == EAC_NS)
            .map(|(prefix, _)| prefix)
        {
            for (from, to) in [(format!("<{prefix}:"), "<"), (format!("</{prefix}:"), "</")] {
                if markup.contains(&from) {
                    markup = Cow::Owned(markup.replace(&from, to));
                }
            }
        }

        let declarations: String = self
            .namespaces
            .iter()
            .filter(|(prefix, uri)| undeclared(&markup, prefix, uri))
            .map(|(prefix, uri)| format!(" xmlns:{prefix}=\"{}\"", escape(uri.as_str())))
            .collect();
        if declarations.is_empty() {
            return markup;
        }
        let at = markup
            .get(1..)
            .and_then(|tag| tag.find(|c: char| c.is_whitespace() || c == '>' || c == '/'))
            .map_or(markup.len(), |i| i + 1);
        let mut owned = markup.into_owned();
        owned.insert_str(at, &declarations);
        Cow::Owned(owned)
    }

    /// Source markup inside `el`, without its own tags
    #[must_use]
    pub fn inner_raw(&self, el: &XmlElement) -> &str {
        self.source.get(el.inner.clone()).unwrap_or_default()
    }
}

/// Whether `markup` uses `prefix` without a declaration the output
/// document would supply
fn undeclared(markup: &str, prefix: &str, uri: &str) -> bool {
    let provided = match prefix {
        "" | "xml" => true,
        "xlink" => uri == XLINK_NS,
        "snac" => uri == SNAC_NS,
        _ => uri == EAC_NS,
    };
    if provided || markup.contains(&format!("xmlns:{prefix}=")) {
        return false;
    }
    let qualified = format!("{prefix}:");
    markup.match_indices(&qualified).any(|(i, _)| {
        markup[..i]
            .chars()
            .next_back()
            .is_some_and(|c| c == '<' || c == '/' || c.is_whitespace())
    })
}

/// Locate the `<` (or `</`) opening the tag that ends at `end`
///
/// Well-formed attribute values never contain a literal `<`.
fn find_back(source: &str, end: usize, open: &str) -> Result<usize, ParseError> {
    source
        .get(..end)
        .and_then(|s| s.rfind(open))
        .ok_or_else(|| ParseError::malformed("cannot locate start of tag"))
}

fn element(
    e: &BytesStart<'_>,
    namespaces: &mut BTreeMap<String, String>,
) -> Result<XmlElement, ParseError> {
    let name = utf8(e.local_name().as_ref())?;
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::malformed(e.to_string()))?;
        let key = attr.key.as_ref();
        let value = entities::decode_markup(&utf8(&attr.value)?)?;
        if key == b"xmlns" {
            namespaces.entry(String::new()).or_insert(value);
        } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            namespaces.entry(utf8(prefix)?).or_insert(value);
        } else {
            attributes.push((utf8(attr.key.local_name().as_ref())?, value));
        }
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        span: 0..0,
        inner: 0..0,
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    el: XmlElement,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(el));
            Ok(())
        }
        None if root.is_some() => Err(ParseError::malformed(format!(
            "second root element <{}>",
            el.name
        ))),
        None => {
            *root = Some(el);
            Ok(())
        }
    }
}

fn push_text(stack: &mut [XmlElement], text: String) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Text(text));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::malformed("character data outside the root element")),
    }
}

fn utf8(bytes: &[u8]) -> Result<String, ParseError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| ParseError::malformed(e.to_string()))
}
