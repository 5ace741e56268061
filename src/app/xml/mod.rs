//! Owned XML element tree used for API responses and dump records
//!
//! Responses from the API are small and parsed whole into an [`XmlElement`].
//! Dumps are far too large for that and go through the
//! [`StreamingDecoder`](streaming::StreamingDecoder), which yields the same
//! element type one record at a time.

use std::fmt::Write as _;
use std::str::FromStr;

use quick_xml::escape::escape;

use crate::errors::{DecodeError, DecodeResult};

pub mod streaming;

pub use streaming::{StreamingDecoder, TagFilter};

/// A fully parsed XML element and its subtree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Element tag name
    pub tag: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Concatenated character data directly inside this element
    pub text: String,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Create a leaf element holding text
    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Add an attribute, builder style
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child element, builder style
    pub fn child_element(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child element
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Parse a complete document and return its root element
    pub fn parse(bytes: &[u8]) -> DecodeResult<Self> {
        let mut decoder = StreamingDecoder::new(bytes, TagFilter::Document);
        match decoder.next() {
            Some(result) => result,
            None => Err(DecodeError::Empty),
        }
    }

    /// Text content of this element
    pub fn content(&self) -> &str {
        &self.text
    }

    /// Value of the named attribute
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child with the given tag
    pub fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// All direct children with the given tag
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// All descendants with the given tag, in document order
    pub fn descendants_named<'a>(&'a self, tag: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(tag, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, tag: &str, found: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.tag == tag {
                found.push(child);
            }
            child.collect_descendants(tag, found);
        }
    }

    /// First child with the given tag, or a missing-field error
    pub fn require(&self, tag: &str) -> DecodeResult<&XmlElement> {
        self.child(tag).ok_or_else(|| DecodeError::MissingField {
            parent: self.tag.clone(),
            field: tag.to_string(),
        })
    }

    /// Text of the first child with the given tag
    pub fn text_of(&self, tag: &str) -> DecodeResult<&str> {
        self.require(tag).map(XmlElement::content)
    }

    /// Text of the first child with the given tag, empty when absent
    pub fn text_or_empty(&self, tag: &str) -> &str {
        self.child(tag).map(XmlElement::content).unwrap_or("")
    }

    /// Parse the text of the first child with the given tag
    pub fn parse_child<T: FromStr>(&self, tag: &str) -> DecodeResult<T> {
        parse_value(tag, self.text_of(tag)?)
    }

    /// Parse the text of an optional child; empty text counts as absent
    pub fn parse_optional<T: FromStr>(&self, tag: &str) -> DecodeResult<Option<T>> {
        match self.child(tag).map(|child| child.content().trim()) {
            None | Some("") => Ok(None),
            Some(text) => parse_value(tag, text).map(Some),
        }
    }

    /// Parse the named attribute
    pub fn parse_attr<T: FromStr>(&self, name: &str) -> DecodeResult<T> {
        let value = self.attr(name).ok_or_else(|| DecodeError::MissingField {
            parent: self.tag.clone(),
            field: format!("@{name}"),
        })?;
        parse_value(name, value)
    }

    /// Number of elements in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(XmlElement::node_count)
            .sum::<usize>()
    }

    /// Serialize this subtree as compact XML
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value.as_str()));
        }
        out.push('>');
        out.push_str(&escape(self.text.as_str()));
        for child in &self.children {
            child.write_into(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Convert a field's text to a typed value
pub fn parse_value<T: FromStr>(field: &str, text: &str) -> DecodeResult<T> {
    text.trim()
        .parse()
        .map_err(|_| DecodeError::InvalidValue {
            field: field.to_string(),
            value: text.to_string(),
        })
}

/// Split a delimited list, treating empty text as an empty list
pub fn split_list(text: &str, separator: char) -> Vec<String> {
    if text.trim().is_empty() {
        Vec::new()
    } else {
        text.split(separator).map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<NATION id="testlandia"><NAME>Testlandia</NAME><POPULATION>42</POPULATION><EMPTY/></NATION>"#;

        let root = XmlElement::parse(xml).unwrap();
        assert_eq!(root.tag, "NATION");
        assert_eq!(root.attr("id"), Some("testlandia"));
        assert_eq!(root.text_of("NAME").unwrap(), "Testlandia");
        assert_eq!(root.parse_child::<u64>("POPULATION").unwrap(), 42);
        assert_eq!(root.text_of("EMPTY").unwrap(), "");
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn test_missing_and_invalid_fields() {
        let root = XmlElement::parse(b"<A><B>x</B></A>").unwrap();

        assert!(matches!(
            root.text_of("C"),
            Err(DecodeError::MissingField { ref field, .. }) if field == "C"
        ));
        assert!(matches!(
            root.parse_child::<i32>("B"),
            Err(DecodeError::InvalidValue { .. })
        ));
        assert_eq!(root.parse_optional::<i32>("C").unwrap(), None);
    }

    #[test]
    fn test_escaping_survives_serialization() {
        let element = XmlElement::new("REGION")
            .attribute("type", "a \"quoted\" <value>")
            .child_element(XmlElement::with_text("NAME", "Lazarus & <Friends>"));

        let parsed = XmlElement::parse(element.to_xml().as_bytes()).unwrap();
        assert_eq!(parsed, element);
    }

    #[test]
    fn test_descendants_named() {
        let root = XmlElement::parse(
            b"<WORLD><HAPPENINGS><EVENT id=\"2\"/><EVENT id=\"1\"/></HAPPENINGS></WORLD>",
        )
        .unwrap();

        let events = root.descendants_named("EVENT");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].parse_attr::<u64>("id").unwrap(), 2);
    }

    #[test]
    fn test_malformed_document() {
        assert!(XmlElement::parse(b"<A><B></A>").is_err());
        assert!(XmlElement::parse(b"<A><B>").is_err());
        assert!(matches!(XmlElement::parse(b""), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_split_list() {
        assert!(split_list("", ',').is_empty());
        assert_eq!(split_list("a,b", ','), vec!["a", "b"]);
    }
}
