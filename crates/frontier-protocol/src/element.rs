//! The tree encoding: a generic, in-memory tagged element.
//!
//! An [`Element`] is what a whole document looks like once it has been read
//! into memory: a name, an ordered attribute map, and ordered children. The
//! legacy interchange path builds records from elements (see
//! [`Document::from_element`](crate::Document::from_element)); the element
//! itself can be written as XML or, with the `json` feature, as JSON.

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, StreamReader, StreamWriter};

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// An ordered map from attribute name to string value.
///
/// Order is insertion order, so a record always writes its attributes in
/// the order its schema lists them. Names are unique: inserting an existing
/// name replaces the value in place. Lookups are linear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<(String, String)>",
    into = "Vec<(String, String)>"
)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Sets `name` to `value`, keeping the original position if the name
    /// was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Looks up an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Rejects duplicate names, so a JSON document can't smuggle in two values
/// for one attribute.
impl TryFrom<Vec<(String, String)>> for Attributes {
    type Error = String;

    fn try_from(pairs: Vec<(String, String)>) -> Result<Self, Self::Error> {
        let mut attributes = Self::new();
        for (name, value) in pairs {
            if attributes.get(&name).is_some() {
                return Err(format!("duplicate attribute `{name}`"));
            }
            attributes.0.push((name, value));
        }
        Ok(attributes)
    }
}

impl From<Attributes> for Vec<(String, String)> {
    fn from(attributes: Attributes) -> Self {
        attributes.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// A tagged element with scalar attributes and ordered child elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// The element's tag.
    pub name: String,

    /// Scalar attributes, in schema order.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    /// Child elements, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an element with no attributes and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Builder: sets an attribute.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Builder: appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Parses a whole XML document into an element tree.
    ///
    /// # Errors
    /// Any [`ProtocolError`] the stream cursor reports, plus
    /// `Malformed` if anything follows the root element.
    pub fn parse(xml: &str) -> Result<Self, ProtocolError> {
        Self::parse_bytes(xml.as_bytes())
    }

    /// Byte-slice form of [`parse`](Self::parse).
    pub fn parse_bytes(xml: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = StreamReader::from_bytes(xml);
        let element = reader.read_element()?;
        reader.finish()?;
        Ok(element)
    }

    /// Writes this element tree as an XML document.
    pub fn to_xml(&self) -> Result<String, ProtocolError> {
        let mut writer = StreamWriter::new();
        writer.write_element(self)?;
        writer.into_string()
    }
}
