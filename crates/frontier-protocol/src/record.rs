//! The record schema and its two interpreters.
//!
//! Every message and every domain record that travels on the wire declares
//! its shape exactly once, by implementing [`Record`]:
//!
//! - a fixed tag ([`Record::TAG`]),
//! - its attributes, in order ([`Record::attributes`]),
//! - its child records, all of one declared type ([`Record::Child`]),
//! - how to rebuild itself from those parts ([`Record::from_parts`]).
//!
//! The blanket [`Document`] impl then interprets that description twice:
//! once against the element tree, once against the stream cursor. Neither
//! encoding has any per-type code, which is what keeps the two paths
//! equivalent.

use std::str::FromStr;

use crate::{Attributes, Element, ProtocolError, StreamReader, StreamWriter};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A protocol record with a fixed tag, scalar attributes, and typed children.
pub trait Record: Sized {
    /// The element name. Fixed per type and never empty (except for
    /// [`NoChildren`], which is never instantiated).
    const TAG: &'static str;

    /// The type of this record's children. Leaf records use [`NoChildren`].
    type Child: Record;

    /// The record's scalar fields as attributes, in schema order.
    fn attributes(&self) -> Attributes;

    /// The record's children, in order.
    fn children(&self) -> &[Self::Child] {
        &[]
    }

    /// Rebuilds the record from decoded parts. Called only after every
    /// child decoded successfully.
    fn from_parts(
        fields: Fields<'_>,
        children: Vec<Self::Child>,
    ) -> Result<Self, ProtocolError>;
}

/// Child type for leaf records. Uninhabited, so a leaf can never hold one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoChildren {}

impl Record for NoChildren {
    const TAG: &'static str = "";
    type Child = NoChildren;

    fn attributes(&self) -> Attributes {
        match *self {}
    }

    fn from_parts(_: Fields<'_>, _: Vec<Self>) -> Result<Self, ProtocolError> {
        Err(ProtocolError::InvalidMessage(
            "leaf records have no children".into(),
        ))
    }
}

/// What a record's child position accepts, for error messages: the child
/// tag, or the parent's own close tag for leaves.
fn expected_child<R: Record>() -> String {
    if R::Child::TAG.is_empty() {
        format!("/{}", R::TAG)
    } else {
        R::Child::TAG.to_string()
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Anything that can be encoded as a whole document, through either the
/// tree path or the stream path.
///
/// Implemented for every [`Record`] by the interpreters below, and for
/// [`AnyMessage`](crate::AnyMessage), which picks the concrete type by tag.
pub trait Document: Sized {
    /// Tree path, encode.
    fn to_element(&self) -> Element;

    /// Tree path, decode.
    fn from_element(element: &Element) -> Result<Self, ProtocolError>;

    /// Stream path, encode.
    fn write(&self, out: &mut StreamWriter) -> Result<(), ProtocolError>;

    /// Stream path, decode. Consumes the record's opening tag through its
    /// closing tag, and nothing more.
    fn read(input: &mut StreamReader<'_>) -> Result<Self, ProtocolError>;

    /// Encodes this document as an XML string (stream path).
    fn to_xml(&self) -> Result<String, ProtocolError> {
        let mut out = StreamWriter::new();
        self.write(&mut out)?;
        out.into_string()
    }

    /// Decodes a whole XML document (stream path).
    fn from_xml(xml: &str) -> Result<Self, ProtocolError> {
        let mut input = StreamReader::new(xml);
        let value = Self::read(&mut input)?;
        input.finish()?;
        Ok(value)
    }
}

impl<R: Record> Document for R {
    fn to_element(&self) -> Element {
        Element {
            name: Self::TAG.to_string(),
            attributes: self.attributes(),
            children: self.children().iter().map(Document::to_element).collect(),
        }
    }

    fn from_element(element: &Element) -> Result<Self, ProtocolError> {
        if element.name != Self::TAG {
            return Err(ProtocolError::UnexpectedTag {
                expected: Self::TAG.to_string(),
                actual: element.name.clone(),
            });
        }
        let mut children = Vec::with_capacity(element.children.len());
        for child in &element.children {
            if child.name != R::Child::TAG {
                return Err(ProtocolError::UnexpectedTag {
                    expected: expected_child::<R>(),
                    actual: child.name.clone(),
                });
            }
            children.push(R::Child::from_element(child)?);
        }
        R::from_parts(Fields::new(Self::TAG, &element.attributes), children)
    }

    fn write(&self, out: &mut StreamWriter) -> Result<(), ProtocolError> {
        let children = self.children();
        out.open(Self::TAG, &self.attributes(), children.is_empty())?;
        if !children.is_empty() {
            for child in children {
                child.write(out)?;
            }
            out.close(Self::TAG)?;
        }
        Ok(())
    }

    fn read(input: &mut StreamReader<'_>) -> Result<Self, ProtocolError> {
        let attributes = input.open(Self::TAG)?;
        let mut children = Vec::new();
        while input.more_tags()? {
            match input.peek_tag()? {
                Some(tag) if tag == R::Child::TAG => {}
                Some(tag) => {
                    return Err(ProtocolError::UnexpectedTag {
                        expected: expected_child::<R>(),
                        actual: tag.to_string(),
                    });
                }
                None => return Err(ProtocolError::UnexpectedEof),
            }
            children.push(R::Child::read(input)?);
        }
        input.close(Self::TAG)?;
        R::from_parts(Fields::new(Self::TAG, &attributes), children)
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Typed access to a decoded record's attributes.
///
/// Absent attributes fall back to the type's default unless read through
/// one of the `required_*` methods. A present attribute that fails to parse
/// is always an error.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    tag: &'static str,
    attributes: &'a Attributes,
}

impl<'a> Fields<'a> {
    /// Wraps the attributes decoded for `tag`.
    pub fn new(tag: &'static str, attributes: &'a Attributes) -> Self {
        Self { tag, attributes }
    }

    /// A string attribute; absent → empty string.
    pub fn string(&self, name: &str) -> String {
        self.attributes.get(name).unwrap_or_default().to_string()
    }

    /// A string attribute that must be present.
    pub fn required_string(&self, name: &str) -> Result<String, ProtocolError> {
        self.attributes
            .get(name)
            .map(str::to_string)
            .ok_or_else(|| self.missing(name))
    }

    /// A parsed attribute; absent → `None`.
    pub fn optional<T: FromStr>(&self, name: &str) -> Result<Option<T>, ProtocolError> {
        match self.attributes.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ProtocolError::MalformedAttribute {
                    tag: self.tag.to_string(),
                    attribute: name.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    /// A parsed attribute; absent → `T::default()`.
    pub fn number<T: FromStr + Default>(&self, name: &str) -> Result<T, ProtocolError> {
        Ok(self.optional(name)?.unwrap_or_default())
    }

    /// A parsed attribute that must be present.
    pub fn required<T: FromStr>(&self, name: &str) -> Result<T, ProtocolError> {
        self.optional(name)?.ok_or_else(|| self.missing(name))
    }

    /// A boolean attribute (`true`/`false`); absent → `false`.
    pub fn flag(&self, name: &str) -> Result<bool, ProtocolError> {
        self.number(name)
    }

    fn missing(&self, name: &str) -> ProtocolError {
        ProtocolError::MissingAttribute {
            tag: self.tag.to_string(),
            attribute: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Interpreter tests against two tiny hand-written records, so these
    //! stay independent of the real message types.

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Leaf {
        name: String,
        weight: u32,
    }

    impl Record for Leaf {
        const TAG: &'static str = "leaf";
        type Child = NoChildren;

        fn attributes(&self) -> Attributes {
            Attributes::new()
                .with("name", self.name.as_str())
                .with("weight", self.weight.to_string())
        }

        fn from_parts(fields: Fields<'_>, _: Vec<NoChildren>) -> Result<Self, ProtocolError> {
            Ok(Self {
                name: fields.required_string("name")?,
                weight: fields.number("weight")?,
            })
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Branch {
        label: String,
        leaves: Vec<Leaf>,
    }

    impl Record for Branch {
        const TAG: &'static str = "branch";
        type Child = Leaf;

        fn attributes(&self) -> Attributes {
            Attributes::new().with("label", self.label.as_str())
        }

        fn children(&self) -> &[Leaf] {
            &self.leaves
        }

        fn from_parts(fields: Fields<'_>, leaves: Vec<Leaf>) -> Result<Self, ProtocolError> {
            Ok(Self {
                label: fields.string("label"),
                leaves,
            })
        }
    }

    fn leaf(name: &str, weight: u32) -> Leaf {
        Leaf {
            name: name.into(),
            weight,
        }
    }

    fn sample() -> Branch {
        Branch {
            label: "oak".into(),
            leaves: vec![leaf("c", 3), leaf("a", 1), leaf("b", 2)],
        }
    }

    // =====================================================================
    // Encoding shape
    // =====================================================================

    #[test]
    fn test_to_element_uses_tag_attributes_and_children() {
        let element = sample().to_element();

        assert_eq!(element.name, "branch");
        assert_eq!(element.attribute("label"), Some("oak"));
        assert_eq!(element.children.len(), 3);
        assert!(element.children.iter().all(|c| c.name == "leaf"));
    }

    #[test]
    fn test_to_xml_leaf_is_self_closing() {
        assert_eq!(
            leaf("a", 1).to_xml().unwrap(),
            r#"<leaf name="a" weight="1"/>"#
        );
    }

    // =====================================================================
    // Both paths agree
    // =====================================================================

    #[test]
    fn test_stream_and_tree_paths_decode_the_same_value() {
        let xml = sample().to_xml().unwrap();

        let via_stream = Branch::from_xml(&xml).unwrap();
        let via_tree = Branch::from_element(&Element::parse(&xml).unwrap()).unwrap();

        assert_eq!(via_stream, sample());
        assert_eq!(via_tree, via_stream);
    }

    #[test]
    fn test_stream_write_matches_element_to_xml() {
        let record = sample();
        assert_eq!(
            record.to_xml().unwrap(),
            record.to_element().to_xml().unwrap()
        );
    }

    // =====================================================================
    // Failures
    // =====================================================================

    #[test]
    fn test_read_unexpected_child_cites_both_tags() {
        let xml = r#"<branch label="x"><leaf name="a"/><twig/></branch>"#;

        let err = Branch::from_xml(xml).unwrap_err();

        match err {
            ProtocolError::UnexpectedTag { expected, actual } => {
                assert_eq!(expected, "leaf");
                assert_eq!(actual, "twig");
            }
            other => panic!("expected UnexpectedTag, got {other:?}"),
        }
    }

    #[test]
    fn test_from_element_unexpected_child_cites_both_tags() {
        let element = Element::new("branch").with_child(Element::new("twig"));

        let err = Branch::from_element(&element).unwrap_err();

        assert!(matches!(
            err,
            ProtocolError::UnexpectedTag { ref expected, ref actual }
                if expected == "leaf" && actual == "twig"
        ));
    }

    #[test]
    fn test_child_inside_leaf_expects_leaf_close() {
        let err = Leaf::from_xml(r#"<leaf name="a"><leaf name="b"/></leaf>"#)
            .unwrap_err();

        assert!(matches!(
            err,
            ProtocolError::UnexpectedTag { ref expected, ref actual }
                if expected == "/leaf" && actual == "leaf"
        ));
    }

    #[test]
    fn test_wrong_root_tag_fails_on_both_paths() {
        assert!(matches!(
            Branch::from_xml("<trunk/>"),
            Err(ProtocolError::UnexpectedTag { .. })
        ));
        assert!(matches!(
            Branch::from_element(&Element::new("trunk")),
            Err(ProtocolError::UnexpectedTag { .. })
        ));
    }

    #[test]
    fn test_missing_required_attribute_fails() {
        let err = Leaf::from_xml(r#"<leaf weight="2"/>"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingAttribute { ref tag, ref attribute }
                if tag == "leaf" && attribute == "name"
        ));
    }

    #[test]
    fn test_missing_optional_attributes_use_defaults() {
        let branch = Branch::from_xml(r#"<branch><leaf name="a"/></branch>"#).unwrap();
        assert_eq!(branch.label, "");
        assert_eq!(branch.leaves, vec![leaf("a", 0)]);
    }

    #[test]
    fn test_unparsable_attribute_is_malformed() {
        let err = Leaf::from_xml(r#"<leaf name="a" weight="heavy"/>"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MalformedAttribute { ref value, .. } if value == "heavy"
        ));
    }

    #[test]
    fn test_truncated_document_is_eof() {
        let err = Branch::from_xml(r#"<branch><leaf name="a"/>"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedEof));
    }
}
