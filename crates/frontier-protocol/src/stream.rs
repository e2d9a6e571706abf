//! The stream encoding: a forward-only XML tag cursor and its writer.
//!
//! [`StreamReader`] wraps a `quick-xml` pull parser and exposes exactly the
//! operations a record decoder needs:
//!
//! ```text
//! open(tag) → attributes
//! while more_tags() { peek_tag() → delegate to the child's decoder }
//! close(tag)
//! ```
//!
//! Self-closing elements (`<retire/>`) are reported as an open tag followed
//! by a synthetic close, so decoders never have to care which form the
//! peer used.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::{Attributes, Element, ProtocolError};

/// One structural token from the document. Text between tags carries no
/// meaning in this protocol and never becomes a token.
#[derive(Debug)]
enum Token {
    Open {
        name: String,
        attributes: Attributes,
        empty: bool,
    },
    Close(String),
    Eof,
}

// ---------------------------------------------------------------------------
// StreamReader
// ---------------------------------------------------------------------------

/// Forward-only cursor over an XML document.
pub struct StreamReader<'a> {
    reader: Reader<&'a [u8]>,
    /// A token read by `more_tags`/`peek_tag` but not yet consumed.
    lookahead: Option<Token>,
    /// Close tag owed for a consumed self-closing element.
    pending_close: Option<String>,
}

impl<'a> StreamReader<'a> {
    /// Creates a cursor over a UTF-8 document.
    pub fn new(xml: &'a str) -> Self {
        Self::from_bytes(xml.as_bytes())
    }

    /// Creates a cursor over raw bytes (as received from the transport).
    pub fn from_bytes(xml: &'a [u8]) -> Self {
        let mut reader = Reader::from_reader(xml);
        let config = reader.config_mut();
        config.trim_text(true);
        // `close` checks end names itself and reports both tags.
        config.check_end_names = false;
        Self {
            reader,
            lookahead: None,
            pending_close: None,
        }
    }

    /// Returns `true` if the next token opens a child element, `false` if
    /// it closes the current one.
    ///
    /// # Errors
    /// `UnexpectedEof` if the document ends first.
    pub fn more_tags(&mut self) -> Result<bool, ProtocolError> {
        match self.peek()? {
            Token::Open { .. } => Ok(true),
            Token::Close(_) => Ok(false),
            Token::Eof => Err(ProtocolError::UnexpectedEof),
        }
    }

    /// The tag of the element about to be opened, or `None` if the next
    /// token is a close tag or the end of the document.
    pub fn peek_tag(&mut self) -> Result<Option<&str>, ProtocolError> {
        match self.peek()? {
            Token::Open { name, .. } => Ok(Some(name.as_str())),
            Token::Close(_) | Token::Eof => Ok(None),
        }
    }

    /// Consumes the opening tag `expected` and returns its attributes.
    ///
    /// # Errors
    /// `UnexpectedTag` citing `expected` and whatever was found instead.
    pub fn open(&mut self, expected: &str) -> Result<Attributes, ProtocolError> {
        match self.next_token()? {
            Token::Open {
                name, attributes, ..
            } if name == expected => Ok(attributes),
            Token::Open { name, .. } => Err(ProtocolError::UnexpectedTag {
                expected: expected.to_string(),
                actual: name,
            }),
            Token::Close(name) => Err(ProtocolError::UnexpectedTag {
                expected: expected.to_string(),
                actual: format!("/{name}"),
            }),
            Token::Eof => Err(ProtocolError::UnexpectedEof),
        }
    }

    /// Consumes whatever opening tag comes next.
    pub fn open_any(&mut self) -> Result<(String, Attributes), ProtocolError> {
        match self.next_token()? {
            Token::Open {
                name, attributes, ..
            } => Ok((name, attributes)),
            Token::Close(name) => Err(ProtocolError::Malformed(format!(
                "expected an element, found </{name}>"
            ))),
            Token::Eof => Err(ProtocolError::UnexpectedEof),
        }
    }

    /// Consumes the closing tag of `expected`.
    pub fn close(&mut self, expected: &str) -> Result<(), ProtocolError> {
        match self.next_token()? {
            Token::Close(name) if name == expected => Ok(()),
            Token::Close(name) => Err(ProtocolError::UnexpectedTag {
                expected: format!("/{expected}"),
                actual: format!("/{name}"),
            }),
            Token::Open { name, .. } => Err(ProtocolError::UnexpectedTag {
                expected: format!("/{expected}"),
                actual: name,
            }),
            Token::Eof => Err(ProtocolError::UnexpectedEof),
        }
    }

    /// Checks that nothing but whitespace, comments, or declarations remain.
    pub fn finish(&mut self) -> Result<(), ProtocolError> {
        match self.next_token()? {
            Token::Eof => Ok(()),
            Token::Open { name, .. } => Err(ProtocolError::Malformed(format!(
                "trailing content starting at <{name}>"
            ))),
            Token::Close(name) => Err(ProtocolError::Malformed(format!(
                "trailing content starting at </{name}>"
            ))),
        }
    }

    /// Reads the next element and its whole subtree, with no schema.
    pub fn read_element(&mut self) -> Result<Element, ProtocolError> {
        let (name, attributes) = self.open_any()?;
        let mut children = Vec::new();
        while self.more_tags()? {
            children.push(self.read_element()?);
        }
        self.close(&name)?;
        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn peek(&mut self) -> Result<&Token, ProtocolError> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.read_token()?);
        }
        match &self.lookahead {
            Some(token) => Ok(token),
            None => Err(ProtocolError::UnexpectedEof),
        }
    }

    fn next_token(&mut self) -> Result<Token, ProtocolError> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.read_token()?,
        };
        if let Token::Open {
            name, empty: true, ..
        } = &token
        {
            self.pending_close = Some(name.clone());
        }
        Ok(token)
    }

    fn read_token(&mut self) -> Result<Token, ProtocolError> {
        if let Some(name) = self.pending_close.take() {
            return Ok(Token::Close(name));
        }
        loop {
            match self.reader.read_event().map_err(malformed)? {
                Event::Start(start) => return open_token(&start, false),
                Event::Empty(start) => return open_token(&start, true),
                Event::End(end) => {
                    return Ok(Token::Close(utf8(end.name().as_ref())?));
                }
                Event::Text(text) => {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(ProtocolError::Malformed(
                            "unexpected text content".into(),
                        ));
                    }
                }
                Event::CData(_) => {
                    return Err(ProtocolError::Malformed(
                        "unexpected CDATA section".into(),
                    ));
                }
                Event::Eof => return Ok(Token::Eof),
                // Declarations, comments, processing instructions.
                _ => {}
            }
        }
    }
}

fn open_token(start: &BytesStart<'_>, empty: bool) -> Result<Token, ProtocolError> {
    let name = utf8(start.name().as_ref())?;
    let mut attributes = Attributes::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(malformed)?;
        let key = utf8(attribute.key.as_ref())?;
        let value = attribute.unescape_value().map_err(malformed)?;
        attributes.insert(key, value.into_owned());
    }
    Ok(Token::Open {
        name,
        attributes,
        empty,
    })
}

fn utf8(bytes: &[u8]) -> Result<String, ProtocolError> {
    String::from_utf8(bytes.to_vec()).map_err(malformed)
}

fn malformed(e: impl std::fmt::Display) -> ProtocolError {
    ProtocolError::Malformed(e.to_string())
}

// ---------------------------------------------------------------------------
// StreamWriter
// ---------------------------------------------------------------------------

/// Forward-only XML writer, the mirror image of [`StreamReader`].
pub struct StreamWriter {
    writer: Writer<Vec<u8>>,
}

impl StreamWriter {
    /// Creates a writer over an in-memory buffer.
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    /// Writes an opening tag. With `empty`, writes a self-closing tag
    /// instead, and no [`close`](Self::close) may follow.
    pub fn open(
        &mut self,
        tag: &str,
        attributes: &Attributes,
        empty: bool,
    ) -> Result<(), ProtocolError> {
        let mut start = BytesStart::new(tag);
        for (name, value) in attributes.iter() {
            start.push_attribute((name, value));
        }
        let event = if empty {
            Event::Empty(start)
        } else {
            Event::Start(start)
        };
        self.writer.write_event(event).map_err(encode)
    }

    /// Writes a closing tag.
    pub fn close(&mut self, tag: &str) -> Result<(), ProtocolError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(encode)
    }

    /// Writes a schema-less element tree.
    pub fn write_element(&mut self, element: &Element) -> Result<(), ProtocolError> {
        let empty = element.children.is_empty();
        self.open(&element.name, &element.attributes, empty)?;
        if !empty {
            for child in &element.children {
                self.write_element(child)?;
            }
            self.close(&element.name)?;
        }
        Ok(())
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    /// Returns the written document as a string.
    pub fn into_string(self) -> Result<String, ProtocolError> {
        String::from_utf8(self.into_bytes()).map_err(encode)
    }
}

impl Default for StreamWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(e: impl std::fmt::Display) -> ProtocolError {
    ProtocolError::Encode(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // StreamReader
    // =====================================================================

    #[test]
    fn test_open_returns_attributes_of_expected_tag() {
        let mut reader = StreamReader::new(r#"<highScore key="k"></highScore>"#);

        let attrs = reader.open("highScore").expect("should open");

        assert_eq!(attrs.get("key"), Some("k"));
        assert!(!reader.more_tags().unwrap());
        reader.close("highScore").expect("should close");
        reader.finish().expect("nothing should remain");
    }

    #[test]
    fn test_open_wrong_tag_cites_expected_and_actual() {
        let mut reader = StreamReader::new("<unit/>");

        let err = reader.open("highScore").unwrap_err();

        match err {
            ProtocolError::UnexpectedTag { expected, actual } => {
                assert_eq!(expected, "highScore");
                assert_eq!(actual, "unit");
            }
            other => panic!("expected UnexpectedTag, got {other:?}"),
        }
    }

    #[test]
    fn test_close_wrong_tag_cites_expected_and_actual() {
        let mut reader = StreamReader::new(r#"<highScore key="k"></nationSummary>"#);

        reader.open("highScore").unwrap();
        assert!(!reader.more_tags().unwrap());
        let err = reader.close("highScore").unwrap_err();

        match err {
            ProtocolError::UnexpectedTag { expected, actual } => {
                assert_eq!(expected, "/highScore");
                assert_eq!(actual, "/nationSummary");
            }
            other => panic!("expected UnexpectedTag, got {other:?}"),
        }
    }

    #[test]
    fn test_self_closing_tag_yields_synthetic_close() {
        let mut reader = StreamReader::new("<retire/>");

        reader.open("retire").unwrap();

        assert!(!reader.more_tags().unwrap());
        reader.close("retire").expect("synthetic close should match");
        reader.finish().unwrap();
    }

    #[test]
    fn test_more_tags_sees_children_then_close() {
        let mut reader =
            StreamReader::new("<a>\n  <b/>\n  <c></c>\n</a>");

        reader.open("a").unwrap();
        assert!(reader.more_tags().unwrap());
        assert_eq!(reader.peek_tag().unwrap(), Some("b"));
        reader.open("b").unwrap();
        reader.close("b").unwrap();
        assert_eq!(reader.peek_tag().unwrap(), Some("c"));
        reader.open("c").unwrap();
        reader.close("c").unwrap();
        assert!(!reader.more_tags().unwrap());
        reader.close("a").unwrap();
    }

    #[test]
    fn test_more_tags_at_end_of_truncated_document_is_eof() {
        let mut reader = StreamReader::new("<a>");
        reader.open("a").unwrap();

        assert!(matches!(
            reader.more_tags(),
            Err(ProtocolError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_text_content_is_malformed() {
        let mut reader = StreamReader::new("<a>hello</a>");
        reader.open("a").unwrap();

        assert!(matches!(
            reader.more_tags(),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_declaration_and_comments_are_skipped() {
        let mut reader = StreamReader::new(
            "<?xml version=\"1.0\"?><!-- hi --><retire/>",
        );
        reader.open("retire").unwrap();
        reader.close("retire").unwrap();
        reader.finish().unwrap();
    }

    #[test]
    fn test_duplicate_attribute_is_malformed() {
        let mut reader = StreamReader::new(r#"<a k="1" k="2"/>"#);
        assert!(matches!(
            reader.open("a"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    // =====================================================================
    // StreamWriter
    // =====================================================================

    #[test]
    fn test_writer_empty_element_is_self_closing() {
        let mut writer = StreamWriter::new();
        writer
            .open("retire", &Attributes::new(), true)
            .unwrap();
        assert_eq!(writer.into_string().unwrap(), "<retire/>");
    }

    #[test]
    fn test_writer_attributes_in_insertion_order() {
        let mut writer = StreamWriter::new();
        let attrs = Attributes::new().with("b", "2").with("a", "1");
        writer.open("x", &attrs, false).unwrap();
        writer.close("x").unwrap();
        assert_eq!(writer.into_string().unwrap(), r#"<x b="2" a="1"></x>"#);
    }
}
