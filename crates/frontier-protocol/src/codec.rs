//! Codec trait and implementations for turning documents into bytes.
//!
//! The transport moves opaque byte frames; a [`Codec`] decides how a
//! [`Document`] becomes one of those frames and back. Sessions hold the
//! codec as a generic parameter, so swapping the wire format never touches
//! message or handler code.
//!
//! - [`StreamCodec`] is the primary path: XML written and read in one
//!   forward pass, no intermediate tree.
//! - [`TreeCodec`] is the legacy interchange path: parse into an
//!   [`Element`] first, then build the record from the tree.
//! - [`JsonTreeCodec`] carries the same element tree as JSON, for tools
//!   that would rather not speak XML.

use crate::{Document, Element, ProtocolError, StreamReader, StreamWriter};

/// A codec that can encode documents to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task the server spawns.
pub trait Codec: Send + Sync + 'static {
    /// Encodes a whole document as one frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` (or the JSON variant) if writing
    /// fails.
    fn encode<D: Document>(&self, value: &D) -> Result<Vec<u8>, ProtocolError>;

    /// Decodes one frame into a whole document.
    ///
    /// # Errors
    /// Any decode error. Nothing partially decoded is returned.
    fn decode<D: Document>(&self, data: &[u8]) -> Result<D, ProtocolError>;
}

// ---------------------------------------------------------------------------
// StreamCodec
// ---------------------------------------------------------------------------

/// XML over the forward-only stream cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamCodec;

impl Codec for StreamCodec {
    fn encode<D: Document>(&self, value: &D) -> Result<Vec<u8>, ProtocolError> {
        let mut out = StreamWriter::new();
        value.write(&mut out)?;
        Ok(out.into_bytes())
    }

    fn decode<D: Document>(&self, data: &[u8]) -> Result<D, ProtocolError> {
        let mut input = StreamReader::from_bytes(data);
        let value = D::read(&mut input)?;
        input.finish()?;
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// TreeCodec
// ---------------------------------------------------------------------------

/// XML through an in-memory [`Element`] tree.
///
/// Produces the same bytes as [`StreamCodec`] for every document; it only
/// differs in how much it holds in memory while decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeCodec;

impl Codec for TreeCodec {
    fn encode<D: Document>(&self, value: &D) -> Result<Vec<u8>, ProtocolError> {
        let mut out = StreamWriter::new();
        out.write_element(&value.to_element())?;
        Ok(out.into_bytes())
    }

    fn decode<D: Document>(&self, data: &[u8]) -> Result<D, ProtocolError> {
        D::from_element(&Element::parse_bytes(data)?)
    }
}

// ---------------------------------------------------------------------------
// JsonTreeCodec
// ---------------------------------------------------------------------------

/// The element tree serialized as JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ```rust
/// use frontier_protocol::{Codec, HighScoreMessage, JsonTreeCodec};
///
/// let codec = JsonTreeCodec;
/// let request = HighScoreMessage::request("highScores.all");
///
/// let bytes = codec.encode(&request).unwrap();
/// let decoded: HighScoreMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, request);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTreeCodec;

#[cfg(feature = "json")]
impl Codec for JsonTreeCodec {
    fn encode<D: Document>(&self, value: &D) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(&value.to_element()).map_err(ProtocolError::JsonEncode)
    }

    fn decode<D: Document>(&self, data: &[u8]) -> Result<D, ProtocolError> {
        let element: Element =
            serde_json::from_slice(data).map_err(ProtocolError::JsonDecode)?;
        D::from_element(&element)
    }
}
