//! Codec trait and implementations for serializing wire messages.
//!
//! Sessions hold a codec rather than calling `serde_json` directly, so a
//! different encoding can be dropped in without touching the workers.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes bytes back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or do not
    /// match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// Encodes a value as text for transports that distinguish text frames.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidMessage` if the encoding is not UTF-8.
    fn encode_text<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError> {
        String::from_utf8(self.encode(value)?)
            .map_err(|e| ProtocolError::InvalidMessage(e.to_string()))
    }
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use nightfall_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg: ClientMessage = codec.decode(br#"{"type":"start"}"#).unwrap();
/// assert_eq!(msg, ClientMessage::Start);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
