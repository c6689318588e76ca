//! Raw text codec for non-structured frames.
//!
//! Instance transfer exchanges raw frames carrying delimited text. The
//! payload is plain UTF-8 with no further structure at the framing layer.

use crate::error::{Result, WorkerError};

/// Codec for raw text frame payloads.
pub struct RawCodec;

impl RawCodec {
    /// Encode text as raw payload bytes.
    #[inline]
    pub fn encode(text: &str) -> &[u8] {
        text.as_bytes()
    }

    /// Decode raw payload bytes as UTF-8 text.
    #[inline]
    pub fn decode(bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| WorkerError::Protocol(format!("raw frame is not valid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let text = "a,b,c\n1.0,'x',?\n";
        let encoded = RawCodec::encode(text);
        assert_eq!(RawCodec::decode(encoded).unwrap(), text);
    }

    #[test]
    fn test_empty() {
        assert_eq!(RawCodec::decode(RawCodec::encode("")).unwrap(), "");
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let result = RawCodec::decode(&[0xFF, 0xFE, 0x00]);
        assert!(matches!(result, Err(WorkerError::Protocol(_))));
    }
}
