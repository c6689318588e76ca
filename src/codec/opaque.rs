//! Opaque object codec and its portable-text carrier.
//!
//! The `pickled` variable encoding serializes a value through an object
//! codec into binary, then represents that binary as base64 text so it can
//! be embedded in a structured frame. The codec is a pluggable capability;
//! the default is MessagePack via `rmp-serde`.
//!
//! **Always `to_vec_named`, never `to_vec`**: hosts decode the payload as
//! maps keyed by field name, not positional arrays.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::Result;
use crate::value::Value;

/// A serialization capability able to turn a [`Value`] into a byte
/// sequence and back.
pub trait ObjectCodec: Send {
    /// Serialize a value to opaque bytes.
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Reconstruct a value from opaque bytes.
    fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

/// Default object codec: MessagePack in struct-as-map format.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsgPackCodec;

impl ObjectCodec for MsgPackCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

/// Represent opaque bytes as portable text for embedding in a structured
/// frame.
pub fn to_portable_text(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Recover opaque bytes from their portable-text form.
pub fn from_portable_text(text: &str) -> Result<Vec<u8>> {
    Ok(BASE64.decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_portable_text_roundtrip() {
        let bytes = vec![0x00, 0x01, 0xFF, 0x7F, 0x80];
        let text = to_portable_text(&bytes);
        assert!(text.is_ascii());
        assert_eq!(from_portable_text(&text).unwrap(), bytes);
    }

    #[test]
    fn test_portable_text_rejects_garbage() {
        assert!(from_portable_text("not base64 !!!").is_err());
    }

    #[test]
    fn test_msgpack_scalar_roundtrip() {
        let codec = MsgPackCodec;
        for value in [Value::Number(3.25), Value::Text("hello".into())] {
            let bytes = codec.encode(&value).unwrap();
            assert_eq!(codec.decode(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_msgpack_nested_document_roundtrip() {
        let codec = MsgPackCodec;
        let value = Value::Document(json!({
            "weights": [0.5, 1.5, 2.5],
            "meta": {"trained": true, "folds": 10}
        }));
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_msgpack_blob_roundtrip() {
        let codec = MsgPackCodec;
        let value = Value::Blob(serde_bytes::ByteBuf::from(vec![1u8, 2, 3, 4]));
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_msgpack_uses_named_encoding() {
        // Struct-as-map: the tagged enum must encode its discriminant as a
        // string key, not a positional index.
        let codec = MsgPackCodec;
        let bytes = codec.encode(&Value::Text("x".into())).unwrap();
        let probe: serde_json::Value = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(probe["kind"], "text");
    }

    #[test]
    fn test_full_pickled_path_roundtrip() {
        let codec = MsgPackCodec;
        let value = Value::Document(json!({"list": [1, 2, {"k": "v"}]}));
        let text = to_portable_text(&codec.encode(&value).unwrap());
        let back = codec.decode(&from_portable_text(&text).unwrap()).unwrap();
        assert_eq!(back, value);
    }
}
