//! JSON codec for structured frames.
//!
//! Structured frames carry compact UTF-8 JSON documents. Encoding uses
//! `serde_json::to_vec` (no pretty-printing on the wire).
//!
//! # Example
//!
//! ```
//! use gridlink::codec::JsonCodec;
//!
//! let encoded = JsonCodec::encode(&serde_json::json!({"command": "shutdown"})).unwrap();
//! let decoded: serde_json::Value = JsonCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded["command"], "shutdown");
//! ```

use crate::error::Result;

/// JSON codec for structured frame payloads.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to compact JSON bytes.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// Decode JSON bytes to a value.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
