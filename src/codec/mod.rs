//! Codec module - serialization/deserialization for frame payloads.
//!
//! - [`JsonCodec`] - UTF-8 JSON documents (structured frames)
//! - [`RawCodec`] - plain UTF-8 text (raw data frames)
//! - [`ObjectCodec`] / [`MsgPackCodec`] - the pluggable opaque object
//!   codec used by the `pickled` variable encoding, carried over the wire
//!   as base64 portable text
//!
//! Frame codecs are marker structs with static methods; the object codec
//! is a trait so the host-specific serialization can be swapped out.

mod json;
mod opaque;
mod raw;

pub use json::JsonCodec;
pub use opaque::{from_portable_text, to_portable_text, MsgPackCodec, ObjectCodec};
pub use raw::RawCodec;
