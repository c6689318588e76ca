//! Frame construction for the length-prefixed wire format.
//!
//! Every frame on the wire is a 4-byte big-endian unsigned length prefix
//! followed by exactly that many payload bytes. The payload is either a
//! UTF-8 JSON document (structured frames) or raw delimited text (data
//! frames used by instance transfer).
//!
//! # Example
//!
//! ```
//! use gridlink::protocol::{build_frame, LENGTH_PREFIX_SIZE};
//!
//! let bytes = build_frame(b"hello");
//! assert_eq!(bytes.len(), LENGTH_PREFIX_SIZE + 5);
//! assert_eq!(&bytes[..4], &[0, 0, 0, 5]);
//! ```

/// Length prefix size in bytes (fixed, exactly 4).
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Encode a payload length as a big-endian prefix.
#[inline]
pub fn encode_length(len: u32) -> [u8; LENGTH_PREFIX_SIZE] {
    len.to_be_bytes()
}

/// Decode a big-endian length prefix.
///
/// Returns `None` if the buffer is too short.
#[inline]
pub fn decode_length(buf: &[u8]) -> Option<u32> {
    if buf.len() < LENGTH_PREFIX_SIZE {
        return None;
    }
    Some(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

/// Build a complete frame as a single byte vector.
///
/// Encodes the length prefix and appends the payload into a contiguous
/// buffer, suitable for a single write to the transport.
pub fn build_frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&encode_length(payload.len() as u32));
    buf.extend_from_slice(payload);
    buf
}
