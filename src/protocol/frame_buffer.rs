//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for handling fragmented frames:
//! - `WaitingForLength`: need the 4-byte length prefix
//! - `WaitingForPayload`: prefix decoded, need N more payload bytes
//!
//! The transport may deliver data in chunks of arbitrary size, down to a
//! single byte at a time; the buffer reconstructs frame boundaries exactly.

use bytes::{Bytes, BytesMut};

use super::frame::{decode_length, LENGTH_PREFIX_SIZE};

/// State machine for frame parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for the complete 4-byte length prefix.
    WaitingForLength,
    /// Prefix decoded, waiting for payload bytes.
    WaitingForPayload { remaining: u32 },
}

/// Buffer for accumulating incoming bytes and extracting complete frames.
///
/// All data is stored in a single `BytesMut` to minimize allocations;
/// completed payloads are handed out as zero-copy `Bytes`.
pub struct FrameBuffer {
    /// Accumulated bytes from transport reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
}

impl FrameBuffer {
    /// Create a new frame buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            state: State::WaitingForLength,
        }
    }

    /// Append raw bytes from a transport read.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract the next complete frame payload.
    ///
    /// Returns `None` if more data is needed. Call repeatedly after a
    /// `push` to drain all frames that became complete.
    pub fn try_next(&mut self) -> Option<Bytes> {
        loop {
            match self.state {
                State::WaitingForLength => {
                    let size = decode_length(&self.buffer)?;
                    let _ = self.buffer.split_to(LENGTH_PREFIX_SIZE);
                    if size == 0 {
                        return Some(Bytes::new());
                    }
                    self.state = State::WaitingForPayload { remaining: size };
                }
                State::WaitingForPayload { remaining } => {
                    let remaining = remaining as usize;
                    if self.buffer.len() < remaining {
                        return None;
                    }
                    let payload = self.buffer.split_to(remaining).freeze();
                    self.state = State::WaitingForLength;
                    return Some(payload);
                }
            }
        }
    }

    /// Number of buffered bytes not yet assembled into a frame.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForLength;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::WaitingForLength => "WaitingForLength",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
