//! Wire protocol: framing and message types.
//!
//! - [`frame`] / [`FrameBuffer`] - length-prefixed frame construction and
//!   reassembly across partial reads
//! - [`message`] - the closed command set and response documents

mod frame;
mod frame_buffer;
mod message;

pub use frame::{build_frame, decode_length, encode_length, LENGTH_PREFIX_SIZE};
pub use frame_buffer::FrameBuffer;
pub use message::{
    field_str, field_u64, message_debug, CommandKind, Response, VariableEncoding,
};
