//! Worker-session context.
//!
//! A [`Session`] holds everything a command handler or an executed script
//! can touch: the variable environment, the header descriptors stored by
//! instance ingestion, and the debug capture buffer. It is created empty
//! at process start, threaded `&mut` through every handler, and lives for
//! the whole connection - there is no hidden global state.

use std::collections::HashMap;

use crate::capture::CaptureBuffer;
use crate::instances::HeaderDescriptor;
use crate::value::Value;

/// Per-connection worker state shared across commands and scripts.
#[derive(Debug, Default)]
pub struct Session {
    /// Named variables: tables put by the host, values set over the wire,
    /// and anything scripts create.
    vars: HashMap<String, Value>,
    /// Header descriptors stored by `put_instances`, keyed by relation
    /// name. Kept separately from the materialized tables.
    headers: HashMap<String, HeaderDescriptor>,
    /// Capture buffer drained by `get_debug_buffer`.
    capture: CaptureBuffer,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Store a variable, replacing any previous value under the name.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Whether a variable is defined.
    pub fn is_set(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Store the header descriptor for a relation.
    pub fn set_header(&mut self, name: impl Into<String>, header: HeaderDescriptor) {
        self.headers.insert(name.into(), header);
    }

    /// Look up a stored header descriptor.
    pub fn header(&self, name: &str) -> Option<&HeaderDescriptor> {
        self.headers.get(name)
    }

    /// Append a line to the debug output buffer.
    pub fn debug_out(&mut self, text: &str) {
        self.capture.append_out(text);
    }

    /// Append a line to the debug error buffer.
    pub fn debug_err(&mut self, text: &str) {
        self.capture.append_err(text);
    }

    /// Drain the debug buffers, installing fresh ones.
    pub fn drain_capture(&mut self) -> (String, String) {
        self.capture.drain()
    }
}
