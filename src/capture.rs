//! Drainable capture buffers for output and error channels.
//!
//! The worker's own diagnostic output goes into a capture buffer instead
//! of the real output channel, which is reserved for the startup
//! handshake. `get_debug_buffer` drains the current contents and installs
//! fresh buffers, so each drain only reflects activity since the previous
//! one.

/// A pair of drainable output/error buffers.
#[derive(Debug, Default)]
pub struct CaptureBuffer {
    out: String,
    err: String,
}

impl CaptureBuffer {
    /// Create an empty buffer pair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to the output buffer.
    pub fn append_out(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Append a line to the error buffer.
    pub fn append_err(&mut self, text: &str) {
        self.err.push_str(text);
        self.err.push('\n');
    }

    /// Take the current contents, leaving fresh empty buffers behind.
    pub fn drain(&mut self) -> (String, String) {
        (std::mem::take(&mut self.out), std::mem::take(&mut self.err))
    }

    /// Whether both buffers are empty.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty() && self.err.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_drain() {
        let mut capture = CaptureBuffer::new();
        capture.append_out("hello");
        capture.append_err("oops");

        let (out, err) = capture.drain();
        assert_eq!(out, "hello\n");
        assert_eq!(err, "oops\n");
        assert!(capture.is_empty());
    }

    #[test]
    fn test_second_drain_only_sees_new_activity() {
        let mut capture = CaptureBuffer::new();
        capture.append_out("first");
        let _ = capture.drain();

        capture.append_out("second");
        let (out, err) = capture.drain();
        assert_eq!(out, "second\n");
        assert_eq!(err, "");
    }

    #[test]
    fn test_drain_empty() {
        let mut capture = CaptureBuffer::new();
        assert_eq!(capture.drain(), (String::new(), String::new()));
    }
}
