//! Framed connection to the host.
//!
//! Wraps any `AsyncRead + AsyncWrite` transport with the length-prefixed
//! frame layer and the two payload codecs: structured frames carry JSON
//! documents, raw frames carry delimited text. Reads tolerate arbitrary
//! fragmentation; a transport that closes mid-frame (or between frames)
//! yields [`WorkerError::ConnectionClosed`], which is fatal.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value as Json;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::{JsonCodec, RawCodec};
use crate::error::{Result, WorkerError};
use crate::protocol::{encode_length, FrameBuffer};

/// Read chunk size for the transport.
const READ_CHUNK: usize = 8 * 1024;

/// A framed, bidirectional connection to the host.
pub struct Connection<T> {
    io: T,
    buffer: FrameBuffer,
}

impl<T: AsyncRead + AsyncWrite + Unpin> Connection<T> {
    /// Wrap a transport.
    pub fn new(io: T) -> Self {
        Self {
            io,
            buffer: FrameBuffer::new(),
        }
    }

    /// Send a structured frame: the message is serialized to a compact
    /// JSON document, then length-prefixed.
    pub async fn send_structured<S: Serialize>(&mut self, message: &S) -> Result<()> {
        let payload = JsonCodec::encode(message)?;
        tracing::trace!(len = payload.len(), "sending structured frame");
        self.send_frame(&payload).await
    }

    /// Send a raw text frame.
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        tracing::trace!(len = text.len(), "sending raw frame");
        self.send_frame(RawCodec::encode(text)).await
    }

    /// Receive a structured frame as a JSON document.
    pub async fn recv_structured(&mut self) -> Result<Json> {
        let payload = self.recv_frame().await?;
        JsonCodec::decode(&payload)
    }

    /// Receive a raw text frame.
    pub async fn recv_raw(&mut self) -> Result<String> {
        let payload = self.recv_frame().await?;
        RawCodec::decode(&payload)
    }

    /// Best-effort shutdown of the write side.
    pub async fn close(&mut self) -> Result<()> {
        self.io.shutdown().await?;
        Ok(())
    }

    async fn send_frame(&mut self, payload: &[u8]) -> Result<()> {
        self.io
            .write_all(&encode_length(payload.len() as u32))
            .await?;
        self.io.write_all(payload).await?;
        self.io.flush().await?;
        Ok(())
    }

    async fn recv_frame(&mut self) -> Result<Bytes> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(frame) = self.buffer.try_next() {
                tracing::trace!(len = frame.len(), "received frame");
                return Ok(frame);
            }
            let n = self.io.read(&mut chunk).await?;
            if n == 0 {
                return Err(WorkerError::ConnectionClosed);
            }
            self.buffer.push(&chunk[..n]);
        }
    }
}
