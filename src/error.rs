//! Error types for the gridlink worker.

use thiserror::Error;

/// Main error type for all worker operations.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// I/O error on the host connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (structured frames).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Opaque codec encode error.
    #[error("opaque encode error: {0}")]
    OpaqueEncode(#[from] rmp_serde::encode::Error),

    /// Opaque codec decode error.
    #[error("opaque decode error: {0}")]
    OpaqueDecode(#[from] rmp_serde::decode::Error),

    /// Portable-text (base64) decode error.
    #[error("portable text decode error: {0}")]
    PortableText(#[from] base64::DecodeError),

    /// Protocol error (malformed message, missing required field).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Data error (variable absent, wrong type, unsupported encoding).
    #[error("{0}")]
    Data(String),

    /// Connection closed by the host.
    #[error("connection closed")]
    ConnectionClosed,
}

impl WorkerError {
    /// Whether the error can be reported to the host as a structured error
    /// frame with the connection remaining open.
    ///
    /// Transport failures and connection loss are fatal: the dispatch loop
    /// terminates and the process exits after a best-effort close.
    pub fn is_recoverable(&self) -> bool {
        match self {
            WorkerError::Io(_) | WorkerError::ConnectionClosed => false,
            WorkerError::Json(_)
            | WorkerError::OpaqueEncode(_)
            | WorkerError::OpaqueDecode(_)
            | WorkerError::PortableText(_)
            | WorkerError::Protocol(_)
            | WorkerError::Data(_) => true,
        }
    }
}

/// Result type alias using WorkerError.
pub type Result<T> = std::result::Result<T, WorkerError>;
