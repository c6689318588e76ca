//! # gridlink
//!
//! Worker-side implementation of the GridLink IPC protocol: a long-lived
//! process launched by a host analytics application and driven over a
//! loopback TCP connection to offload tabular-data exchange and
//! on-demand execution of host-supplied scripts.
//!
//! ## Architecture
//!
//! - **Framing**: every frame is a 4-byte big-endian length prefix plus
//!   payload; structured frames carry JSON, raw frames carry delimited
//!   text for instance transfer.
//! - **Dispatch**: one structured command per cycle, strictly
//!   synchronous; the session state (variables, headers, capture
//!   buffers) is threaded through every handler.
//! - **Capabilities**: script execution, the opaque object codec, and
//!   the nominal inference rule are pluggable at build time.
//!
//! ## Example
//!
//! ```ignore
//! use gridlink::WorkerBuilder;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), gridlink::WorkerError> {
//!     WorkerBuilder::new().connect(9001).await?.run().await
//! }
//! ```

pub mod capture;
pub mod codec;
pub mod error;
pub mod instances;
pub mod protocol;
pub mod script;
pub mod session;
pub mod value;

mod connection;
mod worker;

pub use connection::Connection;
pub use error::{Result, WorkerError};
pub use script::{NullEngine, ScriptEngine, ScriptError, ScriptOutput};
pub use session::Session;
pub use value::Value;
pub use worker::{Worker, WorkerBuilder};
