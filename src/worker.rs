//! Worker builder and dispatch loop.
//!
//! The [`WorkerBuilder`] configures the pluggable capabilities (script
//! engine, opaque object codec, nominal inference rule) and produces a
//! [`Worker`] bound to a transport. The worker lifecycle:
//! 1. Connect to the host (or wrap a provided transport)
//! 2. Send the `pid_response` handshake
//! 3. Receive one structured command per cycle and dispatch it
//! 4. Stop on `shutdown` (no response) or a fatal transport error
//!
//! Exactly one command is processed at a time; a long script execution
//! blocks the loop until it completes. There is no pipelining, no
//! cancellation, and no timeout - imposing deadlines is the host's job.
//!
//! # Example
//!
//! ```ignore
//! use gridlink::WorkerBuilder;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), gridlink::WorkerError> {
//!     let worker = WorkerBuilder::new().connect(9001).await?;
//!     worker.run().await
//! }
//! ```

use serde_json::Value as Json;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::codec::{from_portable_text, to_portable_text, MsgPackCodec, ObjectCodec};
use crate::connection::Connection;
use crate::error::Result;
use crate::instances::{
    build_header, parse_csv, write_csv, DataTable, HalfDistinctRule, HeaderDescriptor, NominalRule,
};
use crate::protocol::{
    field_str, field_u64, message_debug, CommandKind, Response, VariableEncoding,
};
use crate::script::{NullEngine, ScriptEngine};
use crate::session::Session;
use crate::value::Value;

/// Loop control returned by dispatch.
enum Flow {
    Continue,
    Shutdown,
}

/// Builder for configuring and creating a worker.
pub struct WorkerBuilder {
    engine: Box<dyn ScriptEngine>,
    codec: Box<dyn ObjectCodec>,
    nominal_rule: Box<dyn NominalRule>,
}

impl WorkerBuilder {
    /// Create a builder with default capabilities: no script engine, the
    /// MessagePack object codec, and the half-distinct nominal rule.
    pub fn new() -> Self {
        Self {
            engine: Box::new(NullEngine),
            codec: Box::new(MsgPackCodec),
            nominal_rule: Box::new(HalfDistinctRule),
        }
    }

    /// Set the script execution engine.
    pub fn engine(mut self, engine: impl ScriptEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Set the opaque object codec used by the `pickled` encoding.
    pub fn object_codec(mut self, codec: impl ObjectCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    /// Set the nominal-vs-string inference rule.
    pub fn nominal_rule(mut self, rule: impl NominalRule + 'static) -> Self {
        self.nominal_rule = Box::new(rule);
        self
    }

    /// Connect to the host on the loopback interface.
    pub async fn connect(self, port: u16) -> Result<Worker<TcpStream>> {
        let stream = TcpStream::connect(("127.0.0.1", port)).await?;
        tracing::info!(port, "connected to host");
        Ok(self.serve(stream))
    }

    /// Bind the worker to an arbitrary transport (used by tests).
    pub fn serve<T: AsyncRead + AsyncWrite + Unpin>(self, io: T) -> Worker<T> {
        Worker {
            conn: Connection::new(io),
            session: Session::new(),
            engine: self.engine,
            codec: self.codec,
            nominal_rule: self.nominal_rule,
        }
    }
}

impl Default for WorkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A worker bound to a host connection.
pub struct Worker<T> {
    conn: Connection<T>,
    session: Session,
    engine: Box<dyn ScriptEngine>,
    codec: Box<dyn ObjectCodec>,
    nominal_rule: Box<dyn NominalRule>,
}

impl<T: AsyncRead + AsyncWrite + Unpin> Worker<T> {
    /// Run the dispatch loop until shutdown or a fatal transport error.
    ///
    /// Sends the pid handshake first. Recoverable errors (malformed
    /// messages, data errors) are reported as structured error frames and
    /// the loop continues; transport errors close the connection and
    /// propagate.
    pub async fn run(mut self) -> Result<()> {
        self.conn.send_structured(&Response::pid()).await?;

        loop {
            let message = match self.conn.recv_structured().await {
                Ok(message) => message,
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(error = %e, "failed to decode command frame");
                    self.ack_err(e.to_string()).await?;
                    continue;
                }
                Err(e) => {
                    let _ = self.conn.close().await;
                    return Err(e);
                }
            };

            match self.dispatch(&message).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Shutdown) => {
                    let _ = self.conn.close().await;
                    return Ok(());
                }
                Err(e) if e.is_recoverable() => {
                    self.ack_err(e.to_string()).await?;
                }
                Err(e) => {
                    let _ = self.conn.close().await;
                    return Err(e);
                }
            }
        }
    }

    /// Route one structured message to its handler.
    async fn dispatch(&mut self, message: &Json) -> Result<Flow> {
        let Some(command) = field_str(message, "command") else {
            // Known hazard: no response is sent, the host must not wait.
            tracing::warn!("message did not contain a command field");
            return Ok(Flow::Continue);
        };
        let Some(kind) = CommandKind::parse(command) else {
            tracing::warn!(command, "unrecognized command");
            return Ok(Flow::Continue);
        };

        tracing::debug!(command = kind.name(), "dispatching command");
        match kind {
            CommandKind::PutInstances => self.put_instances(message).await?,
            CommandKind::GetInstances => self.get_instances(message).await?,
            CommandKind::ExecuteScript => self.execute_script(message).await?,
            CommandKind::GetVariableValue => self.get_variable_value(message).await?,
            CommandKind::VariableIsSet => self.variable_is_set(message).await?,
            CommandKind::SetVariableValue => self.set_variable_value(message).await?,
            CommandKind::GetDebugBuffer => self.get_debug_buffer().await?,
            CommandKind::Shutdown => {
                tracing::info!("received shutdown command");
                return Ok(Flow::Shutdown);
            }
        }
        Ok(Flow::Continue)
    }

    /// Ingest a dataset: store the header, then parse the raw CSV frame
    /// that follows when the row count is positive.
    async fn put_instances(&mut self, message: &Json) -> Result<()> {
        let Some(header_value) = message.get("header") else {
            return self
                .ack_err("put instances json message does not contain a header entry!")
                .await;
        };
        let header: HeaderDescriptor = match serde_json::from_value(header_value.clone()) {
            Ok(header) => header,
            Err(e) => {
                return self
                    .ack_err(format!("put instances header entry is malformed: {}", e))
                    .await
            }
        };
        let Some(num_instances) = field_u64(message, "num_instances") else {
            return self
                .ack_err("put instances json message does not contain a num_instances entry!")
                .await;
        };

        let relation = header.relation_name.clone();
        self.session.set_header(relation.clone(), header.clone());

        if num_instances > 0 {
            let csv_text = match self.conn.recv_raw().await {
                Ok(text) => text,
                Err(e) if e.is_recoverable() => return self.ack_err(e.to_string()).await,
                Err(e) => return Err(e),
            };
            let table = match parse_csv(&csv_text, &header) {
                Ok(table) => table,
                Err(e) if e.is_recoverable() => return self.ack_err(e.to_string()).await,
                Err(e) => return Err(e),
            };
            if message_debug(message) {
                self.session.debug_out(&format!(
                    "stored table '{}' ({} rows x {} columns)",
                    relation,
                    table.num_rows(),
                    table.num_columns()
                ));
            }
            self.session.set(relation, Value::Table(table));
        }
        self.ack_ok().await
    }

    /// Export a dataset: ack, then the inferred header, then the raw CSV
    /// frame without a header row.
    ///
    /// When the variable is missing or not a table the error ack is
    /// followed by a header/data pair for an empty dataset - the observed
    /// protocol proceeds after the error and the host relies on frame
    /// positions, so this asymmetry is kept rather than fixed.
    async fn get_instances(&mut self, message: &Json) -> Result<()> {
        let Some(frame_name) = field_str(message, "frame_name") else {
            return self
                .ack_err("get instances json message does not contain a frame_name entry!")
                .await;
        };

        let (table, failure) = match self.session.get(frame_name) {
            Some(Value::Table(table)) => (table.clone(), None),
            Some(_) => (
                DataTable::empty(frame_name),
                Some(format!(
                    "Variable {} is not a data table object",
                    frame_name
                )),
            ),
            None => (
                DataTable::empty(frame_name),
                Some(format!("Variable {} is not defined", frame_name)),
            ),
        };
        match failure {
            Some(reason) => self.ack_err(reason).await?,
            None => self.ack_ok().await?,
        }

        let header = build_header(frame_name, &table, self.nominal_rule.as_ref());
        if message_debug(message) {
            self.session.debug_out(&format!(
                "sending '{}' ({} rows x {} columns)",
                frame_name,
                table.num_rows(),
                table.num_columns()
            ));
        }
        self.conn
            .send_structured(&Response::InstancesHeader {
                num_instances: table.num_rows(),
                header,
            })
            .await?;
        self.conn.send_raw(&write_csv(&table, false)).await
    }

    /// Run a script through the engine. Engine failures never produce an
    /// error frame: the diagnostic lands in `script_error` and the
    /// response stays `ok`.
    async fn execute_script(&mut self, message: &Json) -> Result<()> {
        let Some(script) = field_str(message, "script") else {
            return self
                .ack_err("execute script json message does not contain a script entry!")
                .await;
        };
        if message_debug(message) {
            self.session
                .debug_out(&format!("Executing script...\n\n{}", script));
        }

        let (script_out, script_error) = match self.engine.execute(script, &mut self.session) {
            Ok(output) => (output.stdout, output.stderr),
            Err(e) => {
                tracing::debug!(error = %e, "script execution failed");
                (String::new(), format!("Error executing script\n{}\n", e))
            }
        };
        self.conn
            .send_structured(&Response::ok_with([
                ("script_out", Json::from(script_out)),
                ("script_error", Json::from(script_error)),
            ]))
            .await
    }

    /// Report whether a variable is defined, without exposing its value.
    async fn variable_is_set(&mut self, message: &Json) -> Result<()> {
        let Some(name) = field_str(message, "variable_name") else {
            return self
                .ack_err("variable is set json message does not contain a variable_name entry!")
                .await;
        };
        self.conn
            .send_structured(&Response::ok_with([
                ("variable_name", Json::from(name)),
                ("variable_exists", Json::from(self.session.is_set(name))),
            ]))
            .await
    }

    /// Send a variable's value under the requested encoding.
    async fn get_variable_value(&mut self, message: &Json) -> Result<()> {
        let Some(encoding_name) = field_str(message, "variable_encoding") else {
            return self
                .ack_err("get variable value message does not contain an encoding field")
                .await;
        };
        let Some(encoding) = VariableEncoding::parse(encoding_name) else {
            return self
                .ack_err("Unknown encoding type for get variable value message")
                .await;
        };
        let Some(name) = field_str(message, "variable_name") else {
            return self
                .ack_err("get variable value json message does not contain a variable_name entry!")
                .await;
        };
        let Some(value) = self.session.get(name) else {
            return self.ack_err(format!("{} does not exist!", name)).await;
        };

        let encoded = match encoding {
            VariableEncoding::Pickled => {
                let bytes = match self.codec.encode(value) {
                    Ok(bytes) => bytes,
                    Err(e) if e.is_recoverable() => {
                        let reason = e.to_string();
                        return self.ack_err(reason).await;
                    }
                    Err(e) => return Err(e),
                };
                Json::from(to_portable_text(&bytes))
            }
            VariableEncoding::Json => value.to_json_value(),
            VariableEncoding::String => Json::from(value.to_string()),
        };

        if message_debug(message) {
            self.session.debug_out(&format!(
                "Sending {} value for var {}",
                encoding.name(),
                name
            ));
        }
        self.conn
            .send_structured(&Response::ok_with([
                ("variable_name", Json::from(name)),
                ("variable_encoding", Json::from(encoding.name())),
                ("variable_value", encoded),
            ]))
            .await
    }

    /// Store a variable sent under the `pickled` encoding.
    ///
    /// Other encodings are accepted by `get_variable_value` but not here;
    /// a present-but-different encoding is silently ignored with no
    /// response, matching the observed protocol.
    async fn set_variable_value(&mut self, message: &Json) -> Result<()> {
        let Some(encoding_name) = field_str(message, "variable_encoding") else {
            return self
                .ack_err("set variable value message does not contain an encoding field")
                .await;
        };
        if VariableEncoding::parse(encoding_name) != Some(VariableEncoding::Pickled) {
            tracing::warn!(
                encoding = encoding_name,
                "unsupported set_variable_value encoding, ignoring"
            );
            return Ok(());
        }

        let (Some(name), Some(value_text)) = (
            field_str(message, "variable_name"),
            field_str(message, "variable_value"),
        ) else {
            return self
                .ack_err(
                    "set variable value json message does not contain a variable_name or \
                     variable_value entry!",
                )
                .await;
        };

        let bytes = match from_portable_text(value_text) {
            Ok(bytes) => bytes,
            Err(e) => return self.ack_err(e.to_string()).await,
        };
        let value = match self.codec.decode(&bytes) {
            Ok(value) => value,
            Err(e) if e.is_recoverable() => return self.ack_err(e.to_string()).await,
            Err(e) => return Err(e),
        };

        self.session.set(name, value);
        self.ack_ok().await
    }

    /// Drain the capture buffers into the response, installing fresh ones.
    async fn get_debug_buffer(&mut self) -> Result<()> {
        let (std_out, std_err) = self.session.drain_capture();
        self.conn
            .send_structured(&Response::ok_with([
                ("std_out", Json::from(std_out)),
                ("std_err", Json::from(std_err)),
            ]))
            .await
    }

    async fn ack_ok(&mut self) -> Result<()> {
        self.conn.send_structured(&Response::ok()).await
    }

    async fn ack_err(&mut self, message: impl Into<String>) -> Result<()> {
        self.conn
            .send_structured(&Response::error(message))
            .await
    }
}
