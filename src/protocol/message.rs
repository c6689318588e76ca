//! Command and response message types.
//!
//! Structured frames carry UTF-8 JSON documents. A request names its
//! handler in the `command` field; responses are discriminated on the
//! `response` field. Commands form a closed set: anything outside
//! [`CommandKind`] is not dispatched.

use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::instances::HeaderDescriptor;

/// The closed set of commands the dispatcher recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    PutInstances,
    GetInstances,
    ExecuteScript,
    GetVariableValue,
    VariableIsSet,
    SetVariableValue,
    GetDebugBuffer,
    Shutdown,
}

impl CommandKind {
    /// Parse a wire command name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "put_instances" => Some(Self::PutInstances),
            "get_instances" => Some(Self::GetInstances),
            "execute_script" => Some(Self::ExecuteScript),
            "get_variable_value" => Some(Self::GetVariableValue),
            "variable_is_set" => Some(Self::VariableIsSet),
            "set_variable_value" => Some(Self::SetVariableValue),
            "get_debug_buffer" => Some(Self::GetDebugBuffer),
            "shutdown" => Some(Self::Shutdown),
            _ => None,
        }
    }

    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PutInstances => "put_instances",
            Self::GetInstances => "get_instances",
            Self::ExecuteScript => "execute_script",
            Self::GetVariableValue => "get_variable_value",
            Self::VariableIsSet => "variable_is_set",
            Self::SetVariableValue => "set_variable_value",
            Self::GetDebugBuffer => "get_debug_buffer",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Wire encodings for variable exchange.
///
/// `pickled` carries the opaque object codec's bytes as portable text;
/// `json` embeds the value in the structured frame; `string` sends the
/// display rendering. Only `pickled` is accepted by `set_variable_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableEncoding {
    Pickled,
    Json,
    String,
}

impl VariableEncoding {
    /// Parse a wire encoding name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "pickled" => Some(Self::Pickled),
            "json" => Some(Self::Json),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// Wire name of the encoding.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pickled => "pickled",
            Self::Json => "json",
            Self::String => "string",
        }
    }
}

/// A structured response frame, discriminated on the `response` field.
#[derive(Debug, Serialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum Response {
    /// Terminal acknowledgement, optionally carrying command-specific
    /// fields (script output, variable payloads, drained buffers).
    Ok {
        #[serde(flatten)]
        fields: Map<String, Json>,
    },
    /// Recoverable failure; the connection stays open.
    Error { error_message: String },
    /// Startup handshake sent immediately after connecting.
    PidResponse { pid: u32 },
    /// Auxiliary frame preceding a raw dataset frame on instance egress.
    InstancesHeader {
        num_instances: usize,
        header: HeaderDescriptor,
    },
}

impl Response {
    /// Bare `ok` acknowledgement.
    pub fn ok() -> Self {
        Response::Ok { fields: Map::new() }
    }

    /// `ok` acknowledgement with extra fields.
    pub fn ok_with<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Json)>,
    {
        Response::Ok {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    /// Error response with a descriptive message.
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error_message: message.into(),
        }
    }

    /// Handshake response carrying this process's pid.
    pub fn pid() -> Self {
        Response::PidResponse {
            pid: std::process::id(),
        }
    }
}

/// Extract a string field from a request document.
pub fn field_str<'a>(message: &'a Json, key: &str) -> Option<&'a str> {
    message.get(key).and_then(Json::as_str)
}

/// Extract an unsigned integer field from a request document.
pub fn field_u64(message: &Json, key: &str) -> Option<u64> {
    message.get(key).and_then(Json::as_u64)
}

/// Whether the request asks for verbose diagnostics (`debug: true`).
pub fn message_debug(message: &Json) -> bool {
    message
        .get("debug")
        .and_then(Json::as_bool)
        .unwrap_or(false)
}
