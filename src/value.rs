//! Tagged values stored in the worker environment.
//!
//! Every variable the host or a script stores is one of a small closed set
//! of kinds. Explicit tagging replaces runtime type inspection: each wire
//! encoding has a defined conversion per variant instead of reflecting on
//! whatever happens to be stored.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::instances::DataTable;

/// A value held in the worker environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// A numeric scalar.
    Number(f64),
    /// A textual scalar.
    Text(String),
    /// A typed tabular dataset.
    Table(DataTable),
    /// An opaque binary payload produced by an external codec.
    Blob(serde_bytes::ByteBuf),
    /// An arbitrary structured document.
    Document(Json),
}

impl Value {
    /// The structured (`json`) wire embedding of this value.
    ///
    /// Documents embed their inner JSON as-is; scalars map to JSON
    /// scalars. Tables and blobs fall back to the tagged serde form -
    /// whether the result is useful to the host is the caller's contract,
    /// not validated here.
    pub fn to_json_value(&self) -> Json {
        match self {
            Value::Number(n) => Json::from(*n),
            Value::Text(s) => Json::from(s.clone()),
            Value::Document(doc) => doc.clone(),
            other => serde_json::to_value(other).unwrap_or(Json::Null),
        }
    }

    /// Whether this value is a table.
    pub fn as_table(&self) -> Option<&DataTable> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// The textual (`string`) wire rendering of this value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Table(table) => write!(
                f,
                "table '{}' ({} rows x {} columns)",
                table.name(),
                table.num_rows(),
                table.num_columns()
            ),
            Value::Blob(bytes) => write!(f, "blob ({} bytes)", bytes.len()),
            Value::Document(doc) => write!(f, "{}", doc),
        }
    }
}
