//! Instance marshalling: schema description, type inference, and the
//! delimited-text wire form of tabular data.
//!
//! - [`table`] - the in-memory typed dataset
//! - [`header`] - header descriptors and nominal-vs-string inference
//! - [`csv`] - delimited-text encode/decode with the wire's quoting rules

mod csv;
mod header;
mod table;

pub use csv::{parse_csv, write_csv, MISSING_TOKEN};
pub use header::{
    build_header, AttributeDescriptor, AttributeKind, HalfDistinctRule, HeaderDescriptor,
    NominalRule,
};
pub use table::{Column, ColumnData, DataTable, TEMPORAL_FORMAT};
