//! Header descriptors and attribute type inference.
//!
//! A header descriptor is the schema half of an instance transfer: the
//! relation name plus an ordered list of attribute descriptors. On egress
//! the descriptor is inferred from a table's native column types; the
//! nominal-vs-string decision is policy, not protocol, so it sits behind
//! the [`NominalRule`] strategy.

use serde::{Deserialize, Serialize};

use super::table::{Column, ColumnData, DataTable};

/// Attribute kind on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeKind {
    Numeric,
    String,
    Nominal,
    Date,
}

/// One attribute of a header descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Attribute name.
    pub name: String,
    /// Attribute kind.
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    /// Distinct category labels in first-seen order (NOMINAL only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

/// Schema description of a tabular dataset.
///
/// Ingestion accepts `frame_name` as an alias: hosts send the relation
/// name under that key inside a put header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderDescriptor {
    #[serde(alias = "frame_name")]
    pub relation_name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDescriptor>,
}

impl HeaderDescriptor {
    /// Create an empty descriptor for a relation.
    pub fn new(relation_name: impl Into<String>) -> Self {
        Self {
            relation_name: relation_name.into(),
            attributes: Vec::new(),
        }
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Strategy deciding when a textual column is reclassified as NOMINAL.
pub trait NominalRule: Send {
    /// Given the distinct non-missing value count and the row count,
    /// decide whether the column is categorical.
    fn is_nominal(&self, distinct: usize, num_rows: usize) -> bool;
}

/// Default rule: nominal when the distinct count is strictly less than
/// half the row count.
#[derive(Debug, Default, Clone, Copy)]
pub struct HalfDistinctRule;

impl NominalRule for HalfDistinctRule {
    fn is_nominal(&self, distinct: usize, num_rows: usize) -> bool {
        (distinct as f64) < num_rows as f64 / 2.0
    }
}

/// Infer a header descriptor from a table.
///
/// Per column: numeric stays NUMERIC, temporal becomes DATE, text and
/// boolean start as STRING and are reclassified NOMINAL by the rule, with
/// distinct values enumerated in first-seen order.
pub fn build_header(
    relation_name: &str,
    table: &DataTable,
    rule: &dyn NominalRule,
) -> HeaderDescriptor {
    let num_rows = table.num_rows();
    let attributes = table
        .columns()
        .iter()
        .map(|column| describe_column(column, num_rows, rule))
        .collect();
    HeaderDescriptor {
        relation_name: relation_name.to_string(),
        attributes,
    }
}

fn describe_column(column: &Column, num_rows: usize, rule: &dyn NominalRule) -> AttributeDescriptor {
    match column.data() {
        ColumnData::Numeric(_) => AttributeDescriptor {
            name: column.name().to_string(),
            kind: AttributeKind::Numeric,
            values: None,
        },
        ColumnData::Temporal(_) => AttributeDescriptor {
            name: column.name().to_string(),
            kind: AttributeKind::Date,
            values: None,
        },
        ColumnData::Text(_) | ColumnData::Bool(_) => {
            let distinct = column.distinct_values();
            if rule.is_nominal(distinct.len(), num_rows) {
                AttributeDescriptor {
                    name: column.name().to_string(),
                    kind: AttributeKind::Nominal,
                    values: Some(distinct),
                }
            } else {
                AttributeDescriptor {
                    name: column.name().to_string(),
                    kind: AttributeKind::String,
                    values: None,
                }
            }
        }
    }
}
