//! In-memory typed tabular values.
//!
//! A [`DataTable`] is an ordered set of equally sized typed columns. Cells
//! are optional everywhere; a `None` cell is the missing value and maps to
//! the `?` token on the wire.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkerError};

/// Typed cell storage for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "cells", rename_all = "snake_case")]
pub enum ColumnData {
    /// Floating-point numbers.
    Numeric(Vec<Option<f64>>),
    /// Free text.
    Text(Vec<Option<String>>),
    /// Booleans.
    Bool(Vec<Option<bool>>),
    /// Timestamps without timezone.
    Temporal(Vec<Option<NaiveDateTime>>),
}

impl ColumnData {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(cells) => cells.len(),
            ColumnData::Text(cells) => cells.len(),
            ColumnData::Bool(cells) => cells.len(),
            ColumnData::Temporal(cells) => cells.len(),
        }
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data: ColumnData,
}

/// Timestamp format used on the wire for temporal cells.
pub const TEMPORAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Column {
    /// Create a column from its cells.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell storage.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The wire text of one cell, or `None` for a missing value.
    pub fn cell_text(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(cells) => cells.get(row)?.map(|v| format!("{}", v)),
            ColumnData::Text(cells) => cells.get(row)?.clone(),
            ColumnData::Bool(cells) => cells.get(row)?.map(|b| b.to_string()),
            ColumnData::Temporal(cells) => cells
                .get(row)?
                .map(|t| t.format(TEMPORAL_FORMAT).to_string()),
        }
    }

    /// Distinct non-missing cell texts in first-seen order.
    pub fn distinct_values(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut values = Vec::new();
        for row in 0..self.len() {
            if let Some(text) = self.cell_text(row) {
                if seen.insert(text.clone()) {
                    values.push(text);
                }
            }
        }
        values
    }
}

/// A typed tabular dataset: rows by typed columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    name: String,
    columns: Vec<Column>,
    num_rows: usize,
}

impl DataTable {
    /// Create a table from columns.
    ///
    /// All columns must have the same number of cells.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map(Column::len).unwrap_or(0);
        if let Some(odd) = columns.iter().find(|c| c.len() != num_rows) {
            return Err(WorkerError::Data(format!(
                "column '{}' has {} cells, expected {}",
                odd.name(),
                odd.len(),
                num_rows
            )));
        }
        Ok(Self {
            name: name.into(),
            columns,
            num_rows,
        })
    }

    /// Create a table with no rows and no columns.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            num_rows: 0,
        }
    }

    /// Relation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_table() -> DataTable {
        DataTable::new(
            "t",
            vec![
                Column::new(
                    "num",
                    ColumnData::Numeric(vec![Some(1.0), Some(2.5), None]),
                ),
                Column::new(
                    "txt",
                    ColumnData::Text(vec![Some("a".into()), None, Some("b".into())]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_table_shape() {
        let table = sample_table();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 2);
        assert!(table.column("num").is_some());
        assert!(table.column("nope").is_none());
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = DataTable::new(
            "bad",
            vec![
                Column::new("a", ColumnData::Numeric(vec![Some(1.0)])),
                Column::new("b", ColumnData::Numeric(vec![Some(1.0), Some(2.0)])),
            ],
        );
        assert!(matches!(result, Err(WorkerError::Data(_))));
    }

    #[test]
    fn test_empty_table() {
        let table = DataTable::empty("e");
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 0);
    }

    #[test]
    fn test_cell_text() {
        let table = sample_table();
        let num = table.column("num").unwrap();
        assert_eq!(num.cell_text(0), Some("1".to_string()));
        assert_eq!(num.cell_text(1), Some("2.5".to_string()));
        assert_eq!(num.cell_text(2), None);

        let txt = table.column("txt").unwrap();
        assert_eq!(txt.cell_text(0), Some("a".to_string()));
        assert_eq!(txt.cell_text(1), None);
    }

    #[test]
    fn test_temporal_cell_text() {
        let stamp = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        let col = Column::new("when", ColumnData::Temporal(vec![Some(stamp), None]));
        assert_eq!(col.cell_text(0), Some("2024-03-01 12:30:00".to_string()));
        assert_eq!(col.cell_text(1), None);
    }

    #[test]
    fn test_bool_cell_text() {
        let col = Column::new("flag", ColumnData::Bool(vec![Some(true), Some(false), None]));
        assert_eq!(col.cell_text(0), Some("true".to_string()));
        assert_eq!(col.cell_text(1), Some("false".to_string()));
        assert_eq!(col.cell_text(2), None);
    }

    #[test]
    fn test_distinct_values_first_seen_order() {
        let col = Column::new(
            "c",
            ColumnData::Text(vec![
                Some("b".into()),
                Some("a".into()),
                Some("b".into()),
                None,
                Some("c".into()),
            ]),
        );
        assert_eq!(col.distinct_values(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let table = sample_table();
        let text = serde_json::to_string(&table).unwrap();
        let back: DataTable = serde_json::from_str(&text).unwrap();
        assert_eq!(back, table);
    }
}
