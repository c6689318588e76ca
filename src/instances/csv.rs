//! Delimited-text wire form for instance transfer.
//!
//! Conventions (both directions): delimiter `,`, quote `'`, escape `\`,
//! missing-value token `?`, one `\n` per row. Ingestion includes a header
//! row naming the columns; egress omits it.
//!
//! A field is quoted when it contains the delimiter, the quote, the
//! escape, a line break, or when its literal text would otherwise collide
//! with the missing token. Inside quotes, the quote and escape characters
//! are backslash-escaped. An unquoted `?` (or an empty unquoted field) is
//! a missing value; a quoted `'?'` is the literal text.

use chrono::{NaiveDate, NaiveDateTime};

use super::header::{AttributeKind, HeaderDescriptor};
use super::table::{Column, ColumnData, DataTable, TEMPORAL_FORMAT};
use crate::error::{Result, WorkerError};

/// Missing-value token on the wire.
pub const MISSING_TOKEN: &str = "?";

/// Serialize a table as delimited text.
///
/// `include_header` controls the leading column-name row: present on
/// ingestion, omitted on egress.
pub fn write_csv(table: &DataTable, include_header: bool) -> String {
    let mut out = String::new();
    if include_header {
        let names: Vec<String> = table
            .columns()
            .iter()
            .map(|c| escape_field(c.name()))
            .collect();
        out.push_str(&names.join(","));
        out.push('\n');
    }
    for row in 0..table.num_rows() {
        let mut first = true;
        for column in table.columns() {
            if !first {
                out.push(',');
            }
            first = false;
            match column.cell_text(row) {
                Some(text) => out.push_str(&escape_field(&text)),
                None => out.push_str(MISSING_TOKEN),
            }
        }
        out.push('\n');
    }
    out
}

/// Parse delimited text (header row included) into a typed table.
///
/// Column types come from the descriptor: NUMERIC parses as float, DATE
/// as a timestamp, everything else is kept as text. Cells that fail to
/// parse under their declared type degrade to missing values rather than
/// failing the transfer. Columns absent from the descriptor are text.
pub fn parse_csv(text: &str, header: &HeaderDescriptor) -> Result<DataTable> {
    let mut lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    let header_line = lines
        .next()
        .ok_or_else(|| WorkerError::Data("dataset text is empty".to_string()))?;
    let names: Vec<String> = split_line(header_line)?
        .into_iter()
        .map(|f| f.text)
        .collect();

    let kinds: Vec<AttributeKind> = names
        .iter()
        .map(|name| {
            header
                .attribute(name)
                .map(|a| a.kind)
                .unwrap_or(AttributeKind::String)
        })
        .collect();
    let mut builders: Vec<CellBuilder> = kinds.iter().map(|k| CellBuilder::new(*k)).collect();

    for (line_no, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }
        let fields = split_line(line)?;
        if fields.len() != names.len() {
            return Err(WorkerError::Data(format!(
                "row {} has {} fields, expected {}",
                line_no + 1,
                fields.len(),
                names.len()
            )));
        }
        for (builder, field) in builders.iter_mut().zip(fields) {
            builder.push(field);
        }
    }

    let columns = names
        .into_iter()
        .zip(builders)
        .map(|(name, builder)| Column::new(name, builder.finish()))
        .collect();
    DataTable::new(&header.relation_name, columns)
}

/// Quote and escape a field for the wire.
fn escape_field(text: &str) -> String {
    let needs_quote = text.is_empty()
        || text == MISSING_TOKEN
        || text
            .chars()
            .any(|c| matches!(c, ',' | '\'' | '\\' | '\n' | '\r'));
    if !needs_quote {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// One parsed field; quoting decides whether `?` means missing.
struct Field {
    text: String,
    quoted: bool,
}

impl Field {
    fn is_missing(&self) -> bool {
        !self.quoted && (self.text.is_empty() || self.text == MISSING_TOKEN)
    }
}

/// Split one row into fields, honoring quote and escape characters.
fn split_line(line: &str) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        let mut text = String::new();
        let mut quoted = false;

        if chars.peek() == Some(&'\'') {
            quoted = true;
            chars.next();
            loop {
                match chars.next() {
                    Some('\\') => match chars.next() {
                        Some(c) => text.push(c),
                        None => {
                            return Err(WorkerError::Data(
                                "dangling escape at end of row".to_string(),
                            ))
                        }
                    },
                    Some('\'') => break,
                    Some(c) => text.push(c),
                    None => {
                        return Err(WorkerError::Data("unterminated quoted field".to_string()))
                    }
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                text.push(c);
                chars.next();
            }
        }

        fields.push(Field { text, quoted });

        match chars.next() {
            Some(',') => continue,
            Some(c) => {
                return Err(WorkerError::Data(format!(
                    "unexpected character '{}' after field",
                    c
                )))
            }
            None => break,
        }
    }

    Ok(fields)
}

/// Accumulates typed cells for one column during parsing.
enum CellBuilder {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Temporal(Vec<Option<NaiveDateTime>>),
}

impl CellBuilder {
    fn new(kind: AttributeKind) -> Self {
        match kind {
            AttributeKind::Numeric => CellBuilder::Numeric(Vec::new()),
            AttributeKind::Date => CellBuilder::Temporal(Vec::new()),
            AttributeKind::String | AttributeKind::Nominal => CellBuilder::Text(Vec::new()),
        }
    }

    fn push(&mut self, field: Field) {
        if field.is_missing() {
            match self {
                CellBuilder::Numeric(cells) => cells.push(None),
                CellBuilder::Text(cells) => cells.push(None),
                CellBuilder::Temporal(cells) => cells.push(None),
            }
            return;
        }
        match self {
            CellBuilder::Numeric(cells) => cells.push(field.text.parse::<f64>().ok()),
            CellBuilder::Text(cells) => cells.push(Some(field.text)),
            CellBuilder::Temporal(cells) => cells.push(parse_temporal(&field.text)),
        }
    }

    fn finish(self) -> ColumnData {
        match self {
            CellBuilder::Numeric(cells) => ColumnData::Numeric(cells),
            CellBuilder::Text(cells) => ColumnData::Text(cells),
            CellBuilder::Temporal(cells) => ColumnData::Temporal(cells),
        }
    }
}

fn parse_temporal(text: &str) -> Option<NaiveDateTime> {
    if let Ok(stamp) = NaiveDateTime::parse_from_str(text, TEMPORAL_FORMAT) {
        return Some(stamp);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instances::header::AttributeDescriptor;

    fn header_with(attrs: &[(&str, AttributeKind)]) -> HeaderDescriptor {
        HeaderDescriptor {
            relation_name: "t".to_string(),
            attributes: attrs
                .iter()
                .map(|(name, kind)| AttributeDescriptor {
                    name: name.to_string(),
                    kind: *kind,
                    values: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_escape_plain_field_unquoted() {
        assert_eq!(escape_field("abc"), "abc");
        assert_eq!(escape_field("1.5"), "1.5");
    }

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape_field("a,b"), "'a,b'");
        assert_eq!(escape_field("it's"), r"'it\'s'");
        assert_eq!(escape_field(r"a\b"), r"'a\\b'");
        assert_eq!(escape_field("two\nlines"), "'two\nlines'");
    }

    #[test]
    fn test_literal_question_mark_is_quoted() {
        // A literal "?" must survive the wire; only the bare token means
        // missing.
        assert_eq!(escape_field("?"), "'?'");
        assert_eq!(escape_field(""), "''");
    }

    #[test]
    fn test_write_csv_with_and_without_header() {
        let table = DataTable::new(
            "t",
            vec![
                Column::new("n", ColumnData::Numeric(vec![Some(1.0), None])),
                Column::new(
                    "s",
                    ColumnData::Text(vec![Some("x".into()), Some("y,z".into())]),
                ),
            ],
        )
        .unwrap();

        assert_eq!(write_csv(&table, true), "n,s\n1,x\n?,'y,z'\n");
        assert_eq!(write_csv(&table, false), "1,x\n?,'y,z'\n");
    }

    #[test]
    fn test_split_line_quotes_and_escapes() {
        let fields = split_line(r"plain,'a,b','it\'s',?").unwrap();
        let texts: Vec<&str> = fields.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["plain", "a,b", "it's", "?"]);
        assert!(!fields[0].quoted);
        assert!(fields[1].quoted);
        assert!(fields[3].is_missing());
    }

    #[test]
    fn test_split_line_rejects_unterminated_quote() {
        assert!(split_line("'open").is_err());
        assert!(split_line(r"'trailing\").is_err());
    }

    #[test]
    fn test_parse_csv_typed_columns() {
        let header = header_with(&[
            ("num", AttributeKind::Numeric),
            ("label", AttributeKind::Nominal),
            ("when", AttributeKind::Date),
        ]);
        let text = "num,label,when\n\
                    1.5,a,2024-03-01 12:30:00\n\
                    ?,b,2024-03-02\n\
                    3,?,?\n";
        let table = parse_csv(text, &header).unwrap();

        assert_eq!(table.name(), "t");
        assert_eq!(table.num_rows(), 3);
        assert_eq!(
            table.column("num").unwrap().data(),
            &ColumnData::Numeric(vec![Some(1.5), None, Some(3.0)])
        );
        assert_eq!(
            table.column("label").unwrap().data(),
            &ColumnData::Text(vec![Some("a".into()), Some("b".into()), None])
        );
        match table.column("when").unwrap().data() {
            ColumnData::Temporal(cells) => {
                assert_eq!(
                    cells[0].map(|t| t.format(TEMPORAL_FORMAT).to_string()),
                    Some("2024-03-01 12:30:00".to_string())
                );
                assert_eq!(
                    cells[1].map(|t| t.format(TEMPORAL_FORMAT).to_string()),
                    Some("2024-03-02 00:00:00".to_string())
                );
                assert_eq!(cells[2], None);
            }
            other => panic!("expected temporal column, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_csv_column_not_in_descriptor_is_text() {
        let header = header_with(&[]);
        let table = parse_csv("extra\nhello\n", &header).unwrap();
        assert_eq!(
            table.column("extra").unwrap().data(),
            &ColumnData::Text(vec![Some("hello".into())])
        );
    }

    #[test]
    fn test_parse_csv_unparseable_numeric_degrades_to_missing() {
        let header = header_with(&[("n", AttributeKind::Numeric)]);
        let table = parse_csv("n\nnot-a-number\n2\n", &header).unwrap();
        assert_eq!(
            table.column("n").unwrap().data(),
            &ColumnData::Numeric(vec![None, Some(2.0)])
        );
    }

    #[test]
    fn test_parse_csv_field_count_mismatch() {
        let header = header_with(&[("a", AttributeKind::Numeric), ("b", AttributeKind::Numeric)]);
        let result = parse_csv("a,b\n1\n", &header);
        assert!(matches!(result, Err(WorkerError::Data(_))));
    }

    #[test]
    fn test_parse_csv_skips_blank_lines_and_crlf() {
        let header = header_with(&[("a", AttributeKind::Numeric)]);
        let table = parse_csv("a\r\n1\r\n\r\n2\n\n", &header).unwrap();
        assert_eq!(
            table.column("a").unwrap().data(),
            &ColumnData::Numeric(vec![Some(1.0), Some(2.0)])
        );
    }

    #[test]
    fn test_roundtrip_preserves_values_and_row_count() {
        let original = DataTable::new(
            "round",
            vec![
                Column::new("n", ColumnData::Numeric(vec![Some(1.0), None, Some(-2.5)])),
                Column::new(
                    "s",
                    ColumnData::Text(vec![Some("plain".into()), Some("a,b'c\\d".into()), None]),
                ),
            ],
        )
        .unwrap();

        let header = header_with(&[("n", AttributeKind::Numeric), ("s", AttributeKind::String)]);
        let text = write_csv(&original, true);
        let parsed = parse_csv(&text, &header).unwrap();

        assert_eq!(parsed.num_rows(), original.num_rows());
        assert_eq!(
            parsed.column("n").unwrap().data(),
            original.column("n").unwrap().data()
        );
        assert_eq!(
            parsed.column("s").unwrap().data(),
            original.column("s").unwrap().data()
        );
    }

    #[test]
    fn test_roundtrip_literal_question_mark() {
        let original = DataTable::new(
            "q",
            vec![Column::new(
                "s",
                ColumnData::Text(vec![Some("?".into()), None]),
            )],
        )
        .unwrap();
        let header = header_with(&[("s", AttributeKind::String)]);
        let parsed = parse_csv(&write_csv(&original, true), &header).unwrap();
        assert_eq!(
            parsed.column("s").unwrap().data(),
            original.column("s").unwrap().data()
        );
    }
}
