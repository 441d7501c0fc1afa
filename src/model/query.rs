//! Query results and schema metadata returned by the database service

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use std::fmt;

/// A single SQLite value, detached from the statement that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    /// Render the value as a SQL literal for dump files
    ///
    /// Text is quoted with single quotes doubled, numbers are left unquoted,
    /// NULL is literalized and blobs use the `X'..'` hex form.
    pub fn to_sql_literal(&self) -> String {
        match self {
            CellValue::Null => "NULL".to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Real(r) => {
                if r.is_finite() {
                    format!("{:?}", r)
                } else {
                    "NULL".to_string()
                }
            }
            CellValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            CellValue::Blob(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
                format!("X'{}'", hex)
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(r) => write!(f, "{}", r),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Blob(bytes) => write!(f, "<blob {} bytes>", bytes.len()),
        }
    }
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => CellValue::Integer(i),
            ValueRef::Real(r) => CellValue::Real(r),
            ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
        }
    }
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
            CellValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            CellValue::Real(r) => ToSqlOutput::Owned(Value::Real(*r)),
            CellValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            CellValue::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

/// Tabular result of a row-returning statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl QueryResult {
    /// Rows rendered as display strings (for the table grid)
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }
}

/// What running a piece of SQL produced
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The last row-returning statement's rows
    Rows(QueryResult),
    /// Total rows changed when no statement returned rows
    Affected(usize),
}

/// One column as reported by `pragma_table_info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    /// 1-based position in the primary key, 0 when not part of it
    pub primary_key: i64,
}

impl ColumnInfo {
    pub fn is_primary_key(&self) -> bool {
        self.primary_key > 0
    }
}

/// A foreign key edge from a child column to its parent table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub from: String,
    pub parent_table: String,
    pub to: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_literal_escapes_quotes() {
        let value = CellValue::Text("Grandma's pie".to_string());
        assert_eq!(value.to_sql_literal(), "'Grandma''s pie'");
    }

    #[test]
    fn test_sql_literal_numbers_unquoted() {
        assert_eq!(CellValue::Integer(42).to_sql_literal(), "42");
        assert_eq!(CellValue::Real(1.5).to_sql_literal(), "1.5");
        assert_eq!(CellValue::Null.to_sql_literal(), "NULL");
    }

    #[test]
    fn test_sql_literal_blob_hex() {
        let value = CellValue::Blob(vec![0x00, 0xAB, 0x10]);
        assert_eq!(value.to_sql_literal(), "X'00AB10'");
    }

    #[test]
    fn test_display_rows() {
        let result = QueryResult {
            headers: vec!["id".to_string(), "name".to_string()],
            rows: vec![vec![CellValue::Integer(1), CellValue::Null]],
        };
        assert_eq!(result.display_rows(), vec![vec!["1", "NULL"]]);
    }
}
