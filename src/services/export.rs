//! File exports and bulk imports
//!
//! SQL dump, mermaid ER diagram and CSV out; CSV or JSON rows and JSON update
//! lists in. Paths come from the prompt dialog.

use super::database::{quote_ident, Database};
use super::fs::write_atomic;
use crate::model::query::{CellValue, QueryResult};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

/// `CREATE` then `INSERT` statements for every table
pub fn sql_dump(db: &Database) -> Result<String> {
    let mut out = String::new();
    for table in db.tables()? {
        if let Some(create) = db.create_statement(&table)? {
            let _ = writeln!(out, "{};", create.trim_end_matches(';'));
        }
        let data = db
            .select_all(&table)
            .with_context(|| format!("Failed to read {}", table))?;
        let columns = data
            .headers
            .iter()
            .map(|h| quote_ident(h))
            .collect::<Vec<_>>()
            .join(", ");
        for row in &data.rows {
            let values = row
                .iter()
                .map(CellValue::to_sql_literal)
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(
                out,
                "INSERT INTO {} ({}) VALUES ({});",
                quote_ident(&table),
                columns,
                values
            );
        }
        out.push('\n');
    }
    Ok(out)
}

fn mermaid_word(text: &str) -> String {
    let word: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if word.is_empty() {
        "ANY".to_string()
    } else {
        word
    }
}

/// Mermaid `erDiagram` of tables, columns and foreign keys
pub fn er_diagram(db: &Database) -> Result<String> {
    let tables = db.tables()?;
    let mut out = String::from("```mermaid\nerDiagram\n");

    for table in &tables {
        let _ = writeln!(out, "    {} {{", mermaid_word(table));
        for column in db.table_schema(table)? {
            let _ = write!(
                out,
                "        {} {}",
                mermaid_word(&column.data_type),
                mermaid_word(&column.name)
            );
            if column.is_primary_key() {
                out.push_str(" PK");
            }
            out.push('\n');
        }
        out.push_str("    }\n");
    }

    for table in &tables {
        for key in db.foreign_keys(table)? {
            let _ = writeln!(
                out,
                "    {} ||--o{{ {} : \"{}\"",
                mermaid_word(&key.parent_table),
                mermaid_word(table),
                key.from
            );
        }
    }

    out.push_str("```\n");
    Ok(out)
}

/// Write any result as CSV, header row first
pub fn write_csv(path: &Path, result: &QueryResult) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&result.headers)?;
    for row in &result.rows {
        writer.write_record(row.iter().map(|cell| match cell {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to encode CSV: {}", e))?;
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), rows = result.rows.len(), "exported csv");
    Ok(())
}

pub fn export_table_csv(db: &Database, table: &str, path: &Path) -> Result<()> {
    let data = db.select_all(table)?;
    write_csv(path, &data)
}

/// Insert every record of a CSV file into `table`; returns the row count
///
/// The header row names the columns. Empty fields are stored as NULL.
pub fn import_csv(db: &Database, table: &str, path: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if columns.is_empty() {
        bail!("{} has no header row", path.display());
    }

    let tx = db.connection().unchecked_transaction()?;
    let mut count = 0;
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Bad CSV record {}", index + 1))?;
        let values: Vec<CellValue> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    CellValue::Null
                } else {
                    CellValue::Text(field.to_string())
                }
            })
            .collect();
        db.insert_row(table, &columns, &values)
            .with_context(|| format!("CSV record {}", index + 1))?;
        count += 1;
    }
    tx.commit()?;

    info!(table, rows = count, "imported csv");
    Ok(count)
}

/// Import a `.json` file with [`import_json`], anything else with [`import_csv`]
pub fn import_rows(db: &Database, table: &str, path: &Path) -> Result<usize> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        import_json(db, table, path)
    } else {
        import_csv(db, table, path)
    }
}

fn json_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => CellValue::Integer(i),
            None => n
                .as_f64()
                .map(CellValue::Real)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
        },
        Value::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

/// Insert a JSON list of objects into `table`; returns the row count
///
/// The keys of the first object name the columns. A later object missing a
/// key stores NULL there; an extra key is an error. All rows go in one
/// transaction.
pub fn import_json(db: &Database, table: &str, path: &Path) -> Result<usize> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON list of objects", path.display()))?;
    let Some(first) = records.first() else {
        bail!("{} contains no rows", path.display());
    };
    let columns: Vec<String> = first.keys().cloned().collect();
    if columns.is_empty() {
        bail!("{}: the first object has no keys", path.display());
    }

    let tx = db.connection().unchecked_transaction()?;
    for (index, record) in records.iter().enumerate() {
        if let Some(extra) = record.keys().find(|key| !columns.contains(key)) {
            bail!("JSON record {}: unexpected column {}", index + 1, extra);
        }
        let values: Vec<CellValue> = columns
            .iter()
            .map(|column| record.get(column).map(json_cell).unwrap_or(CellValue::Null))
            .collect();
        db.insert_row(table, &columns, &values)
            .with_context(|| format!("JSON record {}", index + 1))?;
    }
    tx.commit()?;

    info!(table, rows = records.len(), "imported json");
    Ok(records.len())
}

/// One entry of an update list
#[derive(Debug, Deserialize)]
struct UpdateInstruction {
    table_name: String,
    set_clause: String,
    where_clause: String,
}

/// Apply a JSON list of `{table_name, set_clause, where_clause}` updates
///
/// The clauses are SQL fragments. Every update runs in one transaction and
/// the first failure rolls all of them back. Returns the rows changed.
pub fn apply_updates(db: &Database, path: &Path) -> Result<usize> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let updates: Vec<UpdateInstruction> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON list of updates", path.display()))?;

    let tx = db.connection().unchecked_transaction()?;
    let mut changed = 0;
    for (index, update) in updates.iter().enumerate() {
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            quote_ident(&update.table_name),
            update.set_clause,
            update.where_clause
        );
        changed += tx
            .execute(&sql, [])
            .with_context(|| format!("Error in update {} on {}", index + 1, update.table_name))?;
    }
    tx.commit()?;

    info!(updates = updates.len(), rows = changed, "applied updates");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute_batch(
                "CREATE TABLE category (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
                 CREATE TABLE tag (
                     id INTEGER PRIMARY KEY,
                     name TEXT NOT NULL,
                     category_id INTEGER REFERENCES category(id)
                 );
                 INSERT INTO category (name) VALUES ('Chef''s choice');
                 INSERT INTO tag (name, category_id) VALUES ('Vegan', 1), ('Loose', NULL);",
            )
            .unwrap();
        db
    }

    #[test]
    fn test_sql_dump_contains_create_and_inserts() {
        let dump = sql_dump(&sample_db()).unwrap();
        assert!(dump.contains("CREATE TABLE category"));
        assert!(dump.contains(
            "INSERT INTO \"category\" (\"id\", \"name\") VALUES (1, 'Chef''s choice');"
        ));
        assert!(dump.contains("VALUES (2, 'Loose', NULL);"));
        let create = dump.find("CREATE TABLE tag").unwrap();
        let insert = dump.find("INSERT INTO \"tag\"").unwrap();
        assert!(create < insert);
    }

    #[test]
    fn test_sql_dump_replays_into_empty_database() {
        let dump = sql_dump(&sample_db()).unwrap();
        let copy = Database::open_in_memory().unwrap();
        copy.connection().execute_batch(&dump).unwrap();
        assert_eq!(copy.view_table("tag", 10).unwrap().rows.len(), 2);
    }

    #[test]
    fn test_er_diagram() {
        let diagram = er_diagram(&sample_db()).unwrap();
        assert!(diagram.starts_with("```mermaid\nerDiagram\n"));
        assert!(diagram.contains("        INTEGER id PK\n"));
        assert!(diagram.contains("    category ||--o{ tag : \"category_id\"\n"));
        assert!(diagram.ends_with("```\n"));
    }

    #[test]
    fn test_mermaid_word_fallback() {
        assert_eq!(mermaid_word(""), "ANY");
        assert_eq!(mermaid_word("VARCHAR(20)"), "VARCHAR_20_");
    }

    #[test]
    fn test_csv_export_then_import() {
        let db = sample_db();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.csv");
        export_table_csv(&db, "tag", &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("id,name,category_id\n1,Vegan,1\n"));

        db.connection().execute_batch("DELETE FROM tag").unwrap();
        assert_eq!(import_csv(&db, "tag", &path).unwrap(), 2);
        let rows = db.view_table("tag", 10).unwrap().rows;
        assert_eq!(rows[1][2], CellValue::Null);
    }

    #[test]
    fn test_json_import_by_extension() {
        let db = sample_db();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.json");
        std::fs::write(
            &path,
            r#"[{"name": "Quick", "category_id": 1}, {"name": "Cheap"}]"#,
        )
        .unwrap();

        assert_eq!(import_rows(&db, "tag", &path).unwrap(), 2);
        let rows = db.view_table("tag", 10).unwrap().rows;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2][1], CellValue::Text("Quick".to_string()));
        assert_eq!(rows[2][2], CellValue::Integer(1));
        assert_eq!(rows[3][2], CellValue::Null);
    }

    #[test]
    fn test_json_import_rejects_extra_column() {
        let db = sample_db();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.json");
        std::fs::write(&path, r#"[{"name": "Quick"}, {"name": "Cheap", "color": "red"}]"#).unwrap();

        let err = import_json(&db, "tag", &path).unwrap_err();
        assert!(err.to_string().contains("color"));
        assert_eq!(db.view_table("tag", 10).unwrap().rows.len(), 2);
    }

    #[test]
    fn test_apply_updates() {
        let db = sample_db();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updates.json");
        std::fs::write(
            &path,
            r#"[
                {"table_name": "tag", "set_clause": "category_id = 1", "where_clause": "category_id IS NULL"},
                {"table_name": "category", "set_clause": "name = 'Diet'", "where_clause": "id = 1"}
            ]"#,
        )
        .unwrap();

        assert_eq!(apply_updates(&db, &path).unwrap(), 2);
        let rows = db.view_table("tag", 10).unwrap().rows;
        assert!(rows.iter().all(|row| row[2] == CellValue::Integer(1)));
    }

    #[test]
    fn test_apply_updates_is_all_or_nothing() {
        let db = sample_db();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updates.json");
        std::fs::write(
            &path,
            r#"[
                {"table_name": "category", "set_clause": "name = 'Diet'", "where_clause": "id = 1"},
                {"table_name": "tag", "set_clause": "nope = 1", "where_clause": "1"}
            ]"#,
        )
        .unwrap();

        let err = apply_updates(&db, &path).unwrap_err();
        assert!(format!("{:#}", err).contains("update 2"));
        let name = &db.view_table("category", 10).unwrap().rows[0][1];
        assert_eq!(*name, CellValue::Text("Chef's choice".to_string()));
    }

    #[test]
    fn test_csv_import_rolls_back_on_error() {
        let db = sample_db();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "name,missing_column\nA,1\n").unwrap();

        assert!(import_csv(&db, "tag", &path).is_err());
        assert_eq!(db.view_table("tag", 10).unwrap().rows.len(), 2);
    }
}
