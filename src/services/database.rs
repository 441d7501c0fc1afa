//! SQLite access
//!
//! Thin synchronous wrapper over a `rusqlite::Connection`. Every call runs on
//! the UI thread; errors carry the driver message and are surfaced by the app.

use crate::model::query::{CellValue, ColumnInfo, ForeignKey, QueryOutcome, QueryResult};
use anyhow::{bail, Context, Result};
use rusqlite::{params_from_iter, Batch, Connection, OptionalExtension, Params, Statement};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Quote an identifier for interpolation into SQL text
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Run a prepared statement and detach every row from it
fn collect_rows<P: Params>(stmt: &mut Statement<'_>, params: P) -> Result<QueryResult> {
    let headers: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let column_count = headers.len();

    let mut rows = stmt.query(params)?;
    let mut result_rows = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(column_count);
        for i in 0..column_count {
            cells.push(CellValue::from(row.get_ref(i)?));
        }
        result_rows.push(cells);
    }

    Ok(QueryResult {
        headers,
        rows: result_rows,
    })
}

/// An open SQLite database file
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Open (or create) the database at `path`
    ///
    /// Reads the schema once so that a file which is not a database fails
    /// here instead of on the first query.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
            .with_context(|| format!("{} is not a readable SQLite database", path.display()))?;

        info!(path = %path.display(), "opened database");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// User tables, sorted by name
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    pub fn table_schema(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT cid, name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1)",
        )?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    data_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default_value: row.get(4)?,
                    primary_key: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("Failed to read schema of {}", table))?;
        Ok(columns)
    }

    pub fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        let mut stmt = self.conn.prepare(
            "SELECT \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
        )?;
        let keys = stmt
            .query_map([table], |row| {
                Ok(ForeignKey {
                    from: row.get(0)?,
                    parent_table: row.get(1)?,
                    to: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys)
    }

    /// The `CREATE TABLE` statement stored for `table`
    pub fn create_statement(&self, table: &str) -> Result<Option<String>> {
        let sql = self
            .conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(sql.flatten())
    }

    /// First `limit` rows of a table
    pub fn view_table(&self, table: &str, limit: usize) -> Result<QueryResult> {
        let sql = format!("SELECT * FROM {} LIMIT ?1", quote_ident(table));
        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("Error viewing table {}", table))?;
        collect_rows(&mut stmt, [limit as i64])
    }

    /// Every row of a table, in rowid order where there is one
    pub fn select_all(&self, table: &str) -> Result<QueryResult> {
        let sql = format!("SELECT * FROM {}", quote_ident(table));
        self.query(&sql, [])
    }

    /// Run a single row-returning statement with parameters
    pub fn query<P: Params>(&self, sql: &str, params: P) -> Result<QueryResult> {
        let mut stmt = self.conn.prepare(sql)?;
        collect_rows(&mut stmt, params)
    }

    /// Run one or more statements as a unit
    ///
    /// The whole script shares one transaction: if any statement fails,
    /// nothing it changed is kept. The outcome is the last row-returning
    /// statement's rows, or the total number of changed rows.
    pub fn run_sql(&self, sql: &str) -> Result<QueryOutcome> {
        if sql.trim().is_empty() {
            bail!("Nothing to run");
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut last_rows = None;
        let mut affected = 0usize;
        {
            let mut batch = Batch::new(&tx, sql);
            while let Some(mut stmt) = batch.next()? {
                if stmt.column_count() > 0 {
                    last_rows = Some(collect_rows(&mut stmt, [])?);
                } else {
                    affected += stmt.execute([])?;
                }
            }
        }
        tx.commit()?;

        debug!(affected, returned_rows = last_rows.is_some(), "ran sql");
        Ok(match last_rows {
            Some(result) => QueryOutcome::Rows(result),
            None => QueryOutcome::Affected(affected),
        })
    }

    /// Insert one row with bound parameters, returning its rowid
    pub fn insert_row(&self, table: &str, columns: &[String], values: &[CellValue]) -> Result<i64> {
        if columns.len() != values.len() {
            bail!(
                "Error inserting data into {}: {} column(s) but {} value(s)",
                table,
                columns.len(),
                values.len()
            );
        }
        let sql = insert_sql(table, columns);
        self.conn
            .execute(&sql, params_from_iter(values.iter()))
            .with_context(|| format!("Error inserting data into {}", table))?;
        Ok(self.conn.last_insert_rowid())
    }
}

/// `INSERT INTO "t" ("a", "b") VALUES (?1, ?2)`
pub fn insert_sql(table: &str, columns: &[String]) -> String {
    let column_names = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        column_names,
        placeholders
    )
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
                 INSERT INTO category (name) VALUES ('Diet'), ('Season');
                 INSERT INTO tag (name, category_id) VALUES ('Vegan', 1), ('Summer', 2);",
            )
            .unwrap();
        db
    }

    #[test]
    fn test_tables_sorted_without_internal() {
        let db = sample_db();
        db.connection()
            .execute_batch("CREATE TABLE auto (id INTEGER PRIMARY KEY AUTOINCREMENT);")
            .unwrap();
        assert_eq!(db.tables().unwrap(), vec!["auto", "category", "tag"]);
    }

    #[test]
    fn test_table_schema() {
        let db = sample_db();
        let columns = db.table_schema("tag").unwrap();
        assert_eq!(columns.len(), 3);
        assert!(columns[0].is_primary_key());
        assert_eq!(columns[1].name, "name");
        assert!(columns[1].not_null);
        assert_eq!(columns[2].data_type, "INTEGER");
    }

    #[test]
    fn test_foreign_keys() {
        let db = sample_db();
        let keys = db.foreign_keys("tag").unwrap();
        assert_eq!(
            keys,
            vec![ForeignKey {
                from: "category_id".to_string(),
                parent_table: "category".to_string(),
                to: Some("id".to_string()),
            }]
        );
    }

    #[test]
    fn test_view_table_limit() {
        let db = sample_db();
        let result = db.view_table("tag", 1).unwrap();
        assert_eq!(result.headers, vec!["id", "name", "category_id"]);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0][1], CellValue::Text("Vegan".to_string()));
    }

    #[test]
    fn test_run_sql_returns_last_rows() {
        let db = sample_db();
        let outcome = db
            .run_sql("UPDATE tag SET name = 'Winter' WHERE id = 2; SELECT name FROM tag ORDER BY id;")
            .unwrap();
        match outcome {
            QueryOutcome::Rows(result) => {
                assert_eq!(result.rows.len(), 2);
                assert_eq!(result.rows[1][0], CellValue::Text("Winter".to_string()));
            }
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[test]
    fn test_run_sql_counts_changes() {
        let db = sample_db();
        let outcome = db.run_sql("DELETE FROM tag; DELETE FROM category WHERE id = 1").unwrap();
        assert_eq!(outcome, QueryOutcome::Affected(3));
    }

    #[test]
    fn test_run_sql_rolls_back_on_error() {
        let db = sample_db();
        let err = db
            .run_sql("DELETE FROM tag; SELECT * FROM missing_table;")
            .unwrap_err();
        assert!(err.to_string().contains("missing_table"));

        let remaining = db.view_table("tag", 10).unwrap();
        assert_eq!(remaining.rows.len(), 2);
    }

    #[test]
    fn test_run_sql_rejects_blank() {
        let db = sample_db();
        assert!(db.run_sql("   ").is_err());
    }

    #[test]
    fn test_insert_row() {
        let db = sample_db();
        let id = db
            .insert_row(
                "tag",
                &["name".to_string(), "category_id".to_string()],
                &[CellValue::Text("Quick".to_string()), CellValue::Null],
            )
            .unwrap();
        assert_eq!(id, 3);

        let err = db
            .insert_row("tag", &["name".to_string()], &[])
            .unwrap_err();
        assert!(err.to_string().contains("1 column(s) but 0 value(s)"));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("recipe"), "\"recipe\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
