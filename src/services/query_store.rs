//! Named queries saved next to each database file
//!
//! The store for `recipe.db` lives in `recipe.db.queries.json`. It is read
//! when the database is opened and rewritten wholesale on every change.

use super::fs::write_atomic;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{info, warn};

/// Queries shipped with the application; `{name}` marks a placeholder
pub const PREDEFINED_QUERIES: &[(&str, &str)] = &[
    (
        "list_tags_with_categories",
        "SELECT t.id, t.name, c.id, c.name\n\
         FROM tag AS t\n\
         LEFT JOIN category AS c\n\
         ON t.category_id = c.id\n\
         ORDER BY c.name, t.name;",
    ),
    (
        "count_rows_in_table",
        "SELECT '{table_name}' AS table_name, COUNT(*) AS total_rows\n\
         FROM \"{table_name}\";",
    ),
];

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Fill `{name}` placeholders; unknown names are left untouched
pub fn render_template(sql: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(sql, |caps: &regex::Captures| {
            let name = &caps[1];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Placeholder names a query still needs, each once, in order of appearance
pub fn placeholders(sql: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(sql) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Where a listed query comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    Predefined,
    Saved,
}

/// Query name to SQL text, persisted beside a database
#[derive(Debug, Clone, Default)]
pub struct QueryStore {
    path: Option<PathBuf>,
    queries: BTreeMap<String, String>,
}

impl QueryStore {
    /// Sidecar path for a database file
    pub fn sidecar_path(db_path: &Path) -> PathBuf {
        let mut name = db_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".queries.json");
        db_path.with_file_name(name)
    }

    /// Load the store for `db_path`; a missing or unreadable file gives an empty store
    pub fn load_for(db_path: &Path) -> Self {
        let path = Self::sidecar_path(db_path);
        let queries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(queries) => queries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring malformed query store");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: Some(path),
            queries,
        }
    }

    /// A store that is never written to disk (in-memory databases)
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.queries.get(name).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Saved queries first, then the predefined ones
    pub fn entries(&self) -> Vec<(QuerySource, String, String)> {
        let mut entries: Vec<_> = self
            .queries
            .iter()
            .map(|(name, sql)| (QuerySource::Saved, name.clone(), sql.clone()))
            .collect();
        entries.extend(
            PREDEFINED_QUERIES
                .iter()
                .map(|(name, sql)| (QuerySource::Predefined, name.to_string(), sql.to_string())),
        );
        entries
    }

    /// The in-memory store only changes once the file is written
    pub fn save(&mut self, name: &str, sql: &str) -> Result<()> {
        let mut queries = self.queries.clone();
        queries.insert(name.to_string(), sql.to_string());
        self.persist(&queries)?;
        self.queries = queries;
        info!(name, "saved query");
        Ok(())
    }

    /// Remove a saved query; returns whether it existed
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        if !self.queries.contains_key(name) {
            return Ok(false);
        }
        let mut queries = self.queries.clone();
        queries.remove(name);
        self.persist(&queries)?;
        self.queries = queries;
        info!(name, "deleted query");
        Ok(true)
    }

    fn persist(&self, queries: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = serde_json::to_string_pretty(queries)?;
        write_atomic(path, contents.as_bytes())
            .with_context(|| format!("Failed to save queries to {}", path.display()))
    }
}
