use crate::services::write_atomic;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const MAX_RECENT_FILES: usize = 10;

pub const DEFAULT_TAG_QUERY: &str = "SELECT t.name, t.id, c.name FROM tag t \
                                     LEFT JOIN category c ON t.category_id = c.id \
                                     ORDER BY c.name, t.name";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Databases opened before, most recent first
    #[serde(default)]
    pub recent_files: Vec<PathBuf>,
    /// Rows shown when browsing a table
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,
    #[serde(default = "default_combo_max_visible_items")]
    pub combo_max_visible_items: usize,
    /// Query feeding the recipe tag picker (label, value, tooltip columns)
    #[serde(default = "default_tag_query")]
    pub tag_query: String,
}

fn default_row_limit() -> usize {
    100
}

fn default_combo_max_visible_items() -> usize {
    8
}

fn default_tag_query() -> String {
    DEFAULT_TAG_QUERY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recent_files: Vec::new(),
            row_limit: default_row_limit(),
            combo_max_visible_items: default_combo_max_visible_items(),
            tag_query: default_tag_query(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".recipe-tui"))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    pub fn default_log_path() -> PathBuf {
        Self::config_dir()
            .map(|dir| dir.join("recipe-tui.log"))
            .unwrap_or_else(|| PathBuf::from("recipe-tui.log"))
    }

    pub fn load() -> Config {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Config::default(),
        }
    }

    /// Read a config file; a missing or unreadable one gives the defaults
    pub fn load_from(path: &Path) -> Config {
        if !path.exists() {
            return Config::default();
        }
        let parsed = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|contents| serde_json::from_str(&contents).map_err(anyhow::Error::from));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                Config::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let contents = serde_json::to_string_pretty(self)?;
        write_atomic(path, contents.as_bytes())
    }

    /// Move `path` to the front of the recent files
    pub fn push_recent(&mut self, path: &Path) {
        self.recent_files.retain(|p| p != path);
        self.recent_files.insert(0, path.to_path_buf());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    pub fn most_recent(&self) -> Option<&Path> {
        self.recent_files.first().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json"));
        assert_eq!(config, Config::default());
        assert_eq!(config.row_limit, 100);
        assert_eq!(config.combo_max_visible_items, 8);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"row_limit": 25}"#).unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.row_limit, 25);
        assert_eq!(config.tag_query, DEFAULT_TAG_QUERY);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.push_recent(Path::new("/tmp/a.db"));
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_push_recent_dedupes_and_caps() {
        let mut config = Config::default();
        for i in 0..12 {
            config.push_recent(&PathBuf::from(format!("{}.db", i)));
        }
        config.push_recent(Path::new("5.db"));
        assert_eq!(config.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(config.most_recent(), Some(Path::new("5.db")));
        assert_eq!(
            config.recent_files.iter().filter(|p| *p == Path::new("5.db")).count(),
            1
        );
    }
}
