//! External service interactions
//!
//! This module contains services for interacting with external systems:
//! - SQLite access
//! - Saved and predefined queries
//! - Recipe persistence
//! - File exports and bulk imports

pub mod database;
pub mod export;
pub mod fs;
pub mod query_store;
pub mod recipe_store;

pub use database::Database;
pub use export::{apply_updates, er_diagram, export_table_csv, import_rows, sql_dump, write_csv};
pub use fs::write_atomic;
pub use query_store::{placeholders, render_template, QuerySource, QueryStore};
pub use recipe_store::{ensure_schema, insert_recipe, load_tag_items};
