//! Domain state - business/data state separate from UI concerns

use super::query::{ColumnInfo, QueryResult};
use crate::services::{Database, QueryStore};

/// Domain state containing all business data
#[derive(Default)]
pub struct DomainState {
    /// The open database, if any
    pub database: Option<Database>,

    /// Named queries saved beside the open database
    pub query_store: QueryStore,

    /// User tables of the open database
    pub tables: Vec<String>,

    /// Schema of the table selected in the browser
    pub schema: Vec<ColumnInfo>,

    /// Rows of the table selected in the browser
    pub table_data: QueryResult,

    /// Last row-returning console result (for CSV export)
    pub last_result: Option<QueryResult>,
}

impl DomainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly opened database and its query store
    pub fn replace_database(&mut self, database: Database) {
        self.query_store = QueryStore::load_for(database.path());
        self.database = Some(database);
        self.tables.clear();
        self.schema.clear();
        self.table_data = QueryResult::default();
        self.last_result = None;
    }
}
