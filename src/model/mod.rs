//! Model layer - centralized state management
//!
//! This module contains all state-related types:
//! - `DomainState` - Business/data state (database, tables, results)
//! - `ModalStack` - Modal overlay management
//! - Items for the check combo, recipe drafts and query results

pub mod domain;
pub mod item;
pub mod modal;
pub mod query;
pub mod recipe;
pub mod ui;
