//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use crate::model::modal::PromptPurpose;
use crate::model::ui::Screen;
use std::fmt;
use std::path::PathBuf;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for time-based updates
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Show another top-level screen
    SwitchScreen(Screen),
    /// Move to next item in list
    NextItem,
    /// Move to previous item in list
    PrevItem,
    /// Jump to first item
    FirstItem,
    /// Jump to last item
    LastItem,

    // ─────────────────────────────────────────────────────────────────────────
    // Scrolling
    // ─────────────────────────────────────────────────────────────────────────
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Open help dialog showing all keyboard shortcuts
    OpenHelp,
    /// Close the current modal
    CloseModal,
    /// Ask for a path or a name
    OpenPrompt(PromptPurpose),
    /// Text entered in the prompt dialog
    SubmitPrompt(String),
    /// Open the saved/predefined queries list
    OpenSavedQueries,

    // ─────────────────────────────────────────────────────────────────────────
    // Database
    // ─────────────────────────────────────────────────────────────────────────
    /// Open (or create) a database file
    OpenDatabase(PathBuf),
    /// Reload the table list
    RefreshTables,
    /// Show schema and rows of a table
    SelectTable(String),
    /// Run SQL typed in the console
    RunSql(String),
    /// Put SQL into the console editor
    LoadQuery(String),
    /// Remove a named query from the store
    DeleteSavedQuery(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Recipe
    // ─────────────────────────────────────────────────────────────────────────
    /// Validate and insert the recipe draft
    SubmitRecipe,

    // ─────────────────────────────────────────────────────────────────────────
    // Notifications
    // ─────────────────────────────────────────────────────────────────────────
    ShowInfo(String),
    ShowWarning(String),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::SwitchScreen(screen) => write!(f, "SwitchScreen({})", screen.name()),
            Action::NextItem => write!(f, "NextItem"),
            Action::PrevItem => write!(f, "PrevItem"),
            Action::FirstItem => write!(f, "FirstItem"),
            Action::LastItem => write!(f, "LastItem"),
            Action::ScrollUp => write!(f, "ScrollUp"),
            Action::ScrollDown => write!(f, "ScrollDown"),
            Action::PageUp => write!(f, "PageUp"),
            Action::PageDown => write!(f, "PageDown"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::OpenPrompt(purpose) => write!(f, "OpenPrompt({})", purpose.title()),
            Action::SubmitPrompt(text) => write!(f, "SubmitPrompt({})", text),
            Action::OpenSavedQueries => write!(f, "OpenSavedQueries"),
            Action::OpenDatabase(path) => write!(f, "OpenDatabase({})", path.display()),
            Action::RefreshTables => write!(f, "RefreshTables"),
            Action::SelectTable(table) => write!(f, "SelectTable({})", table),
            Action::RunSql(_) => write!(f, "RunSql"),
            Action::LoadQuery(_) => write!(f, "LoadQuery"),
            Action::DeleteSavedQuery(name) => write!(f, "DeleteSavedQuery({})", name),
            Action::SubmitRecipe => write!(f, "SubmitRecipe"),
            Action::ShowInfo(msg) => write!(f, "ShowInfo({})", msg),
            Action::ShowWarning(msg) => write!(f, "ShowWarning({})", msg),
        }
    }
}
