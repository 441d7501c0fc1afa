//! UI Components
//!
//! Each component owns its state, turns key events into Actions and draws
//! itself. Cross-component effects go through the App.

pub mod browser;
pub mod check_combo;
pub mod console;
pub mod help_dialog;
pub mod layout;
pub mod list_editor;
pub mod notification_dialog;
pub mod prompt_dialog;
pub mod quit_dialog;
pub mod recipe_form;
pub mod saved_queries_dialog;
pub mod sql_highlight;
pub mod table;

pub use browser::BrowserComponent;
pub use console::ConsoleComponent;
pub use help_dialog::HelpDialog;
pub use layout::{calculate_main_layout, centered_popup};
pub use notification_dialog::NotificationDialog;
pub use prompt_dialog::PromptDialog;
pub use quit_dialog::QuitDialog;
pub use recipe_form::RecipeForm;
pub use saved_queries_dialog::SavedQueriesDialog;
pub use table::TableComponent;
