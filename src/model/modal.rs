//! Modal stack for managing overlays
//!
//! Only the top modal receives input; everything below it is drawn first.

/// What a text prompt is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    OpenDatabase,
    SaveQueryName,
    ExportTableCsv,
    ExportResultCsv,
    ExportSqlDump,
    ExportErDiagram,
    ImportRows,
    ApplyUpdates,
    ImportRecipeJson,
}

impl PromptPurpose {
    pub fn title(&self) -> &str {
        match self {
            PromptPurpose::OpenDatabase => "Open Database",
            PromptPurpose::SaveQueryName => "Save Query As",
            PromptPurpose::ExportTableCsv => "Export Table to CSV",
            PromptPurpose::ExportResultCsv => "Export Result to CSV",
            PromptPurpose::ExportSqlDump => "Export SQL Dump",
            PromptPurpose::ExportErDiagram => "Export ER Diagram",
            PromptPurpose::ImportRows => "Import Rows into Table",
            PromptPurpose::ApplyUpdates => "Apply Updates from JSON",
            PromptPurpose::ImportRecipeJson => "Import Recipe JSON",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PromptPurpose::OpenDatabase => "Database file:",
            PromptPurpose::SaveQueryName => "Query name:",
            PromptPurpose::ImportRows => "CSV or JSON file to read:",
            PromptPurpose::ApplyUpdates | PromptPurpose::ImportRecipeJson => "File to read:",
            _ => "File to write:",
        }
    }
}

/// Severity of a notification modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Represents a modal overlay that can be displayed on top of the main UI
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Keyboard shortcuts
    Help { scroll_offset: usize },
    /// User-facing message (errors, warnings, results)
    Notification {
        severity: Severity,
        title: String,
        message: String,
    },
    /// Single-line text input
    Prompt { purpose: PromptPurpose },
    /// Saved and predefined queries
    SavedQueries { selected_index: usize },
}

/// A stack of modal overlays
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Modal> {
        self.stack.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Iterate from bottom to top (drawing order)
    pub fn iter(&self) -> impl Iterator<Item = &Modal> {
        self.stack.iter()
    }
}
