//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that routes keys to the focused screen or modal and applies the resulting
//! Actions to the database and the child components.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    calculate_main_layout, BrowserComponent, ConsoleComponent, HelpDialog, NotificationDialog,
    PromptDialog, QuitDialog, RecipeForm, SavedQueriesDialog,
};
use crate::config::Config;
use crate::model::domain::DomainState;
use crate::model::modal::{Modal, ModalStack, PromptPurpose, Severity};
use crate::model::query::QueryOutcome;
use crate::model::recipe::RecipeImport;
use crate::model::ui::Screen;
use crate::services::{
    apply_updates, er_diagram, export_table_csv, import_rows, insert_recipe, load_tag_items,
    placeholders, render_template, sql_dump, write_atomic, write_csv, Database,
};
use anyhow::{anyhow, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Persisted user settings
    pub config: Config,

    /// Where config changes are written; `None` keeps them in memory
    pub config_path: Option<PathBuf>,

    /// Domain state (business data)
    pub domain: DomainState,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Screen shown below the tab bar
    pub screen: Screen,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub browser: BrowserComponent,
    pub console: ConsoleComponent,
    pub recipe_form: RecipeForm,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
    pub notification_dialog: NotificationDialog,
    pub prompt_dialog: PromptDialog,
    pub saved_queries_dialog: SavedQueriesDialog,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl App {
    pub fn new(config: Config) -> App {
        let recipe_form = RecipeForm::new(config.combo_max_visible_items);
        App {
            config,
            config_path: Config::config_path(),
            domain: DomainState::new(),
            modals: ModalStack::new(),
            screen: Screen::Browser,
            should_quit: false,
            status_message: None,
            browser: BrowserComponent::new(),
            console: ConsoleComponent::new(),
            recipe_form,
            quit_dialog: QuitDialog::default(),
            help_dialog: HelpDialog::default(),
            notification_dialog: NotificationDialog,
            prompt_dialog: PromptDialog::new(),
            saved_queries_dialog: SavedQueriesDialog::new(),
        }
    }

    fn database(&self) -> Result<&Database> {
        self.domain
            .database
            .as_ref()
            .ok_or_else(|| anyhow!("No database is open. Press Ctrl+o to open one."))
    }

    fn selected_table(&self) -> Result<String> {
        self.browser
            .selected_table()
            .map(String::from)
            .ok_or_else(|| anyhow!("No table selected"))
    }

    fn database_name(&self) -> Option<String> {
        self.domain
            .database
            .as_ref()
            .and_then(|db| db.path().file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    fn database_stem(&self) -> String {
        self.domain
            .database
            .as_ref()
            .and_then(|db| db.path().file_stem())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recipe".to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(modal) = self.modals.top().cloned() {
            return self.handle_modal_key_event(&modal, key);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let global = match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => Some(Action::OpenQuitDialog),
            KeyCode::Char('o') if ctrl => Some(Action::OpenPrompt(PromptPurpose::OpenDatabase)),
            KeyCode::Char('n') if ctrl => Some(Action::SwitchScreen(self.screen.next())),
            KeyCode::F(1) => Some(Action::OpenHelp),
            KeyCode::F(2) => Some(Action::SwitchScreen(Screen::Browser)),
            KeyCode::F(3) => Some(Action::SwitchScreen(Screen::Console)),
            KeyCode::F(4) => Some(Action::SwitchScreen(Screen::Recipe)),
            _ => None,
        };
        if global.is_some() {
            return Ok(global);
        }

        match self.screen {
            Screen::Browser => self.browser.handle_key_event(key),
            Screen::Console => self.console.handle_key_event(key),
            Screen::Recipe => self.recipe_form.handle_key_event(key),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if !matches!(action, Action::Tick) {
            debug!(%action, "update");
        }
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick | Action::Resize(_, _) => Ok(None),
            Action::ForceQuit => {
                self.should_quit = true;
                Ok(None)
            }

            // ─────────────────────────────────────────────────────────────────
            // Navigation and scrolling (delegate to the active screen)
            // ─────────────────────────────────────────────────────────────────
            Action::SwitchScreen(screen) => {
                self.screen = screen;
                Ok(None)
            }
            Action::NextItem
            | Action::PrevItem
            | Action::FirstItem
            | Action::LastItem
            | Action::ScrollUp
            | Action::ScrollDown
            | Action::PageUp
            | Action::PageDown => match self.screen {
                Screen::Browser => self.browser.update(action),
                Screen::Console => self.console.update(action),
                Screen::Recipe => Ok(None),
            },

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.quit_dialog.set_database(self.database_name());
                self.modals.push(Modal::QuitConfirm);
                Ok(None)
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help { scroll_offset: 0 });
                Ok(None)
            }
            Action::CloseModal => {
                self.modals.pop();
                Ok(None)
            }
            Action::OpenPrompt(purpose) => {
                self.open_prompt(purpose);
                Ok(None)
            }
            Action::SubmitPrompt(value) => {
                self.modals.pop();
                let purpose = self.prompt_dialog.purpose();
                let result = self.submit_prompt(purpose, &value);
                Ok(self.report(purpose.title(), result))
            }
            Action::OpenSavedQueries => {
                self.saved_queries_dialog
                    .set_entries(self.domain.query_store.entries());
                self.modals.push(Modal::SavedQueries {
                    selected_index: self.saved_queries_dialog.selected_index,
                });
                Ok(None)
            }

            // ─────────────────────────────────────────────────────────────────
            // Database
            // ─────────────────────────────────────────────────────────────────
            Action::OpenDatabase(path) => {
                let result = self.open_database(&path);
                Ok(self.report("Open database", result))
            }
            Action::RefreshTables => {
                let result = self.refresh_tables();
                Ok(self.report("Refresh tables", result))
            }
            Action::SelectTable(table) => {
                let result = self.show_table(&table).map(|_| None);
                Ok(self.report("Load table", result))
            }
            Action::RunSql(sql) => {
                let result = self.run_sql(&sql);
                if let Err(e) = &result {
                    self.console.show_error(&format!("{:#}", e));
                }
                Ok(self.report("SQL error", result))
            }
            Action::LoadQuery(sql) => {
                if matches!(self.modals.top(), Some(Modal::SavedQueries { .. })) {
                    self.modals.pop();
                }
                let sql = match self.browser.selected_table() {
                    Some(table) => render_template(&sql, &[("table_name", table)]),
                    None => sql,
                };
                let unfilled = placeholders(&sql);
                self.status_message = if unfilled.is_empty() {
                    None
                } else {
                    Some(format!("Fill in before running: {}", unfilled.join(", ")))
                };
                self.screen = Screen::Console;
                self.console.update(Action::LoadQuery(sql))
            }
            Action::DeleteSavedQuery(name) => {
                let result = self.delete_saved_query(&name);
                Ok(self.report("Delete query", result))
            }

            // ─────────────────────────────────────────────────────────────────
            // Recipe
            // ─────────────────────────────────────────────────────────────────
            Action::SubmitRecipe => {
                let result = self.submit_recipe();
                Ok(self.report("Save recipe", result))
            }

            // ─────────────────────────────────────────────────────────────────
            // Notifications
            // ─────────────────────────────────────────────────────────────────
            Action::ShowInfo(message) => {
                self.status_message = Some(message.clone());
                self.notify(Severity::Info, "Info", message);
                Ok(None)
            }
            Action::ShowWarning(message) => {
                self.notify(Severity::Warning, "Warning", message);
                Ok(None)
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_main_layout(area);

        self.render_tabs(frame, layout.tabs);
        match self.screen {
            Screen::Browser => self.browser.draw(frame, layout.body)?,
            Screen::Console => self.console.draw(frame, layout.body)?,
            Screen::Recipe => self.recipe_form.draw(frame, layout.body)?,
        }
        self.render_status_bar(frame, layout.status);
        self.render_help_bar(frame, layout.help);

        // Bottom to top, so the focused modal ends up on top
        let modals: Vec<Modal> = self.modals.iter().cloned().collect();
        for modal in &modals {
            self.draw_modal(frame, area, modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Turn an operation failure into an error notification
    fn report(&mut self, what: &str, result: Result<Option<Action>>) -> Option<Action> {
        match result {
            Ok(action) => action,
            Err(e) => {
                let message = format!("{:#}", e);
                error!(operation = what, error = %message, "operation failed");
                self.notify(Severity::Error, what, message);
                None
            }
        }
    }

    fn notify(&mut self, severity: Severity, title: &str, message: String) {
        self.modals.push(Modal::Notification {
            severity,
            title: title.to_string(),
            message,
        });
    }

    fn open_prompt(&mut self, purpose: PromptPurpose) {
        let table = self.browser.selected_table().unwrap_or("table").to_string();
        let stem = self.database_stem();
        let (initial, suggestions) = match purpose {
            PromptPurpose::OpenDatabase => (
                String::new(),
                self.config
                    .recent_files
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect(),
            ),
            PromptPurpose::SaveQueryName => (String::new(), Vec::new()),
            PromptPurpose::ExportTableCsv => (format!("{}.csv", table), Vec::new()),
            PromptPurpose::ImportRows => (
                format!("{}.csv", table),
                vec![format!("{}.json", table)],
            ),
            PromptPurpose::ApplyUpdates => ("updates.json".to_string(), Vec::new()),
            PromptPurpose::ExportResultCsv => ("result.csv".to_string(), Vec::new()),
            PromptPurpose::ExportSqlDump => (format!("{}.sql", stem), Vec::new()),
            PromptPurpose::ExportErDiagram => (format!("{}.md", stem), Vec::new()),
            PromptPurpose::ImportRecipeJson => ("recipe.json".to_string(), Vec::new()),
        };
        self.prompt_dialog.open(purpose, &initial, suggestions);
        self.modals.push(Modal::Prompt { purpose });
    }

    fn submit_prompt(&mut self, purpose: PromptPurpose, value: &str) -> Result<Option<Action>> {
        let path = PathBuf::from(value);
        match purpose {
            PromptPurpose::OpenDatabase => Ok(Some(Action::OpenDatabase(path))),
            PromptPurpose::SaveQueryName => {
                let sql = self.console.editor.text();
                if sql.trim().is_empty() {
                    return Ok(Some(Action::ShowWarning(
                        "The editor is empty, nothing to save.".to_string(),
                    )));
                }
                self.domain.query_store.save(value, &sql)?;
                self.status_message = Some(format!("Saved query '{}'", value));
                Ok(None)
            }
            PromptPurpose::ExportTableCsv => {
                let table = self.selected_table()?;
                export_table_csv(self.database()?, &table, &path)?;
                Ok(Some(exported(&path)))
            }
            PromptPurpose::ExportResultCsv => {
                let result = self
                    .domain
                    .last_result
                    .as_ref()
                    .ok_or_else(|| anyhow!("Run a query that returns rows first"))?;
                write_csv(&path, result)?;
                Ok(Some(exported(&path)))
            }
            PromptPurpose::ExportSqlDump => {
                let dump = sql_dump(self.database()?)?;
                write_atomic(&path, dump.as_bytes())?;
                Ok(Some(exported(&path)))
            }
            PromptPurpose::ExportErDiagram => {
                let diagram = er_diagram(self.database()?)?;
                write_atomic(&path, diagram.as_bytes())?;
                Ok(Some(exported(&path)))
            }
            PromptPurpose::ImportRows => {
                let table = self.selected_table()?;
                let count = import_rows(self.database()?, &table, &path)?;
                self.show_table(&table)?;
                Ok(Some(Action::ShowInfo(format!(
                    "Imported {} row(s) into {}",
                    count, table
                ))))
            }
            PromptPurpose::ApplyUpdates => {
                let count = apply_updates(self.database()?, &path)?;
                if let Some(table) = self.browser.selected_table().map(String::from) {
                    self.show_table(&table)?;
                }
                Ok(Some(Action::ShowInfo(format!("Updated {} row(s)", count))))
            }
            PromptPurpose::ImportRecipeJson => {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let import = RecipeImport::from_json_str(&contents)
                    .with_context(|| format!("{} is not a recipe file", path.display()))?;
                info!(
                    path = %path.display(),
                    ingredients = import.ingredients.len(),
                    steps = import.steps.len(),
                    "imported recipe file"
                );
                self.recipe_form.apply_import(import);
                Ok(None)
            }
        }
    }

    /// Open `path`; the current database stays open if this fails
    ///
    /// Once the new database is swapped in the open always completes. A tag
    /// query with malformed rows is reported on its own.
    fn open_database(&mut self, path: &Path) -> Result<Option<Action>> {
        let database = Database::open(path)?;
        self.domain.replace_database(database);

        self.config.push_recent(path);
        if let Some(config_path) = &self.config_path {
            if let Err(e) = self.config.save_to(config_path) {
                warn!(error = %e, "could not save config");
            }
        }

        self.browser = BrowserComponent::new();
        self.console.result.clear();
        self.recipe_form = RecipeForm::new(self.config.combo_max_visible_items);
        self.status_message = Some(format!("Opened {}", path.display()));

        let follow_up = self.refresh_tables()?;
        if let Err(e) = self.load_recipe_tags() {
            self.report("Load tags", Err(e));
        }
        Ok(follow_up)
    }

    /// Fill the tag picker from the configured query
    ///
    /// A database without the recipe tables just gets an empty picker; a row
    /// that cannot become an item is an error, and the rows before it stay.
    fn load_recipe_tags(&mut self) -> Result<()> {
        let rows = match load_tag_items(self.database()?, &self.config.tag_query) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "no recipe tags loaded");
                return Ok(());
            }
        };
        let loaded = self.recipe_form.load_tags(rows);
        debug!(count = self.recipe_form.tags.len(), "loaded recipe tags");
        loaded.context("The tag query returned rows that are not items")
    }

    fn refresh_tables(&mut self) -> Result<Option<Action>> {
        let tables = self.database()?.tables()?;
        self.domain.tables = tables.clone();
        self.browser.set_tables(tables);
        Ok(self
            .browser
            .selected_table()
            .map(|t| Action::SelectTable(t.to_string())))
    }

    fn show_table(&mut self, table: &str) -> Result<()> {
        let db = self.database()?;
        let schema = db.table_schema(table)?;
        let keys = db.foreign_keys(table)?;
        let rows = db.view_table(table, self.config.row_limit)?;
        self.browser.show_table(&schema, &keys, &rows);
        self.domain.schema = schema;
        self.domain.table_data = rows;
        Ok(())
    }

    fn run_sql(&mut self, sql: &str) -> Result<Option<Action>> {
        let outcome = self.database()?.run_sql(sql)?;
        self.console.show_outcome(&outcome);
        if let QueryOutcome::Rows(result) = outcome {
            self.domain.last_result = Some(result);
        }
        // Scripts may create or drop tables
        self.refresh_tables()
    }

    fn delete_saved_query(&mut self, name: &str) -> Result<Option<Action>> {
        if self.domain.query_store.delete(name)? {
            self.saved_queries_dialog
                .set_entries(self.domain.query_store.entries());
            self.status_message = Some(format!("Deleted query '{}'", name));
        }
        Ok(None)
    }

    fn submit_recipe(&mut self) -> Result<Option<Action>> {
        let draft = self.recipe_form.draft_for_submit();
        if let Err(message) = draft.validate() {
            return Ok(Some(Action::ShowWarning(message)));
        }
        let tags = self.recipe_form.selected_tags();
        let id = insert_recipe(self.database()?, &draft, &tags)?;
        self.recipe_form.reset();

        // The first recipe creates the schema, so the tags may be new too
        if self.recipe_form.tags.is_empty() {
            self.load_recipe_tags()?;
        }
        if let Err(e) = self.refresh_tables() {
            warn!(error = %e, "could not refresh tables after saving a recipe");
        }
        Ok(Some(Action::ShowInfo(format!(
            "Recipe '{}' saved with id {}",
            draft.name.trim(),
            id
        ))))
    }
}

fn exported(path: &Path) -> Action {
    info!(path = %path.display(), "export written");
    Action::ShowInfo(format!("Wrote {}", path.display()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Help { .. } => self.help_dialog.handle_key_event(key),
            Modal::Notification { .. } => self.notification_dialog.handle_key_event(key),
            Modal::Prompt { .. } => self.prompt_dialog.handle_key_event(key),
            Modal::SavedQueries { .. } => {
                let action = self.saved_queries_dialog.handle_key_event(key)?;
                if let Some(Modal::SavedQueries { selected_index }) = self.modals.top_mut() {
                    *selected_index = self.saved_queries_dialog.selected_index;
                }
                Ok(action)
            }
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area)?,
            Modal::Help { .. } => self.help_dialog.draw(frame, area)?,
            Modal::Notification {
                severity,
                title,
                message,
            } => self
                .notification_dialog
                .draw_message(frame, area, *severity, title, message),
            Modal::Prompt { .. } => self.prompt_dialog.draw(frame, area)?,
            Modal::SavedQueries { .. } => self.saved_queries_dialog.draw(frame, area)?,
        }
        Ok(())
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let screens = Screen::all();
        let titles: Vec<String> = screens
            .iter()
            .map(|s| format!("{} {}", s.hotkey(), s.name()))
            .collect();
        let selected = screens.iter().position(|s| *s == self.screen).unwrap_or(0);

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::BOTTOM))
            .select(selected)
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![];

        match self.database_name() {
            Some(name) => spans.push(Span::styled(
                format!(" {} ", name),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            None => spans.push(Span::styled(
                " no database ",
                Style::default().fg(Color::Black).bg(Color::Red),
            )),
        }
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("{} table(s)", self.domain.tables.len()),
            Style::default().fg(Color::DarkGray),
        ));
        if let Some(message) = &self.status_message {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_bar(&self, frame: &mut Frame, area: Rect) {
        let keys: &[(&str, &str)] = match self.screen {
            Screen::Browser => &[
                ("j/k", "Tables"),
                ("Tab", "Focus"),
                ("e", "CSV"),
                ("i", "Import"),
                ("u", "Update"),
                ("s", "Dump"),
                ("d", "Diagram"),
            ],
            Screen::Console => &[
                ("F5", "Run"),
                ("Ctrl+s", "Save"),
                ("Ctrl+l", "Queries"),
                ("Ctrl+e", "Export"),
            ],
            Screen::Recipe => &[
                ("Tab", "Next field"),
                ("←/→", "Change"),
                ("Enter", "Add / open"),
                ("Ctrl+d", "Delete row"),
            ],
        };
        let global: [(&str, &str); 3] = [("Ctrl+o", "Open"), ("F1", "Help"), ("Ctrl+q", "Quit")];

        let mut spans = Vec::new();
        for (key, label) in keys.iter().chain(global.iter()) {
            spans.push(Span::styled(
                format!(" {} ", key),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(format!("{}  ", label)));
        }

        let help = Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(help, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Apply an action and every follow-up, like the main loop does
    fn dispatch(app: &mut App, action: Action) {
        let mut current = Some(action);
        while let Some(a) = current {
            current = app.update(a).unwrap();
        }
    }

    fn app_with_db() -> App {
        let mut app = App::default();
        app.config_path = None;
        let db = Database::open_in_memory().unwrap();
        crate::services::ensure_schema(&db).unwrap();
        db.connection()
            .execute_batch(
                "INSERT INTO category (id, name) VALUES (1, 'Diet');
                 INSERT INTO tag (id, name, category_id) VALUES (1, 'Vegan', 1), (2, 'Quick', NULL);",
            )
            .unwrap();
        app.domain.database = Some(db);
        app.load_recipe_tags().unwrap();
        dispatch(&mut app, Action::RefreshTables);
        app
    }

    fn top_notification(app: &App) -> Option<(Severity, String)> {
        match app.modals.top() {
            Some(Modal::Notification {
                severity, message, ..
            }) => Some((*severity, message.clone())),
            _ => None,
        }
    }

    #[test]
    fn test_function_keys_switch_screens() {
        let mut app = App::default();
        let action = app.handle_key_event(key(KeyCode::F(3))).unwrap();
        assert_eq!(action, Some(Action::SwitchScreen(Screen::Console)));
        dispatch(&mut app, action.unwrap());
        assert_eq!(app.screen, Screen::Console);
    }

    #[test]
    fn test_modal_gets_keys_first() {
        let mut app = App::default();
        let action = app.handle_key_event(ctrl('q')).unwrap().unwrap();
        dispatch(&mut app, action);
        assert_eq!(app.modals.top(), Some(&Modal::QuitConfirm));

        let action = app.handle_key_event(key(KeyCode::Char('y'))).unwrap().unwrap();
        dispatch(&mut app, action);
        assert!(app.should_quit);
    }

    #[test]
    fn test_refresh_selects_first_table() {
        let app = app_with_db();
        assert_eq!(app.browser.selected_table(), Some("category"));
        assert_eq!(app.domain.table_data.rows.len(), 1);
        assert!(app.domain.tables.contains(&"recipeTag".to_string()));
    }

    #[test]
    fn test_run_sql_keeps_last_result() {
        let mut app = app_with_db();
        dispatch(&mut app, Action::RunSql("SELECT name FROM tag ORDER BY id".to_string()));
        let result = app.domain.last_result.as_ref().unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(app.console.status(), Some("2 row(s) returned"));
    }

    #[test]
    fn test_sql_error_is_reported_and_rolled_back() {
        let mut app = app_with_db();
        dispatch(
            &mut app,
            Action::RunSql("INSERT INTO category (name) VALUES ('x'); SELECT nope;".to_string()),
        );
        let (severity, _) = top_notification(&app).unwrap();
        assert_eq!(severity, Severity::Error);

        let count: i64 = app
            .database()
            .unwrap()
            .connection()
            .query_row("SELECT COUNT(*) FROM category", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_load_query_fills_table_placeholder() {
        let mut app = app_with_db();
        dispatch(
            &mut app,
            Action::LoadQuery("SELECT COUNT(*) FROM {table_name}".to_string()),
        );
        assert_eq!(app.screen, Screen::Console);
        assert_eq!(app.console.editor.text(), "SELECT COUNT(*) FROM category");
    }

    #[test]
    fn test_failed_open_keeps_database() {
        let mut app = app_with_db();
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened as a database file
        dispatch(&mut app, Action::OpenDatabase(dir.path().to_path_buf()));
        assert!(top_notification(&app).is_some());
        assert!(app.domain.database.is_some());
        assert_eq!(app.browser.selected_table(), Some("category"));
    }

    #[test]
    fn test_bad_tag_rows_still_finish_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("second.db");
        Database::open(&path)
            .unwrap()
            .connection()
            .execute_batch("CREATE TABLE dish (id INTEGER PRIMARY KEY, name TEXT);")
            .unwrap();

        let mut app = App::default();
        app.config_path = Some(dir.path().join("config.json"));
        app.config.tag_query = "SELECT 'a', 1, 'x', 'y'".to_string();
        dispatch(&mut app, Action::OpenDatabase(path.clone()));

        match app.modals.top() {
            Some(Modal::Notification {
                severity, title, message,
            }) => {
                assert_eq!(*severity, Severity::Error);
                assert_eq!(title, "Load tags");
                assert!(message.contains("item 0"));
            }
            other => panic!("expected a notification, got {:?}", other),
        }
        assert_eq!(app.domain.database.as_ref().unwrap().path(), path.as_path());
        assert_eq!(app.domain.tables, vec!["dish".to_string()]);
        assert_eq!(app.browser.selected_table(), Some("dish"));
        assert_eq!(app.config.most_recent(), Some(path.as_path()));
        assert!(dir.path().join("config.json").exists());
    }

    #[test]
    fn test_submit_recipe_resets_form() {
        let mut app = app_with_db();
        app.screen = Screen::Recipe;
        for c in "Salad".chars() {
            app.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        app.recipe_form.tags.toggle(0);
        dispatch(&mut app, Action::SubmitRecipe);

        let (severity, message) = top_notification(&app).unwrap();
        assert_eq!(severity, Severity::Info);
        assert!(message.contains("Salad"));
        assert!(app.recipe_form.draft().name.is_empty());
        assert!(app.recipe_form.selected_tags().is_empty());

        let tagged: i64 = app
            .database()
            .unwrap()
            .connection()
            .query_row("SELECT COUNT(*) FROM recipeTag", [], |r| r.get(0))
            .unwrap();
        assert_eq!(tagged, 1);
    }

    #[test]
    fn test_invalid_recipe_warns() {
        let mut app = app_with_db();
        dispatch(&mut app, Action::SubmitRecipe);
        let (severity, message) = top_notification(&app).unwrap();
        assert_eq!(severity, Severity::Warning);
        assert_eq!(message, "Recipe name is required");
    }

    #[test]
    fn test_export_without_result_is_an_error() {
        let mut app = app_with_db();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        dispatch(&mut app, Action::OpenPrompt(PromptPurpose::ExportResultCsv));
        dispatch(&mut app, Action::SubmitPrompt(path.display().to_string()));
        let (severity, _) = top_notification(&app).unwrap();
        assert_eq!(severity, Severity::Error);
        assert!(!path.exists());
    }

    #[test]
    fn test_update_prompt_refreshes_table() {
        let mut app = app_with_db();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("updates.json");
        fs::write(
            &path,
            r#"[{"table_name": "category", "set_clause": "name = 'Veg'", "where_clause": "id = 1"}]"#,
        )
        .unwrap();

        dispatch(&mut app, Action::OpenPrompt(PromptPurpose::ApplyUpdates));
        dispatch(&mut app, Action::SubmitPrompt(path.display().to_string()));

        let (severity, message) = top_notification(&app).unwrap();
        assert_eq!(severity, Severity::Info);
        assert_eq!(message, "Updated 1 row(s)");
        assert_eq!(
            app.domain.table_data.rows[0][1],
            crate::model::query::CellValue::Text("Veg".to_string())
        );
    }

    #[test]
    fn test_sql_dump_prompt_writes_file() {
        let mut app = app_with_db();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.sql");
        dispatch(&mut app, Action::OpenPrompt(PromptPurpose::ExportSqlDump));
        dispatch(&mut app, Action::SubmitPrompt(path.display().to_string()));
        let dump = fs::read_to_string(&path).unwrap();
        assert!(dump.contains("INSERT INTO \"tag\""));
    }
}
