//! Database browser screen
//!
//! Table list on the left; the selected table's schema and first rows on
//! the right. Owns list navigation; the App loads data on `SelectTable`.

use crate::action::Action;
use crate::component::Component;
use crate::components::layout::calculate_browser_layout;
use crate::components::TableComponent;
use crate::model::modal::PromptPurpose;
use crate::model::query::{ColumnInfo, ForeignKey, QueryResult};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFocus {
    Tables,
    Data,
}

pub struct BrowserComponent {
    tables: Vec<String>,
    pub list_state: ListState,
    schema_lines: Vec<Line<'static>>,
    pub data: TableComponent,
    pub focus: BrowserFocus,
}

impl Default for BrowserComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserComponent {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            list_state: ListState::default(),
            schema_lines: Vec::new(),
            data: TableComponent::new(" Data "),
            focus: BrowserFocus::Tables,
        }
    }

    /// Replace the table list, keeping the selection on the same name if it
    /// still exists
    pub fn set_tables(&mut self, tables: Vec<String>) {
        let previous = self.selected_table().map(String::from);
        self.tables = tables;
        let index = previous
            .and_then(|name| self.tables.iter().position(|t| *t == name))
            .or(if self.tables.is_empty() { None } else { Some(0) });
        self.list_state.select(index);
        if index.is_none() {
            self.schema_lines.clear();
            self.data.clear();
        }
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.list_state
            .selected()
            .and_then(|i| self.tables.get(i))
            .map(|s| s.as_str())
    }

    /// Show a table's schema, foreign keys and rows
    pub fn show_table(&mut self, columns: &[ColumnInfo], keys: &[ForeignKey], rows: &QueryResult) {
        self.schema_lines = build_schema_lines(columns, keys);
        self.data.set_result(rows);
    }

    fn select_index(&mut self, index: Option<usize>) -> Option<Action> {
        self.list_state.select(index);
        self.selected_table()
            .map(|name| Action::SelectTable(name.to_string()))
    }

    pub fn next(&mut self) -> Option<Action> {
        if self.tables.is_empty() {
            return None;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.tables.len() - 1),
            None => 0,
        };
        self.select_index(Some(i))
    }

    pub fn previous(&mut self) -> Option<Action> {
        if self.tables.is_empty() {
            return None;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.select_index(Some(i))
    }

    pub fn select_first(&mut self) -> Option<Action> {
        if self.tables.is_empty() {
            return None;
        }
        self.select_index(Some(0))
    }

    pub fn select_last(&mut self) -> Option<Action> {
        if self.tables.is_empty() {
            return None;
        }
        self.select_index(Some(self.tables.len() - 1))
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            BrowserFocus::Tables => BrowserFocus::Data,
            BrowserFocus::Data => BrowserFocus::Tables,
        };
        self.data.set_focused(self.focus == BrowserFocus::Data);
    }
}

fn build_schema_lines(columns: &[ColumnInfo], keys: &[ForeignKey]) -> Vec<Line<'static>> {
    let name_width = columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let type_width = columns.iter().map(|c| c.data_type.len()).max().unwrap_or(0);

    let mut lines: Vec<Line> = columns
        .iter()
        .map(|column| {
            let mut spans = vec![
                Span::styled(
                    format!("{:<width$}  ", column.name, width = name_width),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<width$}", column.data_type, width = type_width),
                    Style::default().fg(Color::Cyan),
                ),
            ];
            if column.is_primary_key() {
                spans.push(Span::styled(" PK", Style::default().fg(Color::Yellow)));
            }
            if column.not_null {
                spans.push(Span::styled(" NOT NULL", Style::default().fg(Color::Magenta)));
            }
            if let Some(default) = &column.default_value {
                spans.push(Span::styled(
                    format!(" DEFAULT {}", default),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            if let Some(key) = keys.iter().find(|k| k.from == column.name) {
                spans.push(Span::styled(
                    format!(
                        " → {}({})",
                        key.parent_table,
                        key.to.as_deref().unwrap_or("rowid")
                    ),
                    Style::default().fg(Color::Green),
                ));
            }
            Line::from(spans)
        })
        .collect();

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No columns",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

impl Component for BrowserComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Tab {
            self.toggle_focus();
            return Ok(None);
        }

        let shared = match key.code {
            KeyCode::Char('r') => Some(Action::RefreshTables),
            KeyCode::Char('e') => Some(Action::OpenPrompt(PromptPurpose::ExportTableCsv)),
            KeyCode::Char('i') => Some(Action::OpenPrompt(PromptPurpose::ImportRows)),
            KeyCode::Char('u') => Some(Action::OpenPrompt(PromptPurpose::ApplyUpdates)),
            KeyCode::Char('s') => Some(Action::OpenPrompt(PromptPurpose::ExportSqlDump)),
            KeyCode::Char('d') => Some(Action::OpenPrompt(PromptPurpose::ExportErDiagram)),
            _ => None,
        };
        if shared.is_some() {
            return Ok(shared);
        }

        match self.focus {
            BrowserFocus::Data => self.data.handle_key_event(key),
            BrowserFocus::Tables => {
                let action = match key.code {
                    KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
                    KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
                    KeyCode::Char('g') | KeyCode::Home => Some(Action::FirstItem),
                    KeyCode::Char('G') | KeyCode::End => Some(Action::LastItem),
                    KeyCode::Enter => self
                        .selected_table()
                        .map(|t| Action::SelectTable(t.to_string())),
                    _ => None,
                };
                Ok(action)
            }
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let follow_up = match action {
            Action::NextItem => self.next(),
            Action::PrevItem => self.previous(),
            Action::FirstItem => self.select_first(),
            Action::LastItem => self.select_last(),
            Action::ScrollUp | Action::ScrollDown | Action::PageUp | Action::PageDown => {
                self.data.update(action)?
            }
            _ => None,
        };
        Ok(follow_up)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_browser_layout(area, self.schema_lines.len());

        let tables_border = if self.focus == BrowserFocus::Tables {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let items: Vec<ListItem> = self
            .tables
            .iter()
            .map(|t| ListItem::new(Line::from(t.clone())))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Tables ({}) ", self.tables.len()))
                    .border_style(Style::default().fg(tables_border)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, layout.tables, &mut self.list_state);

        let schema_title = match self.selected_table() {
            Some(table) => format!(" Schema: {} ", table),
            None => " Schema ".to_string(),
        };
        frame.render_widget(
            Paragraph::new(self.schema_lines.clone()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(schema_title)
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
            layout.schema,
        );

        self.data.draw(frame, layout.data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn browser() -> BrowserComponent {
        let mut browser = BrowserComponent::new();
        browser.set_tables(vec![
            "category".to_string(),
            "recipe".to_string(),
            "tag".to_string(),
        ]);
        browser
    }

    #[test]
    fn test_navigation_selects_table() {
        let mut browser = browser();
        assert_eq!(browser.selected_table(), Some("category"));
        assert_eq!(
            browser.update(Action::NextItem).unwrap(),
            Some(Action::SelectTable("recipe".to_string()))
        );
        assert_eq!(
            browser.update(Action::LastItem).unwrap(),
            Some(Action::SelectTable("tag".to_string()))
        );
        browser.update(Action::NextItem).unwrap();
        assert_eq!(browser.selected_table(), Some("tag"));
    }

    #[test]
    fn test_set_tables_keeps_selection_by_name() {
        let mut browser = browser();
        browser.update(Action::NextItem).unwrap();
        browser.set_tables(vec!["image".to_string(), "recipe".to_string()]);
        assert_eq!(browser.selected_table(), Some("recipe"));

        browser.set_tables(Vec::new());
        assert_eq!(browser.selected_table(), None);
        assert_eq!(browser.update(Action::NextItem).unwrap(), None);
    }

    #[test]
    fn test_tab_moves_keys_to_grid() {
        let mut browser = browser();
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        browser.handle_key_event(tab).unwrap();
        assert_eq!(browser.focus, BrowserFocus::Data);

        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(browser.handle_key_event(down).unwrap(), Some(Action::ScrollDown));
    }

    #[test]
    fn test_schema_lines_mark_keys() {
        let columns = vec![ColumnInfo {
            cid: 0,
            name: "category_id".to_string(),
            data_type: "INTEGER".to_string(),
            not_null: false,
            default_value: None,
            primary_key: 0,
        }];
        let keys = vec![ForeignKey {
            from: "category_id".to_string(),
            parent_table: "category".to_string(),
            to: Some("id".to_string()),
        }];
        let lines = build_schema_lines(&columns, &keys);
        let text: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.ends_with("→ category(id)"));
    }
}
