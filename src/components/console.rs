//! SQL console screen
//!
//! A multi-line editor with syntax highlighting above the result grid.
//! The whole editor content runs as one script.

use crate::action::Action;
use crate::component::Component;
use crate::components::sql_highlight::highlight_sql;
use crate::components::TableComponent;
use crate::model::modal::PromptPurpose;
use crate::model::query::QueryOutcome;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Plain multi-line text buffer with a cursor
#[derive(Debug, Clone)]
pub struct SqlEditor {
    lines: Vec<String>,
    row: usize,
    /// Cursor column in chars
    col: usize,
}

impl Default for SqlEditor {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }
}

impl SqlEditor {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(String::from).collect();
        self.row = self.lines.len() - 1;
        self.col = self.lines[self.row].chars().count();
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn byte_col(&self) -> usize {
        let line = &self.lines[self.row];
        line.char_indices()
            .nth(self.col)
            .map_or(line.len(), |(i, _)| i)
    }

    fn line_chars(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_col();
        self.lines[self.row].insert(at, c);
        self.col += 1;
    }

    pub fn insert_newline(&mut self) {
        let at = self.byte_col();
        let rest = self.lines[self.row].split_off(at);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            let at = self.byte_col();
            self.lines[self.row].remove(at);
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_chars(self.row);
            self.lines[self.row].push_str(&line);
        }
    }

    pub fn delete(&mut self) {
        if self.col < self.line_chars(self.row) {
            let at = self.byte_col();
            self.lines[self.row].remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_chars(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_chars(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_chars(self.row));
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_chars(self.row));
        }
    }

    pub fn home(&mut self) {
        self.col = 0;
    }

    pub fn end(&mut self) {
        self.col = self.line_chars(self.row);
    }

    /// Display width of the text left of the cursor
    fn cursor_x(&self) -> usize {
        self.lines[self.row][..self.byte_col()].width()
    }
}

pub struct ConsoleComponent {
    pub editor: SqlEditor,
    pub result: TableComponent,
    status: Option<(String, bool)>,
    editor_scroll: usize,
}

impl Default for ConsoleComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleComponent {
    pub fn new() -> Self {
        Self {
            editor: SqlEditor::default(),
            result: TableComponent::new(" Result "),
            status: None,
            editor_scroll: 0,
        }
    }

    /// Show what a script produced
    pub fn show_outcome(&mut self, outcome: &QueryOutcome) {
        match outcome {
            QueryOutcome::Rows(result) => {
                self.result.set_result(result);
                self.status = Some((format!("{} row(s) returned", result.rows.len()), false));
            }
            QueryOutcome::Affected(count) => {
                self.result.clear();
                self.status = Some((format!("{} row(s) affected", count), false));
            }
        }
    }

    pub fn show_error(&mut self, message: &str) {
        self.status = Some((message.to_string(), true));
    }

    #[cfg(test)]
    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(s, _)| s.as_str())
    }
}

impl Component for ConsoleComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::F(5) => Some(Action::RunSql(self.editor.text())),
            KeyCode::Char('r') if ctrl => Some(Action::RunSql(self.editor.text())),
            KeyCode::Char('s') if ctrl => Some(Action::OpenPrompt(PromptPurpose::SaveQueryName)),
            KeyCode::Char('l') if ctrl => Some(Action::OpenSavedQueries),
            KeyCode::Char('e') if ctrl => Some(Action::OpenPrompt(PromptPurpose::ExportResultCsv)),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::Char(c) if !ctrl => {
                self.editor.insert_char(c);
                None
            }
            KeyCode::Tab => {
                for _ in 0..4 {
                    self.editor.insert_char(' ');
                }
                None
            }
            KeyCode::Enter => {
                self.editor.insert_newline();
                None
            }
            KeyCode::Backspace => {
                self.editor.backspace();
                None
            }
            KeyCode::Delete => {
                self.editor.delete();
                None
            }
            KeyCode::Left => {
                self.editor.move_left();
                None
            }
            KeyCode::Right => {
                self.editor.move_right();
                None
            }
            KeyCode::Up => {
                self.editor.move_up();
                None
            }
            KeyCode::Down => {
                self.editor.move_down();
                None
            }
            KeyCode::Home => {
                self.editor.home();
                None
            }
            KeyCode::End => {
                self.editor.end();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::LoadQuery(sql) => {
                self.editor.set_text(&sql);
                Ok(None)
            }
            Action::ScrollUp | Action::ScrollDown | Action::PageUp | Action::PageDown => {
                self.result.update(action)
            }
            _ => Ok(None),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Length(1),
                Constraint::Min(3),
            ])
            .split(area);

        let editor_area = chunks[0];
        let visible = editor_area.height.saturating_sub(2) as usize;
        let (row, _) = self.editor.cursor();
        if row < self.editor_scroll {
            self.editor_scroll = row;
        } else if visible > 0 && row >= self.editor_scroll + visible {
            self.editor_scroll = row + 1 - visible;
        }

        let editor = Paragraph::new(highlight_sql(&self.editor.text()))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" SQL (F5 run) ")
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .scroll((self.editor_scroll as u16, 0));
        frame.render_widget(editor, editor_area);

        let cursor_x = editor_area.x + 1 + self.editor.cursor_x() as u16;
        let cursor_y = editor_area.y + 1 + (row - self.editor_scroll) as u16;
        if cursor_x < editor_area.right() && cursor_y < editor_area.bottom() {
            frame.set_cursor_position(Position::new(cursor_x, cursor_y));
        }

        let status = match &self.status {
            Some((text, true)) => Span::styled(text.clone(), Style::default().fg(Color::Red)),
            Some((text, false)) => Span::styled(text.clone(), Style::default().fg(Color::Green)),
            None => Span::styled(
                "Ctrl+s save  Ctrl+l queries  Ctrl+e export",
                Style::default().fg(Color::DarkGray),
            ),
        };
        frame.render_widget(Paragraph::new(Line::from(status)), chunks[1]);

        self.result.draw(frame, chunks[2])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::query::QueryResult;

    #[test]
    fn test_editor_typing_and_newlines() {
        let mut editor = SqlEditor::default();
        for c in "SELECT 1;".chars() {
            editor.insert_char(c);
        }
        editor.insert_newline();
        for c in "SELECT 2;".chars() {
            editor.insert_char(c);
        }
        assert_eq!(editor.text(), "SELECT 1;\nSELECT 2;");
        assert_eq!(editor.cursor(), (1, 9));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut editor = SqlEditor::default();
        editor.set_text("ab\ncd");
        editor.home();
        editor.backspace();
        assert_eq!(editor.text(), "abcd");
        assert_eq!(editor.cursor(), (0, 2));
    }

    #[test]
    fn test_multibyte_editing() {
        let mut editor = SqlEditor::default();
        editor.set_text("'crème'");
        for _ in 0..3 {
            editor.move_left();
        }
        editor.backspace();
        assert_eq!(editor.text(), "'crme'");
        editor.delete();
        assert_eq!(editor.text(), "'cre'");
    }

    #[test]
    fn test_vertical_moves_clamp_column() {
        let mut editor = SqlEditor::default();
        editor.set_text("SELECT *\nFROM t");
        editor.move_up();
        assert_eq!(editor.cursor(), (0, 6));
        editor.end();
        editor.move_down();
        assert_eq!(editor.cursor(), (1, 6));
    }

    #[test]
    fn test_run_key_sends_whole_script() {
        let mut console = ConsoleComponent::new();
        console.editor.set_text("SELECT 1;\nSELECT 2;");
        let action = console
            .handle_key_event(KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE))
            .unwrap();
        assert_eq!(action, Some(Action::RunSql("SELECT 1;\nSELECT 2;".to_string())));
    }

    #[test]
    fn test_outcome_status() {
        let mut console = ConsoleComponent::new();
        console.show_outcome(&QueryOutcome::Affected(3));
        assert_eq!(console.status(), Some("3 row(s) affected"));
        console.show_outcome(&QueryOutcome::Rows(QueryResult::default()));
        assert_eq!(console.status(), Some("0 row(s) returned"));
    }
}
