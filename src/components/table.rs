//! Result grid
//!
//! Renders a `QueryResult` with headers, aligned columns and a scrollbar.
//! Used for the browser's table data and the console's query output.

use crate::action::Action;
use crate::component::Component;
use crate::components::check_combo::elide_right;
use crate::model::query::QueryResult;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Widest a column may get, in cells
const MAX_COLUMN_WIDTH: usize = 40;

/// Lines above the first data row (header and separator)
const HEADER_LINES: usize = 2;

/// Scrollable grid of query results
pub struct TableComponent {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    scroll: usize,
    horizontal_scroll: usize,
    focused: bool,
}

impl Default for TableComponent {
    fn default() -> Self {
        Self::new(" Result ")
    }
}

impl TableComponent {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            headers: Vec::new(),
            rows: Vec::new(),
            scroll: 0,
            horizontal_scroll: 0,
            focused: false,
        }
    }

    pub fn set_result(&mut self, result: &QueryResult) {
        self.headers = result.headers.clone();
        self.rows = result.display_rows();
        self.scroll = 0;
        self.horizontal_scroll = 0;
    }

    pub fn clear(&mut self) {
        self.headers.clear();
        self.rows.clear();
        self.scroll = 0;
        self.horizontal_scroll = 0;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.width());
                }
            }
        }
        for width in &mut widths {
            *width = (*width).clamp(1, MAX_COLUMN_WIDTH);
        }
        widths
    }

    fn cell_span(text: &str, width: usize, style: Style) -> Span<'static> {
        let text = elide_right(&text.replace('\n', " "), width);
        let padding = width.saturating_sub(text.width());
        Span::styled(format!("{}{}", text, " ".repeat(padding)), style)
    }

    /// Grid as lines, starting at the horizontally scrolled column
    pub fn build_lines(&self) -> Vec<Line<'static>> {
        if self.headers.is_empty() {
            return vec![Line::from(Span::styled(
                "No data",
                Style::default().fg(Color::DarkGray),
            ))];
        }

        let widths = self.column_widths();
        let first = self.horizontal_scroll.min(widths.len().saturating_sub(1));
        let mut lines = Vec::with_capacity(self.rows.len() + HEADER_LINES);

        let header_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let header_spans: Vec<Span> = self.headers[first..]
            .iter()
            .zip(&widths[first..])
            .flat_map(|(h, w)| [Self::cell_span(h, *w, header_style), Span::raw(" │ ")])
            .collect();
        lines.push(Line::from(header_spans));

        let separator = widths[first..]
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        lines.push(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        )));

        for row in &self.rows {
            let spans: Vec<Span> = row
                .iter()
                .zip(&widths)
                .skip(first)
                .flat_map(|(cell, w)| {
                    let style = if cell == "NULL" {
                        Style::default().fg(Color::DarkGray)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    [Self::cell_span(cell, *w, style), Span::raw(" │ ")]
                })
                .collect();
            lines.push(Line::from(spans));
        }

        lines
    }
}

impl Component for TableComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollUp),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::PageDown)
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::PageUp)
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.horizontal_scroll = self.horizontal_scroll.saturating_sub(1);
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.horizontal_scroll + 1 < self.headers.len() {
                    self.horizontal_scroll += 1;
                }
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let max_scroll = self.rows.len().saturating_sub(1);
        match action {
            Action::ScrollDown => {
                self.scroll = (self.scroll + 1).min(max_scroll);
            }
            Action::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            Action::PageDown => {
                self.scroll = (self.scroll + 10).min(max_scroll);
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let mut content = self.build_lines();
        let visible_height = area.height.saturating_sub(2) as usize;

        // Keep the header pinned while rows scroll
        let body: Vec<Line> = if content.len() > HEADER_LINES {
            let rows = content.split_off(HEADER_LINES);
            content
                .into_iter()
                .chain(rows.into_iter().skip(self.scroll))
                .collect()
        } else {
            content
        };

        let border_color = if self.focused {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let title = format!("{}({} rows) ", self.title, self.row_count());
        let paragraph = Paragraph::new(body).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border_color)),
        );
        frame.render_widget(paragraph, area);

        let total = self.rows.len() + HEADER_LINES;
        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(self.rows.len().saturating_sub(1)).position(self.scroll);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::query::CellValue;

    fn result() -> QueryResult {
        QueryResult {
            headers: vec!["id".to_string(), "name".to_string()],
            rows: vec![
                vec![CellValue::Integer(1), CellValue::Text("Vegan".to_string())],
                vec![CellValue::Integer(2), CellValue::Null],
            ],
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_build_lines() {
        let mut table = TableComponent::default();
        table.set_result(&result());
        let lines = table.build_lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(line_text(&lines[0]), "id │ name  │ ");
        assert_eq!(line_text(&lines[3]), "2  │ NULL  │ ");
    }

    #[test]
    fn test_long_cells_are_elided() {
        let mut table = TableComponent::default();
        table.set_result(&QueryResult {
            headers: vec!["text".to_string()],
            rows: vec![vec![CellValue::Text("x".repeat(100))]],
        });
        let lines = table.build_lines();
        let cell = line_text(&lines[2]);
        assert!(cell.starts_with(&format!("{}…", "x".repeat(MAX_COLUMN_WIDTH - 1))));
    }

    #[test]
    fn test_scroll_clamped() {
        let mut table = TableComponent::default();
        table.set_result(&result());
        for _ in 0..5 {
            table.update(Action::ScrollDown).unwrap();
        }
        assert_eq!(table.scroll, 1);
        table.update(Action::PageUp).unwrap();
        assert_eq!(table.scroll, 0);
    }

    #[test]
    fn test_empty_table() {
        let table = TableComponent::default();
        assert_eq!(line_text(&table.build_lines()[0]), "No data");
    }
}
