//! Saved queries dialog
//!
//! Lists the queries saved beside the open database followed by the
//! predefined ones, with a highlighted preview of the selected SQL.

use crate::action::Action;
use crate::component::Component;
use crate::components::sql_highlight::highlight_sql;
use crate::services::QuerySource;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// One listed query
#[derive(Debug, Clone)]
pub struct QueryEntry {
    pub source: QuerySource,
    pub name: String,
    pub sql: String,
}

pub struct SavedQueriesDialog {
    pub entries: Vec<QueryEntry>,
    pub selected_index: usize,
    pub list_state: ListState,
}

impl Default for SavedQueriesDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl SavedQueriesDialog {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            entries: Vec::new(),
            selected_index: 0,
            list_state,
        }
    }

    pub fn set_entries(&mut self, entries: Vec<(QuerySource, String, String)>) {
        self.entries = entries
            .into_iter()
            .map(|(source, name, sql)| QueryEntry { source, name, sql })
            .collect();
        self.selected_index = self
            .selected_index
            .min(self.entries.len().saturating_sub(1));
        self.list_state.select(Some(self.selected_index));
    }

    pub fn selected(&self) -> Option<&QueryEntry> {
        self.entries.get(self.selected_index)
    }

    fn select_next(&mut self) {
        if self.selected_index + 1 < self.entries.len() {
            self.selected_index += 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }
}

impl Component for SavedQueriesDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseModal),
            KeyCode::Enter => self.selected().map(|e| Action::LoadQuery(e.sql.clone())),
            KeyCode::Delete | KeyCode::Char('d') => match self.selected() {
                Some(entry) if entry.source == QuerySource::Saved => {
                    Some(Action::DeleteSavedQuery(entry.name.clone()))
                }
                Some(_) => Some(Action::ShowWarning(
                    "Predefined queries cannot be deleted.".to_string(),
                )),
                None => None,
            },
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_width = 80u16.min(area.width.saturating_sub(4));
        let popup_height = 24u16.min(area.height.saturating_sub(4));
        let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);
        frame.render_widget(Clear, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(popup_area);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                let (marker, color) = match entry.source {
                    QuerySource::Saved => ("● ", Color::Green),
                    QuerySource::Predefined => ("◆ ", Color::Magenta),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(color)),
                    Span::styled(entry.name.clone(), Style::default().fg(Color::White)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Queries ")
                    .title_style(
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD),
                    ),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

        let preview = match self.selected() {
            Some(entry) => highlight_sql(&entry.sql),
            None => vec![Line::from(Span::styled(
                "No queries",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        frame.render_widget(
            Paragraph::new(preview).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" SQL ")
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
            chunks[1],
        );

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Yellow)),
            Span::raw("Load  "),
            Span::styled(" Del ", Style::default().fg(Color::Red)),
            Span::raw("Delete  "),
            Span::styled(" j/k ", Style::default().fg(Color::Cyan)),
            Span::raw("Navigate  "),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
            Span::raw("Close"),
        ]))
        .alignment(ratatui::layout::Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[2]);

        Ok(())
    }
}
