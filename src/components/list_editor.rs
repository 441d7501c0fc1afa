//! Input line plus list, used for ingredients, steps and images
//!
//! Enter adds the typed text, Ctrl+d deletes the highlighted row. A
//! reorderable editor also supports keyboard drag and drop: Space grabs the
//! highlighted row (when the input is empty), Up/Down move the drop marker,
//! Space drops and Esc cancels.

use crate::action::Action;
use crate::component::Component;
use crate::model::recipe::move_item;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::fmt::Display;

pub const EMPTY_INPUT_WARNING: &str = "Please enter text to add.";
pub const NO_SELECTION_WARNING: &str = "Please select an item to delete.";

/// A row being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grab {
    from: usize,
    /// Insertion point in `0..=len`
    drop_row: usize,
}

pub struct ListEditor<T> {
    title: String,
    input: String,
    items: Vec<T>,
    list_state: ListState,
    reorderable: bool,
    grab: Option<Grab>,
    focused: bool,
}

impl<T> ListEditor<T>
where
    T: From<String> + Display,
{
    pub fn new(title: &str, reorderable: bool) -> Self {
        Self {
            title: title.to_string(),
            input: String::new(),
            items: Vec::new(),
            list_state: ListState::default(),
            reorderable,
            grab: None,
            focused: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn is_grabbing(&self) -> bool {
        self.grab.is_some()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.grab = None;
        }
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.extend(items);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.input.clear();
        self.grab = None;
        self.list_state.select(None);
    }

    /// Add the trimmed input as a new row
    pub fn add_from_input(&mut self) -> Result<(), &'static str> {
        let text = self.input.trim();
        if text.is_empty() {
            return Err(EMPTY_INPUT_WARNING);
        }
        self.items.push(T::from(text.to_string()));
        self.input.clear();
        self.list_state.select(Some(self.items.len() - 1));
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<T, &'static str> {
        let index = self
            .list_state
            .selected()
            .filter(|&i| i < self.items.len())
            .ok_or(NO_SELECTION_WARNING)?;
        let removed = self.items.remove(index);
        let next = if self.items.is_empty() {
            None
        } else {
            Some(index.min(self.items.len() - 1))
        };
        self.list_state.select(next);
        Ok(removed)
    }

    fn move_highlight(&mut self, down: bool) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() - 1;
        let next = match (self.list_state.selected(), down) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.list_state.select(Some(next));
    }

    pub fn start_grab(&mut self) -> bool {
        match self.list_state.selected() {
            Some(from) if self.reorderable && from < self.items.len() => {
                self.grab = Some(Grab {
                    from,
                    drop_row: from,
                });
                true
            }
            _ => false,
        }
    }

    fn move_drop_marker(&mut self, down: bool) {
        let len = self.items.len();
        if let Some(grab) = &mut self.grab {
            grab.drop_row = if down {
                (grab.drop_row + 1).min(len)
            } else {
                grab.drop_row.saturating_sub(1)
            };
        }
    }

    /// Drop the grabbed row at the marker
    pub fn finish_grab(&mut self) {
        if let Some(grab) = self.grab.take() {
            if let Some(to) = move_item(&mut self.items, grab.from, grab.drop_row) {
                self.list_state.select(Some(to));
            }
        }
    }

    pub fn cancel_grab(&mut self) {
        self.grab = None;
    }

    fn handle_grab_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.move_drop_marker(false),
            KeyCode::Down => self.move_drop_marker(true),
            KeyCode::Char(' ') | KeyCode::Enter => self.finish_grab(),
            KeyCode::Esc => self.cancel_grab(),
            _ => {}
        }
    }

    fn row_lines(&self) -> Vec<ListItem<'static>> {
        let marker = || {
            ListItem::new(Line::from(Span::styled(
                "──── drop here ────",
                Style::default().fg(Color::Yellow),
            )))
        };
        let mut rows = Vec::with_capacity(self.items.len() + 1);
        for (i, item) in self.items.iter().enumerate() {
            if self.grab.is_some_and(|g| g.drop_row == i) {
                rows.push(marker());
            }
            let grabbed = self.grab.is_some_and(|g| g.from == i);
            let style = if grabbed {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)
            } else {
                Style::default().fg(Color::White)
            };
            rows.push(ListItem::new(Line::from(Span::styled(
                format!("{}. {}", i + 1, item),
                style,
            ))));
        }
        if self.grab.is_some_and(|g| g.drop_row == self.items.len()) {
            rows.push(marker());
        }
        rows
    }
}

impl<T> Component for ListEditor<T>
where
    T: From<String> + Display,
{
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.grab.is_some() {
            self.handle_grab_key(key);
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Enter => self
                .add_from_input()
                .err()
                .map(|w| Action::ShowWarning(w.to_string())),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => self
                .delete_selected()
                .err()
                .map(|w| Action::ShowWarning(w.to_string())),
            KeyCode::Up => {
                self.move_highlight(false);
                None
            }
            KeyCode::Down => {
                self.move_highlight(true);
                None
            }
            KeyCode::Char(' ') if self.reorderable && self.input.is_empty() => {
                self.start_grab();
                None
            }
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let border_color = if self.focused {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ({}) ", self.title, self.items.len()))
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let mut input_spans = vec![
            Span::styled("+ ", Style::default().fg(Color::Green)),
            Span::styled(self.input.clone(), Style::default().fg(Color::White)),
        ];
        if self.focused && self.grab.is_none() {
            input_spans.push(Span::styled("█", Style::default().fg(Color::Gray)));
        }
        frame.render_widget(Paragraph::new(Line::from(input_spans)), chunks[0]);

        // The drop marker shifts rows below it, so highlight is only shown
        // outside a drag
        let mut state = if self.grab.is_some() {
            ListState::default()
        } else {
            self.list_state.clone()
        };
        let list = List::new(self.row_lines()).highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_stateful_widget(list, chunks[1], &mut state);
        if self.grab.is_none() {
            self.list_state = state;
        }
        Ok(())
    }
}
