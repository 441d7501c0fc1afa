//! Single-line text prompt
//!
//! Asks for a file path or a query name. Up/Down walk through suggestions
//! (recent files for the open-database prompt).

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::modal::PromptPurpose;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub struct PromptDialog {
    purpose: PromptPurpose,
    input: String,
    suggestions: Vec<String>,
    suggestion_index: Option<usize>,
}

impl Default for PromptDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptDialog {
    pub fn new() -> Self {
        Self {
            purpose: PromptPurpose::OpenDatabase,
            input: String::new(),
            suggestions: Vec::new(),
            suggestion_index: None,
        }
    }

    /// Reset for a new question with an initial value
    pub fn open(&mut self, purpose: PromptPurpose, initial: &str, suggestions: Vec<String>) {
        self.purpose = purpose;
        self.input = initial.to_string();
        self.suggestions = suggestions;
        self.suggestion_index = None;
    }

    pub fn purpose(&self) -> PromptPurpose {
        self.purpose
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    fn cycle_suggestion(&mut self, forward: bool) {
        if self.suggestions.is_empty() {
            return;
        }
        let last = self.suggestions.len() - 1;
        let next = match (self.suggestion_index, forward) {
            (None, true) => 0,
            (None, false) => last,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.suggestion_index = Some(next);
        self.input = self.suggestions[next].clone();
    }
}

impl Component for PromptDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => {
                let value = self.input.trim();
                if value.is_empty() {
                    None
                } else {
                    Some(Action::SubmitPrompt(value.to_string()))
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
                None
            }
            KeyCode::Up => {
                self.cycle_suggestion(false);
                None
            }
            KeyCode::Down => {
                self.cycle_suggestion(true);
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
        let shown_suggestions = self.suggestions.len().min(5) as u16;
        let height = 7 + shown_suggestions;
        let popup_area = centered_popup(area, 70.min(area.width.saturating_sub(4)), height);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", self.purpose.title()))
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                self.purpose.label().to_string(),
                Style::default().fg(Color::Yellow),
            )),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(self.input.clone(), Style::default().fg(Color::White)),
                Span::styled("█", Style::default().fg(Color::Gray)),
            ])),
            chunks[1],
        );

        if shown_suggestions > 0 {
            let lines: Vec<Line> = self
                .suggestions
                .iter()
                .take(shown_suggestions as usize)
                .enumerate()
                .map(|(i, s)| {
                    let style = if Some(i) == self.suggestion_index {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    Line::from(Span::styled(format!("  {}", s), style))
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), chunks[3]);
        }

        let help = Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Yellow)),
            Span::raw("Confirm  "),
            Span::styled(" ↑/↓ ", Style::default().fg(Color::Cyan)),
            Span::raw("Recent  "),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
            Span::raw("Cancel"),
        ]);
        frame.render_widget(
            Paragraph::new(help).alignment(ratatui::layout::Alignment::Center),
            chunks[4],
        );
        Ok(())
    }
}
