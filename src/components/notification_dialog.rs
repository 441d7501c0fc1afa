//! Message box for errors, warnings and results

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::modal::Severity;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Default)]
pub struct NotificationDialog;

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

impl NotificationDialog {
    pub fn draw_message(
        &self,
        frame: &mut Frame,
        area: Rect,
        severity: Severity,
        title: &str,
        message: &str,
    ) {
        let width = 64.min(area.width.saturating_sub(4));
        let text_width = width.saturating_sub(4).max(1) as usize;
        // Rough wrapped height, one extra line per overflowing source line
        let body_lines: usize = message
            .lines()
            .map(|l| l.chars().count() / text_width + 1)
            .sum();
        let height = (body_lines as u16 + 5).min(area.height.saturating_sub(2));
        let popup_area = centered_popup(area, width, height);
        frame.render_widget(Clear, popup_area);

        let color = severity_color(severity);
        let mut lines: Vec<Line> = vec![Line::from("")];
        lines.extend(message.lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" Enter/Esc ", Style::default().fg(color)),
            Span::styled("Close", Style::default().fg(Color::DarkGray)),
        ]));

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(format!(" {} ", title))
                    .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
            );
        frame.render_widget(paragraph, popup_area);
    }
}

impl Component for NotificationDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char(' ') => {
                Some(Action::CloseModal)
            }
            _ => None,
        };
        Ok(action)
    }

    /// Drawn through [`NotificationDialog::draw_message`]
    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        Ok(())
    }
}
