//! Help dialog component
//!
//! Displays all keyboard shortcuts available in the application.

use crate::action::Action;
use crate::component::Component;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Help dialog showing all keyboard shortcuts
#[derive(Default)]
pub struct HelpDialog {
    pub scroll_offset: usize,
}

impl Component for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::F(1) => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                None
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        // Clear the area
        frame.render_widget(Clear, area);

        let margin = 4;
        let dialog_area = Rect::new(
            margin,
            margin,
            area.width.saturating_sub(margin * 2),
            area.height.saturating_sub(margin * 2),
        );

        let content = build_help_content();
        let total = content.len();
        let visible_height = dialog_area.height.saturating_sub(2) as usize;

        // Clamp scroll offset
        let max_scroll = total.saturating_sub(visible_height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let paragraph = Paragraph::new(content.clone())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Shortcuts ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .scroll((self.scroll_offset as u16, 0));

        frame.render_widget(paragraph, dialog_area);

        // Render scrollbar if content exceeds visible area
        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(self.scroll_offset);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                dialog_area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

/// Build the help content with all keyboard shortcuts
fn build_help_content() -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    // Helper to add a section header
    let add_section = |lines: &mut Vec<Line<'static>>, title: &str| {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} ", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(title.len() + 2)),
            Style::default().fg(Color::DarkGray),
        )));
    };

    // Helper to add a shortcut line
    let add_shortcut = |lines: &mut Vec<Line<'static>>, key: &str, description: &str| {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:14}", key),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(description.to_string(), Style::default().fg(Color::White)),
        ]));
    };

    add_section(&mut lines, "Global");
    add_shortcut(&mut lines, "F1", "Show this help");
    add_shortcut(&mut lines, "F2", "Database browser");
    add_shortcut(&mut lines, "F3", "SQL console");
    add_shortcut(&mut lines, "F4", "New recipe form");
    add_shortcut(&mut lines, "Ctrl+n", "Next screen");
    add_shortcut(&mut lines, "Ctrl+o", "Open a database file");
    add_shortcut(&mut lines, "Ctrl+q", "Quit");

    add_section(&mut lines, "Browser");
    add_shortcut(&mut lines, "j / ↓", "Next table (or row in the grid)");
    add_shortcut(&mut lines, "k / ↑", "Previous table (or row in the grid)");
    add_shortcut(&mut lines, "g / G", "First / last table");
    add_shortcut(&mut lines, "Tab", "Switch between table list and grid");
    add_shortcut(&mut lines, "h / l", "Scroll grid columns");
    add_shortcut(&mut lines, "r", "Reload table list");
    add_shortcut(&mut lines, "e", "Export table to CSV");
    add_shortcut(&mut lines, "i", "Import CSV or JSON rows into table");
    add_shortcut(&mut lines, "u", "Apply updates from a JSON file");
    add_shortcut(&mut lines, "s", "Export SQL dump");
    add_shortcut(&mut lines, "d", "Export ER diagram");

    add_section(&mut lines, "SQL Console");
    add_shortcut(&mut lines, "F5 / Ctrl+r", "Run the script");
    add_shortcut(&mut lines, "Ctrl+s", "Save the script as a named query");
    add_shortcut(&mut lines, "Ctrl+l", "Saved and predefined queries");
    add_shortcut(&mut lines, "Ctrl+e", "Export last result to CSV");
    add_shortcut(&mut lines, "PgUp / PgDn", "Scroll the result grid");

    add_section(&mut lines, "Saved Queries");
    add_shortcut(&mut lines, "Enter", "Load into the editor");
    add_shortcut(&mut lines, "Del", "Delete a saved query");

    add_section(&mut lines, "Recipe Form");
    add_shortcut(&mut lines, "Tab", "Next field");
    add_shortcut(&mut lines, "Shift+Tab", "Previous field");
    add_shortcut(&mut lines, "← / →", "Change rating or number of people");
    add_shortcut(&mut lines, "Enter", "Add list entry / open tags / save");
    add_shortcut(&mut lines, "Ctrl+d", "Delete highlighted list entry");
    add_shortcut(&mut lines, "Space", "Grab / drop an image (Esc cancels)");

    add_section(&mut lines, "Tag Picker");
    add_shortcut(&mut lines, "type", "Filter tags");
    add_shortcut(&mut lines, "↑ / ↓", "Move highlight");
    add_shortcut(&mut lines, "Space/Enter", "Toggle highlighted tag");
    add_shortcut(&mut lines, "Ctrl+x", "Clear selection");
    add_shortcut(&mut lines, "Esc", "Close picker");

    // Footer
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press q, Esc, or F1 to close",
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_help_lists_every_screen_key() {
        let text: String = build_help_content()
            .iter()
            .flat_map(|line| line.spans.iter().map(|s| s.content.to_string()))
            .collect();
        for key in ["F2", "F3", "F4", "Ctrl+x"] {
            assert!(text.contains(key), "missing {}", key);
        }
    }

    #[test]
    fn test_help_closes_on_f1() {
        let mut dialog = HelpDialog::default();
        let action = dialog
            .handle_key_event(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE))
            .unwrap();
        assert_eq!(action, Some(Action::CloseModal));
    }
}
