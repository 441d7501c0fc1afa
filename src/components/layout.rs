//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main screen layout areas
pub struct MainLayout {
    pub tabs: Rect,
    pub body: Rect,
    pub status: Rect,
    pub help: Rect,
}

/// Browser body areas
pub struct BrowserLayout {
    pub tables: Rect,
    pub schema: Rect,
    pub data: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Screen tabs on top, status and help bars at the bottom
pub fn calculate_main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    MainLayout {
        tabs: chunks[0],
        body: chunks[1],
        status: chunks[2],
        help: chunks[3],
    }
}

/// Table list on the left (20%), schema above the data grid on the right
pub fn calculate_browser_layout(body: Rect, schema_rows: usize) -> BrowserLayout {
    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(20), Constraint::Percentage(80)])
        .split(body);

    // Schema gets its rows plus borders, but never more than 40% of the pane
    let max_schema = (horizontal_chunks[1].height as usize * 2 / 5).max(3);
    let schema_height = (schema_rows + 2).clamp(3, max_schema) as u16;
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(schema_height), Constraint::Min(0)])
        .split(horizontal_chunks[1]);

    BrowserLayout {
        tables: horizontal_chunks[0],
        schema: right_chunks[0],
        data: right_chunks[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_layout_fills_area() {
        let layout = calculate_main_layout(Rect::new(0, 0, 100, 40));
        assert_eq!(layout.tabs.height, 3);
        assert_eq!(layout.body.height, 33);
        assert_eq!(layout.help.y, 37);
    }

    #[test]
    fn test_schema_height_is_capped() {
        let layout = calculate_browser_layout(Rect::new(0, 0, 100, 30), 50);
        assert_eq!(layout.schema.height, 12);
        assert_eq!(layout.data.height, 18);

        let layout = calculate_browser_layout(Rect::new(0, 0, 100, 30), 2);
        assert_eq!(layout.schema.height, 4);
    }

    #[test]
    fn test_centered_popup_clamps() {
        let popup = centered_popup(Rect::new(0, 0, 20, 10), 40, 5);
        assert_eq!(popup, Rect::new(0, 2, 20, 5));
    }
}
