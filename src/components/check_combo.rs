//! Multi-select dropdown with live filtering
//!
//! A single-line control showing the checked labels (or a placeholder). When
//! opened, a popup lists every item as a checkbox (multi-select) or radio
//! (single-select) row, filtered by a case-insensitive substring typed by the
//! user.
//!
//! Items are append-only and paired 1:1 with their toggle state. Observers
//! registered with [`CheckCombo::on_selection_changed`] are called once per
//! selection change, after all toggles have been updated.

use crate::action::Action;
use crate::component::Component;
use crate::model::item::{Item, ItemShapeError, ItemSpec, ItemValue};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Cut `text` to at most `max_width` cells, ending in `…` when shortened
pub fn elide_right(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    out
}

/// Check state of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Toggle {
    checked: bool,
    visible: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    item: Item,
    toggle: Toggle,
}

pub type SelectionListener = Box<dyn FnMut(&[ItemValue])>;

pub struct CheckCombo {
    placeholder: String,
    max_visible_items: usize,
    multi_select: bool,
    entries: Vec<Entry>,
    filter_text: String,
    display_text: String,
    control_width: u16,
    popup_open: bool,
    popup_height: usize,
    /// Position within the visible rows
    highlight: usize,
    scroll: usize,
    focused: bool,
    listeners: Vec<SelectionListener>,
}

impl CheckCombo {
    pub fn new(placeholder: &str, max_visible_items: usize, multi_select: bool) -> Self {
        let mut combo = Self {
            placeholder: placeholder.to_string(),
            max_visible_items: max_visible_items.max(1),
            multi_select,
            entries: Vec::new(),
            filter_text: String::new(),
            display_text: String::new(),
            control_width: 0,
            popup_open: false,
            popup_height: 0,
            highlight: 0,
            scroll: 0,
            focused: false,
            listeners: Vec::new(),
        };
        combo.update_display_text();
        combo
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| e.toggle.checked)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| e.toggle.visible)
    }

    /// Register an observer of the ordered selected values
    pub fn on_selection_changed(&mut self, listener: impl FnMut(&[ItemValue]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Append one item; `value` defaults to the label
    pub fn add_item(&mut self, label: &str, value: Option<ItemValue>, tooltip: Option<&str>) {
        let item = Item {
            label: label.to_string(),
            value: value.unwrap_or_else(|| ItemValue::from(label)),
            tooltip: tooltip.map(String::from),
        };
        let visible = matches_filter(&item.label, &self.filter_text);
        self.entries.push(Entry {
            item,
            toggle: Toggle {
                checked: false,
                visible,
            },
        });
        self.recompute_popup_height();
    }

    /// Append items of any well-formed shape
    pub fn add_items<I, T>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemSpec>,
    {
        for item in items {
            match item.into() {
                ItemSpec::Label(label) => self.add_item(&label, None, None),
                ItemSpec::LabelValue(label, value) => self.add_item(&label, Some(value), None),
                ItemSpec::LabelValueTooltip(label, value, tooltip) => {
                    self.add_item(&label, Some(value), Some(&tooltip))
                }
            }
        }
    }

    /// Append items from a dynamic source, stopping at the first malformed one
    ///
    /// Items before the offending element stay added; the error names its
    /// index.
    pub fn try_add_items<I, T>(&mut self, items: I) -> Result<(), ItemShapeError>
    where
        I: IntoIterator<Item = T>,
        T: TryInto<ItemSpec, Error = ItemShapeError>,
    {
        for (index, item) in items.into_iter().enumerate() {
            let spec = item.try_into().map_err(|e| e.at(index))?;
            self.add_items([spec]);
        }
        Ok(())
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Show only items whose label contains `text`, ignoring case
    ///
    /// Hidden items keep their checked state.
    pub fn filter(&mut self, text: &str) {
        self.filter_text = text.to_string();
        for entry in &mut self.entries {
            entry.toggle.visible = matches_filter(&entry.item.label, text);
        }
        self.highlight = 0;
        self.scroll = 0;
        self.recompute_popup_height();
    }

    pub fn visible_count(&self) -> usize {
        self.entries.iter().filter(|e| e.toggle.visible).count()
    }

    /// Rows the popup list currently shows
    pub fn popup_height(&self) -> usize {
        self.popup_height
    }

    fn recompute_popup_height(&mut self) {
        self.popup_height = self.visible_count().min(self.max_visible_items);
    }

    /// Values of the checked items, in insertion order
    pub fn selected_values(&self) -> Vec<ItemValue> {
        self.entries
            .iter()
            .filter(|e| e.toggle.checked)
            .map(|e| e.item.value.clone())
            .collect()
    }

    /// Check exactly the items whose value is in `values`
    ///
    /// In single-select mode only the last match (in insertion order) is
    /// checked, and a match closes the popup like a click would.
    pub fn set_selected_values(&mut self, values: &[ItemValue]) {
        let last_match = self
            .entries
            .iter()
            .rposition(|e| values.contains(&e.item.value));
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.toggle.checked = if self.multi_select {
                values.contains(&entry.item.value)
            } else {
                Some(i) == last_match
            };
        }
        if !self.multi_select && last_match.is_some() {
            self.popup_open = false;
        }
        self.update_display_text();
        self.emit();
    }

    pub fn clear_selection(&mut self) {
        for entry in &mut self.entries {
            entry.toggle.checked = false;
        }
        self.update_display_text();
        self.emit();
    }

    /// Flip the toggle of item `index`, as a click would
    pub fn toggle(&mut self, index: usize) {
        let Some(entry) = self.entries.get_mut(index) else {
            return;
        };
        entry.toggle.checked = !entry.toggle.checked;
        let now_checked = entry.toggle.checked;

        if !self.multi_select && now_checked {
            for (i, other) in self.entries.iter_mut().enumerate() {
                if i != index {
                    other.toggle.checked = false;
                }
            }
            self.popup_open = false;
        }

        self.update_display_text();
        self.emit();
    }

    fn emit(&mut self) {
        let values = self.selected_values();
        for listener in &mut self.listeners {
            listener(&values);
        }
    }

    /// Text shown in the closed control
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// Control width changed; only the displayed text is recomputed
    pub fn resize(&mut self, width: u16) {
        self.control_width = width;
        self.update_display_text();
    }

    fn update_display_text(&mut self) {
        let labels: Vec<&str> = self
            .entries
            .iter()
            .filter(|e| e.toggle.checked)
            .map(|e| e.item.label.as_str())
            .collect();
        let full = if labels.is_empty() {
            self.placeholder.clone()
        } else {
            labels.join(", ")
        };
        if self.control_width == 0 {
            // Not laid out yet
            self.display_text = full;
            return;
        }
        // Borders and the dropdown marker take four cells
        let available = (self.control_width as usize).saturating_sub(4).max(1);
        self.display_text = elide_right(&full, available);
    }

    pub fn is_open(&self) -> bool {
        self.popup_open
    }

    pub fn open_popup(&mut self) {
        self.popup_open = true;
        self.highlight = 0;
        self.scroll = 0;
    }

    pub fn close_popup(&mut self) {
        self.popup_open = false;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn visible_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.toggle.visible)
            .map(|(i, _)| i)
            .collect()
    }

    fn highlighted_index(&self) -> Option<usize> {
        self.visible_indices().get(self.highlight).copied()
    }

    fn move_highlight(&mut self, down: bool) {
        let count = self.visible_count();
        if count == 0 {
            return;
        }
        if down {
            self.highlight = (self.highlight + 1).min(count - 1);
        } else {
            self.highlight = self.highlight.saturating_sub(1);
        }
        if self.highlight < self.scroll {
            self.scroll = self.highlight;
        } else if self.highlight >= self.scroll + self.popup_height {
            self.scroll = self.highlight + 1 - self.popup_height;
        }
    }

    fn draw_control(&mut self, frame: &mut Frame, area: Rect) {
        if area.width != self.control_width {
            self.resize(area.width);
        }

        let text_style = if self.selected_values().is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        let border_style = if self.focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let marker = if self.popup_open { "▴" } else { "▾" };

        let text_width = area.width.saturating_sub(4) as usize;
        let padded = format!("{:<width$}", self.display_text, width = text_width);
        let control = Paragraph::new(Line::from(vec![
            Span::styled(padded, text_style),
            Span::styled(marker, Style::default().fg(Color::Cyan)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" Tags "),
        );
        frame.render_widget(control, area);
    }

    fn draw_popup(&self, frame: &mut Frame, anchor: Rect) {
        let bounds = frame.area();
        let list_rows = self.popup_height.max(1) as u16;
        // Filter line, list, footer and borders
        let wanted = list_rows + 4;
        let below = bounds.bottom().saturating_sub(anchor.bottom());
        let above = anchor.y.saturating_sub(bounds.y);
        let (y, height) = if below >= wanted || below >= above {
            (anchor.bottom(), wanted.min(below))
        } else {
            let height = wanted.min(above);
            (anchor.y - height, height)
        };
        let popup_area = Rect::new(anchor.x, y, anchor.width, height);
        if popup_area.height < 3 {
            return;
        }

        frame.render_widget(Clear, popup_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(if self.multi_select {
                " Select tags "
            } else {
                " Select a tag "
            });
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let filter_line = Line::from(vec![
            Span::styled("Filter: ", Style::default().fg(Color::Yellow)),
            Span::styled(self.filter_text.clone(), Style::default().fg(Color::White)),
            Span::styled("█", Style::default().fg(Color::Gray)),
        ]);
        frame.render_widget(Paragraph::new(filter_line), chunks[0]);

        let visible = self.visible_indices();
        let row_width = chunks[1].width as usize;
        let rows: Vec<Line> = if visible.is_empty() {
            vec![Line::from(Span::styled(
                "No matching tags",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            visible
                .iter()
                .enumerate()
                .skip(self.scroll)
                .take(self.popup_height)
                .map(|(pos, &index)| {
                    let entry = &self.entries[index];
                    let mark = match (self.multi_select, entry.toggle.checked) {
                        (true, true) => "[x] ",
                        (true, false) => "[ ] ",
                        (false, true) => "(•) ",
                        (false, false) => "( ) ",
                    };
                    let text = elide_right(
                        &format!("{}{}", mark, entry.item.label),
                        row_width,
                    );
                    let style = if pos == self.highlight {
                        Style::default()
                            .bg(Color::Blue)
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD)
                    } else if entry.toggle.checked {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    Line::from(Span::styled(
                        format!("{:<width$}", text, width = row_width),
                        style,
                    ))
                })
                .collect()
        };
        frame.render_widget(Paragraph::new(rows), chunks[1]);

        let footer = match self
            .highlighted_index()
            .and_then(|i| self.entries[i].item.tooltip.as_deref())
        {
            Some(tooltip) => Span::styled(tooltip.to_string(), Style::default().fg(Color::Cyan)),
            None => Span::styled(
                "Space toggle  ^X clear  Esc close",
                Style::default().fg(Color::DarkGray),
            ),
        };
        frame.render_widget(Paragraph::new(Line::from(footer)), chunks[2]);
    }
}

fn matches_filter(label: &str, filter: &str) -> bool {
    filter.is_empty() || label.to_lowercase().contains(&filter.to_lowercase())
}

impl Component for CheckCombo {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if !self.popup_open {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down) {
                self.open_popup();
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc => self.close_popup(),
            KeyCode::Up => self.move_highlight(false),
            KeyCode::Down => self.move_highlight(true),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(index) = self.highlighted_index() {
                    self.toggle(index);
                }
            }
            KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.clear_selection();
            }
            KeyCode::Backspace => {
                let mut text = self.filter_text.clone();
                text.pop();
                self.filter(&text);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let text = format!("{}{}", self.filter_text, c);
                self.filter(&text);
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.draw_control(frame, area);
        if self.popup_open {
            self.draw_popup(frame, area);
        }
        Ok(())
    }
}
