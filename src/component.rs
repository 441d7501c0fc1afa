//! Component trait
//!
//! Screens, widgets and dialogs all implement it. The App routes key events
//! to whichever one has focus and feeds the returned Actions back through
//! `update` until none is left.

use crate::action::Action;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

/// Trait for UI components
///
/// 1. `handle_key_event` turns a key into an Action, or handles it locally
///    when the effect stays inside the component (typing, cursor moves)
/// 2. `update` applies an Action and may return a follow-up one
/// 3. `draw` renders into the given area
pub trait Component {
    /// Called once before the first draw
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
