//! The [`Component`] trait every screen implements.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::action::Action;

/// Lifecycle: (`handle_key_event` | `update` | `render`)*.
///
/// Components never talk to the controller; they return actions and
/// receive store updates through [`update`](Component::update).
pub trait Component: Send {
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// React to a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    fn set_focused(&mut self, _focused: bool) {}

    /// While true, every key except Ctrl+C goes straight to the component
    /// (text prompts).
    fn captures_input(&self) -> bool {
        false
    }
}
