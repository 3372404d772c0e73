//! Single-line text prompt shown as a centered overlay.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::theme;

#[derive(Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    Pending,
    Submitted(String),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Prompt {
    title: String,
    value: String,
}

impl Prompt {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: String::new(),
        }
    }

    /// Pre-filled with `value`, e.g. the filter being edited.
    pub fn with_value(title: impl Into<String>, value: &str) -> Self {
        Self {
            title: title.into(),
            value: value.to_owned(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptOutcome {
        match key.code {
            KeyCode::Esc => PromptOutcome::Cancelled,
            KeyCode::Enter => PromptOutcome::Submitted(self.value.trim().to_owned()),
            KeyCode::Backspace => {
                self.value.pop();
                PromptOutcome::Pending
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.clear();
                PromptOutcome::Pending
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(c);
                PromptOutcome::Pending
            }
            _ => PromptOutcome::Pending,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rect = super::centered(area, 60, 5);
        frame.render_widget(Clear, rect);

        let block = Block::default()
            .title(Line::from(Span::styled(
                format!(" {} ", self.title),
                theme::title(),
            )))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(true))
            .style(Style::default().bg(theme::BG_PANEL));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let text = vec![
            Line::from(vec![
                Span::styled(" › ", theme::key_hint_key()),
                Span::styled(self.value(), theme::value()),
                Span::styled("█", theme::value()),
            ]),
            Line::from(vec![
                Span::styled(" Enter ", theme::key_hint_key()),
                Span::styled("submit  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(prompt: &mut Prompt, s: &str) {
        for c in s.chars() {
            assert_eq!(prompt.handle_key(key(KeyCode::Char(c))), PromptOutcome::Pending);
        }
    }

    #[test]
    fn typing_and_submit_trims() {
        let mut prompt = Prompt::new("Add domain");
        type_str(&mut prompt, " example.comx ");
        prompt.handle_key(key(KeyCode::Backspace));
        prompt.handle_key(key(KeyCode::Backspace));
        type_str(&mut prompt, " ");
        assert_eq!(
            prompt.handle_key(key(KeyCode::Enter)),
            PromptOutcome::Submitted("example.com".into())
        );
    }

    #[test]
    fn ctrl_u_clears_and_esc_cancels() {
        let mut prompt = Prompt::with_value("Filter", "abc");
        prompt.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(prompt.value(), "");
        assert_eq!(prompt.handle_key(key(KeyCode::Esc)), PromptOutcome::Cancelled);
    }
}
