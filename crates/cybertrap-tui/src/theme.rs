//! Palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};

use cybertrap_core::{MultiScanStatus, ScanStatus};

pub const ACCENT: Color = Color::Rgb(255, 140, 66); // #ff8c42
pub const TEAL: Color = Color::Rgb(94, 234, 212); // #5eead4
pub const OK_GREEN: Color = Color::Rgb(74, 222, 128); // #4ade80
pub const WARN_AMBER: Color = Color::Rgb(251, 191, 36); // #fbbf24
pub const ERR_RED: Color = Color::Rgb(248, 113, 113); // #f87171

pub const TEXT: Color = Color::Rgb(212, 212, 216); // #d4d4d8
pub const MUTED: Color = Color::Rgb(113, 113, 122); // #71717a
pub const BG_ROW: Color = Color::Rgb(39, 39, 42); // #27272a
pub const BG_PANEL: Color = Color::Rgb(24, 24, 27); // #18181b

pub fn title() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

pub fn border(focused: bool) -> Style {
    Style::default().fg(if focused { ACCENT } else { MUTED })
}

pub fn table_header() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

pub fn table_row() -> Style {
    Style::default().fg(TEXT)
}

pub fn table_cursor() -> Style {
    Style::default()
        .fg(ACCENT)
        .bg(BG_ROW)
        .add_modifier(Modifier::BOLD)
}

pub fn tab(active: bool) -> Style {
    if active {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT)
    }
}

pub fn key_hint() -> Style {
    Style::default().fg(MUTED)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

pub fn label() -> Style {
    Style::default().fg(MUTED)
}

pub fn value() -> Style {
    Style::default().fg(TEXT)
}

pub fn selected_marker() -> Style {
    Style::default().fg(OK_GREEN).add_modifier(Modifier::BOLD)
}

pub fn scan_status(status: &ScanStatus) -> Style {
    let fg = match status {
        ScanStatus::Completed => OK_GREEN,
        ScanStatus::Failed | ScanStatus::Canceled => ERR_RED,
        ScanStatus::Pending | ScanStatus::InProgress => WARN_AMBER,
        ScanStatus::Unknown(_) => MUTED,
    };
    Style::default().fg(fg)
}

pub fn multi_status(status: &MultiScanStatus) -> Style {
    let fg = match status {
        MultiScanStatus::Pass => OK_GREEN,
        MultiScanStatus::Fail => ERR_RED,
        MultiScanStatus::InProgress => WARN_AMBER,
        MultiScanStatus::Unknown(_) => MUTED,
    };
    Style::default().fg(fg)
}
