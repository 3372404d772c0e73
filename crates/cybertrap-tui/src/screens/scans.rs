//! Scans screen: individual scans, scan groups, and a details pane with
//! result links for the selected scan.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Wrap};

use cybertrap_core::view::{MultiScanField, ScanField};
use cybertrap_core::{ALL_TEMPLATES, EntityId, MultiScan, Resource, Scan};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::format_timestamp;
use crate::widgets::prompt::{Prompt, PromptOutcome};
use crate::widgets::table_pane::{Columns, TablePane};

/// `f` cycles through these; the empty string clears the filter.
const STATUS_FILTERS: [&str; 6] = ["", "pending", "in-progress", "completed", "failed", "canceled"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Scans,
    Groups,
}

#[derive(Debug, Clone)]
enum Detail {
    Closed,
    Loading(EntityId),
    Loaded(Arc<Scan>),
    Failed { id: EntityId, message: String },
}

pub struct ScansScreen {
    focused: bool,
    pane: Pane,
    scans: TablePane<Scan>,
    groups: TablePane<MultiScan>,
    detail: Detail,
    filter: Option<Prompt>,
}

fn templates_label(scan: &Scan) -> String {
    if scan.covers_all_templates() {
        ALL_TEMPLATES.to_owned()
    } else {
        scan.template_ids
            .iter()
            .map(EntityId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl ScansScreen {
    pub fn new(page_size: usize) -> Self {
        Self {
            focused: false,
            pane: Pane::Scans,
            scans: TablePane::new(page_size),
            groups: TablePane::new(page_size),
            detail: Detail::Closed,
            filter: None,
        }
    }

    fn cycle_status_filter(&mut self) {
        let current = self.scans.filter(ScanField::Status);
        let next = STATUS_FILTERS
            .iter()
            .position(|s| *s == current)
            .map_or(0, |i| (i + 1) % STATUS_FILTERS.len());
        self.scans.set_filter(ScanField::Status, STATUS_FILTERS[next]);
    }

    fn open_detail(&mut self) -> Option<Action> {
        if self.pane != Pane::Scans {
            return None;
        }
        let id = self.scans.selected()?.id.clone();
        self.detail = Detail::Loading(id.clone());
        Some(Action::OpenScanDetail(id))
    }

    fn apply_filter(&mut self, value: &str) {
        match self.pane {
            Pane::Scans => self.scans.set_filter(ScanField::Domain, value),
            Pane::Groups => self.groups.set_filter(MultiScanField::Name, value),
        }
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Scan details ", theme::title()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(false))
            .title_bottom(Line::from(vec![
                Span::styled(" Esc ", theme::key_hint_key()),
                Span::styled("close ", theme::key_hint()),
            ]));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = match &self.detail {
            Detail::Closed => return,
            Detail::Loading(id) => vec![Line::from(Span::styled(
                format!(" Loading scan {id}…"),
                theme::key_hint(),
            ))],
            Detail::Failed { id, message } => vec![Line::from(Span::styled(
                format!(" Could not load scan {id}: {message}"),
                Style::default().fg(theme::ERR_RED),
            ))],
            Detail::Loaded(scan) => detail_lines(scan),
        };
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

fn field(label: &'static str, value: Span<'static>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {label:<10}"), theme::label()),
        value,
    ])
}

fn detail_lines(scan: &Scan) -> Vec<Line<'static>> {
    let mut lines = vec![
        field("ID", Span::styled(scan.id.to_string(), theme::value())),
        field("Domain", Span::styled(scan.domain.clone(), theme::value())),
        field("Templates", Span::styled(templates_label(scan), theme::value())),
        field(
            "Status",
            Span::styled(scan.status.to_string(), theme::scan_status(&scan.status)),
        ),
        field("Date", Span::styled(format_timestamp(scan.scan_date), theme::value())),
    ];
    if let Some(error) = &scan.error {
        lines.push(field(
            "Error",
            Span::styled(error.clone(), Style::default().fg(theme::ERR_RED)),
        ));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Results", theme::title())));
    match scan.result_urls.as_deref() {
        Some(urls) if !urls.is_empty() => {
            lines.extend(
                urls.iter()
                    .map(|u| Line::from(Span::styled(format!("  {u}"), theme::value()))),
            );
        }
        _ => lines.push(Line::from(Span::styled("  (none yet)", theme::key_hint()))),
    }
    lines
}

impl Component for ScansScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(prompt) = self.filter.as_mut() {
            match prompt.handle_key(key) {
                PromptOutcome::Pending => {}
                PromptOutcome::Cancelled => self.filter = None,
                PromptOutcome::Submitted(value) => {
                    self.filter = None;
                    self.apply_filter(&value);
                }
            }
            return Ok(None);
        }

        let moved = match self.pane {
            Pane::Scans => self.scans.handle_nav_key(key.code),
            Pane::Groups => self.groups.handle_nav_key(key.code),
        };
        if moved {
            return Ok(None);
        }

        Ok(match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.pane = match self.pane {
                    Pane::Scans => Pane::Groups,
                    Pane::Groups => Pane::Scans,
                };
                None
            }
            KeyCode::Enter => self.open_detail(),
            KeyCode::Esc => {
                self.detail = Detail::Closed;
                None
            }
            KeyCode::Char('f') => {
                self.cycle_status_filter();
                None
            }
            KeyCode::Char('/') => {
                self.filter = Some(match self.pane {
                    Pane::Scans => {
                        Prompt::with_value("Filter scans by domain", self.scans.filter(ScanField::Domain))
                    }
                    Pane::Groups => Prompt::with_value(
                        "Filter groups by name",
                        self.groups.filter(MultiScanField::Name),
                    ),
                });
                None
            }
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ScansUpdated(items) => self.scans.set_items(items.clone()),
            Action::MultiScansUpdated(items) => self.groups.set_items(items.clone()),
            Action::LoadStateChanged(Resource::Scans, state) => {
                self.scans.set_load_state(state.clone());
            }
            Action::LoadStateChanged(Resource::MultiScans, state) => {
                self.groups.set_load_state(state.clone());
            }
            Action::ScanDetailLoaded(scan) => {
                if matches!(&self.detail, Detail::Loading(id) if *id == scan.id) {
                    self.detail = Detail::Loaded(Arc::clone(scan));
                }
            }
            Action::ScanDetailFailed { id, message } => {
                if matches!(&self.detail, Detail::Loading(pending) if pending == id) {
                    self.detail = Detail::Failed {
                        id: id.clone(),
                        message: message.clone(),
                    };
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
                .areas(area);
        let (table_area, detail_area) = if matches!(self.detail, Detail::Closed) {
            (left, None)
        } else {
            let [top, bottom] =
                Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
                    .areas(left);
            (top, Some(bottom))
        };

        self.scans.render(
            frame,
            table_area,
            "Scans",
            self.focused && self.pane == Pane::Scans,
            &Columns {
                header: &["Domain", "Templates", "Status", "Date"],
                widths: &[
                    Constraint::Fill(2),
                    Constraint::Fill(2),
                    Constraint::Length(12),
                    Constraint::Length(17),
                ],
            },
            |s| {
                Row::new(vec![
                    Cell::from(s.domain.clone()),
                    Cell::from(templates_label(s)),
                    Cell::from(Span::styled(s.status.to_string(), theme::scan_status(&s.status))),
                    Cell::from(format_timestamp(s.scan_date)),
                ])
            },
        );

        if let Some(detail_area) = detail_area {
            self.render_detail(frame, detail_area);
        }

        self.groups.render(
            frame,
            right,
            "Scan groups",
            self.focused && self.pane == Pane::Groups,
            &Columns {
                header: &["Name", "Status", "Done"],
                widths: &[
                    Constraint::Fill(1),
                    Constraint::Length(12),
                    Constraint::Length(9),
                ],
            },
            |g| {
                Row::new(vec![
                    Cell::from(g.name.clone()),
                    Cell::from(Span::styled(g.status.as_str().to_owned(), theme::multi_status(&g.status))),
                    Cell::from(format!("{}/{}", g.completed_scans, g.total_scans)),
                ])
            },
        );

        if let Some(prompt) = &self.filter {
            prompt.render(frame, area);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.filter.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use cybertrap_core::ScanStatus;
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn scan(id: &str, status: ScanStatus) -> Arc<Scan> {
        Arc::new(Scan {
            id: EntityId::from(id),
            domain_id: EntityId::from("d1"),
            domain: format!("{id}.example.com"),
            template_ids: Vec::new(),
            scan_date: None,
            status,
            error: None,
            result_urls: None,
        })
    }

    fn screen() -> ScansScreen {
        let mut s = ScansScreen::new(10);
        s.update(&Action::ScansUpdated(Arc::new(vec![
            scan("s1", ScanStatus::Completed),
            scan("s2", ScanStatus::Failed),
        ])))
        .unwrap();
        s
    }

    fn visible(s: &ScansScreen) -> Vec<String> {
        s.scans.rows().iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn status_filter_cycles_and_clears() {
        let mut s = screen();
        for _ in 0..3 {
            s.handle_key_event(key(KeyCode::Char('f'))).unwrap();
        }
        assert_eq!(s.scans.filter(ScanField::Status), "completed");
        assert_eq!(visible(&s), vec!["s1"]);

        s.handle_key_event(key(KeyCode::Char('f'))).unwrap();
        assert_eq!(visible(&s), vec!["s2"]);

        s.handle_key_event(key(KeyCode::Char('f'))).unwrap();
        s.handle_key_event(key(KeyCode::Char('f'))).unwrap();
        assert_eq!(s.scans.filter(ScanField::Status), "");
        assert_eq!(visible(&s), vec!["s1", "s2"]);
    }

    #[test]
    fn detail_loads_for_the_requested_scan_only() {
        let mut s = screen();
        let action = s.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(action, Some(Action::OpenScanDetail(ref id)) if id.as_str() == "s1"));

        s.update(&Action::ScanDetailLoaded(scan("s2", ScanStatus::Failed)))
            .unwrap();
        assert!(matches!(s.detail, Detail::Loading(_)));

        s.update(&Action::ScanDetailLoaded(scan("s1", ScanStatus::Completed)))
            .unwrap();
        assert!(matches!(s.detail, Detail::Loaded(ref sc) if sc.id.as_str() == "s1"));

        s.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(matches!(s.detail, Detail::Closed));
    }

    #[test]
    fn all_templates_label() {
        let s = scan("s1", ScanStatus::Pending);
        assert_eq!(templates_label(&s), ALL_TEMPLATES);
    }

    #[test]
    fn result_urls_listed_in_details() {
        let mut s = (*scan("s1", ScanStatus::Completed)).clone();
        s.result_urls = Some(vec!["https://r.example.com/1.json".into()]);
        let text: Vec<String> = detail_lines(&s).iter().map(ToString::to_string).collect();
        assert!(text.iter().any(|l| l.contains("https://r.example.com/1.json")));
    }
}
