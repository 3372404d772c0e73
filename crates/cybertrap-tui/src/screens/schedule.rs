//! Schedule screen: existing scheduled scans on the left, the schedule
//! form (one domain or all, templates, date) on the right.

use chrono::{Local, NaiveDate};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row};

use cybertrap_core::command::requests::SCHEDULE_DATE_FORMAT;
use cybertrap_core::view::{DomainField, ScheduleField, ScheduleRow, TemplateField};
use cybertrap_core::{
    ALL_DOMAINS, ALL_TEMPLATES, Choice, Command, Domain, EntityId, Resource, ScheduleForm,
    Selection, Template,
};

use crate::action::{Action, ConfirmAction, Toast};
use crate::component::Component;
use crate::theme;
use crate::widgets::prompt::{Prompt, PromptOutcome};
use crate::widgets::table_pane::{Columns, TablePane};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Schedules,
    Domains,
    Templates,
}

impl Pane {
    fn next(self) -> Self {
        match self {
            Self::Schedules => Self::Domains,
            Self::Domains => Self::Templates,
            Self::Templates => Self::Schedules,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Date,
    Filter,
}

pub struct ScheduleScreen {
    focused: bool,
    pane: Pane,
    rows: TablePane<ScheduleRow>,
    domains: TablePane<Domain>,
    templates: TablePane<Template>,
    form: ScheduleForm,
    prompt: Option<(PromptKind, Prompt)>,
    /// Reset the form once the schedule request lands.
    submitting: bool,
}

/// `YYYY-MM-DD`, today or later. Blank clears the date.
fn parse_date(raw: &str, today: NaiveDate) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(raw, SCHEDULE_DATE_FORMAT)
        .map_err(|_| format!("{raw:?} is not a date (expected YYYY-MM-DD)"))?;
    if date < today {
        return Err(format!("{date} is in the past"));
    }
    Ok(Some(date))
}

fn templates_label(row: &ScheduleRow) -> String {
    if row.scan.scan_all || row.scan.template_ids.is_empty() {
        ALL_TEMPLATES.to_owned()
    } else {
        row.scan
            .template_ids
            .iter()
            .map(EntityId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn error(message: impl Into<String>) -> Option<Action> {
    Some(Action::Notify(Toast::error(message)))
}

impl ScheduleScreen {
    pub fn new(page_size: usize) -> Self {
        Self {
            focused: false,
            pane: Pane::Schedules,
            rows: TablePane::new(page_size),
            domains: TablePane::new(page_size),
            templates: TablePane::new(page_size),
            form: ScheduleForm::new(),
            prompt: None,
            submitting: false,
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        let prompt = match kind {
            PromptKind::Date => {
                let current = self
                    .form
                    .date
                    .map(|d| d.format(SCHEDULE_DATE_FORMAT).to_string())
                    .unwrap_or_default();
                Prompt::with_value("Scan date (YYYY-MM-DD)", &current)
            }
            PromptKind::Filter => match self.pane {
                Pane::Schedules => {
                    Prompt::with_value("Filter by domain", self.rows.filter(ScheduleField::Domain))
                }
                Pane::Domains => {
                    Prompt::with_value("Filter domains", self.domains.filter(DomainField::Domain))
                }
                Pane::Templates => {
                    Prompt::with_value("Filter templates", self.templates.filter(TemplateField::Name))
                }
            },
        };
        self.prompt = Some((kind, prompt));
    }

    fn submit_prompt(&mut self, kind: PromptKind, value: &str) -> Option<Action> {
        match kind {
            PromptKind::Date => match parse_date(value, Local::now().date_naive()) {
                Ok(date) => {
                    self.form.set_date(date);
                    None
                }
                Err(e) => error(e),
            },
            PromptKind::Filter => {
                match self.pane {
                    Pane::Schedules => self.rows.set_filter(ScheduleField::Domain, value),
                    Pane::Domains => self.domains.set_filter(DomainField::Domain, value),
                    Pane::Templates => self.templates.set_filter(TemplateField::Name, value),
                }
                None
            }
        }
    }

    fn pick_under_cursor(&mut self) -> Option<Action> {
        let result = match self.pane {
            Pane::Schedules => return None,
            Pane::Domains => {
                let id = self.domains.selected()?.id.clone();
                self.form.pick_domain(id)
            }
            Pane::Templates => {
                let id = self.templates.selected()?.id.clone();
                self.form.toggle_template(id)
            }
        };
        result.err().and_then(|e| error(e.to_string()))
    }

    fn toggle_all(&mut self) -> Option<Action> {
        match self.pane {
            Pane::Schedules => None,
            Pane::Domains => {
                self.form.toggle_all_domains();
                None
            }
            Pane::Templates => self
                .form
                .toggle_all_templates()
                .err()
                .and_then(|e| error(e.to_string())),
        }
    }

    fn submit(&mut self) -> Option<Action> {
        match self.form.submission() {
            Ok(request) => {
                self.submitting = true;
                Some(Action::Execute(Command::ScheduleScan(request)))
            }
            Err(e) => error(e.to_string()),
        }
    }

    fn delete_selected(&self) -> Option<Action> {
        if self.pane != Pane::Schedules {
            return None;
        }
        let row = self.rows.selected()?;
        Some(Action::ShowConfirm(ConfirmAction::DeleteScheduledScan {
            id: row.scan.id.clone(),
            label: row.domain.clone(),
        }))
    }

    fn form_summary(&self) -> Vec<Line<'static>> {
        let domain = match &self.form.domain {
            Choice::None => "—".to_owned(),
            Choice::All => ALL_DOMAINS.to_owned(),
            Choice::One(id) => self
                .domains
                .items()
                .iter()
                .find(|d| d.id == *id)
                .map_or_else(|| id.to_string(), |d| d.name.clone()),
        };
        let templates = if self.form.templates_enabled() {
            match &self.form.templates {
                Selection::None => "—".to_owned(),
                Selection::All => ALL_TEMPLATES.to_owned(),
                Selection::Explicit(ids) => format!("{} selected", ids.len()),
            }
        } else {
            ALL_TEMPLATES.to_owned()
        };
        let date = self
            .form
            .date
            .map_or_else(|| "— (press t)".to_owned(), |d| d.format(SCHEDULE_DATE_FORMAT).to_string());

        let row = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!(" {label:<10}"), theme::label()),
                Span::styled(value, theme::value()),
            ])
        };
        vec![
            row("Domain", domain),
            row("Templates", templates),
            row("Date", date),
        ]
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let [summary_area, domains_area, templates_area] = Layout::vertical([
            Constraint::Length(5),
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .areas(area);

        let block = Block::default()
            .title(Span::styled(" New scheduled scan ", theme::title()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(false))
            .title_bottom(Line::from(vec![
                Span::styled(" enter ", theme::key_hint_key()),
                Span::styled("schedule ", theme::key_hint()),
            ]));
        let inner = block.inner(summary_area);
        frame.render_widget(block, summary_area);
        frame.render_widget(Paragraph::new(self.form_summary()), inner);

        let picked = |id: &EntityId| match &self.form.domain {
            Choice::One(chosen) => chosen == id,
            Choice::All => true,
            Choice::None => false,
        };
        self.domains.render(
            frame,
            domains_area,
            "Domain",
            self.focused && self.pane == Pane::Domains,
            &Columns {
                header: &[" ", "Domain"],
                widths: &[Constraint::Length(2), Constraint::Fill(1)],
            },
            |d| {
                let mark = if picked(&d.id) {
                    Span::styled("◉", theme::selected_marker())
                } else {
                    Span::styled("○", theme::key_hint())
                };
                Row::new(vec![Cell::from(mark), Cell::from(d.name.clone())])
            },
        );

        let title = if self.form.templates_enabled() {
            "Templates"
        } else {
            "Templates (locked: all domains)"
        };
        self.templates.render(
            frame,
            templates_area,
            title,
            self.focused && self.pane == Pane::Templates,
            &Columns {
                header: &[" ", "Name", "Type"],
                widths: &[
                    Constraint::Length(2),
                    Constraint::Fill(1),
                    Constraint::Length(10),
                ],
            },
            |t| {
                let mark = if self.form.templates.is_selected(&t.id) {
                    Span::styled("◉", theme::selected_marker())
                } else {
                    Span::styled("○", theme::key_hint())
                };
                Row::new(vec![
                    Cell::from(mark),
                    Cell::from(t.name.clone()),
                    Cell::from(t.kind.clone()),
                ])
            },
        );
    }
}

impl Component for ScheduleScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some((kind, prompt)) = self.prompt.as_mut() {
            let kind = *kind;
            return Ok(match prompt.handle_key(key) {
                PromptOutcome::Pending => None,
                PromptOutcome::Cancelled => {
                    self.prompt = None;
                    None
                }
                PromptOutcome::Submitted(value) => {
                    self.prompt = None;
                    self.submit_prompt(kind, &value)
                }
            });
        }

        let moved = match self.pane {
            Pane::Schedules => self.rows.handle_nav_key(key.code),
            Pane::Domains => self.domains.handle_nav_key(key.code),
            Pane::Templates => self.templates.handle_nav_key(key.code),
        };
        if moved {
            return Ok(None);
        }

        Ok(match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.pane = self.pane.next();
                None
            }
            KeyCode::Char(' ') => self.pick_under_cursor(),
            KeyCode::Char('A') => self.toggle_all(),
            KeyCode::Char('t') => {
                self.open_prompt(PromptKind::Date);
                None
            }
            KeyCode::Char('/') => {
                self.open_prompt(PromptKind::Filter);
                None
            }
            KeyCode::Char('c') => {
                self.form.reset();
                None
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ScheduleRowsUpdated(rows) => self.rows.set_items(rows.clone()),
            Action::DomainsUpdated(items) => self.domains.set_items(items.clone()),
            Action::TemplatesUpdated(items) => self.templates.set_items(items.clone()),
            Action::LoadStateChanged(resource, state) => match resource {
                Resource::ScheduledScans => self.rows.set_load_state(state.clone()),
                Resource::Domains => self.domains.set_load_state(state.clone()),
                Resource::Templates => self.templates.set_load_state(state.clone()),
                Resource::Scans | Resource::MultiScans => {}
            },
            Action::CommandDone {
                affects: Resource::ScheduledScans,
                succeeded,
            } if self.submitting => {
                self.submitting = false;
                if *succeeded {
                    self.form.reset();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(area);

        self.rows.render(
            frame,
            left,
            "Scheduled scans",
            self.focused && self.pane == Pane::Schedules,
            &Columns {
                header: &["Domain", "Templates", "Date"],
                widths: &[
                    Constraint::Fill(2),
                    Constraint::Fill(2),
                    Constraint::Length(11),
                ],
            },
            |r| {
                let date = r
                    .scan
                    .scheduled_date
                    .map_or_else(|| "—".to_owned(), |d| d.format(SCHEDULE_DATE_FORMAT).to_string());
                Row::new(vec![
                    Cell::from(r.domain.clone()),
                    Cell::from(templates_label(r)),
                    Cell::from(date),
                ])
            },
        );

        self.render_form(frame, right);

        if let Some((_, prompt)) = &self.prompt {
            prompt.render(frame, area);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.prompt.is_some()
    }
}
