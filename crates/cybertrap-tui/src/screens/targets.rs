//! Targets screen: domains and templates side by side, with the scan form
//! as checkmarks over both tables.

use std::path::PathBuf;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row};

use cybertrap_core::view::{DomainField, TemplateField};
use cybertrap_core::{
    Command, Domain, EntityId, Resource, ScanForm, ScanSubmission, Selection,
    Template,
};

use crate::action::{Action, ConfirmAction, Toast};
use crate::component::Component;
use crate::theme;
use crate::widgets::format_timestamp;
use crate::widgets::prompt::{Prompt, PromptOutcome};
use crate::widgets::table_pane::{Columns, TablePane};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Domains,
    Templates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    AddDomain,
    Upload,
    Filter,
}

pub struct TargetsScreen {
    focused: bool,
    pane: Pane,
    domains: TablePane<Domain>,
    templates: TablePane<Template>,
    form: ScanForm,
    prompt: Option<(PromptKind, Prompt)>,
}

fn marker(selection: &Selection<EntityId>, id: &EntityId) -> Span<'static> {
    if selection.is_selected(id) {
        Span::styled("◉", theme::selected_marker())
    } else {
        Span::styled("○", theme::key_hint())
    }
}

impl TargetsScreen {
    pub fn new(page_size: usize) -> Self {
        Self {
            focused: false,
            pane: Pane::Domains,
            domains: TablePane::new(page_size),
            templates: TablePane::new(page_size),
            form: ScanForm::new(),
            prompt: None,
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        let prompt = match kind {
            PromptKind::AddDomain => Prompt::new("Add domain"),
            PromptKind::Upload => Prompt::new("Upload domains from file (one per line)"),
            PromptKind::Filter => match self.pane {
                Pane::Domains => Prompt::with_value(
                    "Filter domains",
                    self.domains.filter(DomainField::Domain),
                ),
                Pane::Templates => Prompt::with_value(
                    "Filter templates",
                    self.templates.filter(TemplateField::Name),
                ),
            },
        };
        self.prompt = Some((kind, prompt));
    }

    fn submit_prompt(&mut self, kind: PromptKind, value: &str) -> Option<Action> {
        match kind {
            PromptKind::Filter => {
                match self.pane {
                    Pane::Domains => self.domains.set_filter(DomainField::Domain, value),
                    Pane::Templates => self.templates.set_filter(TemplateField::Name, value),
                }
                None
            }
            PromptKind::AddDomain if value.is_empty() => None,
            PromptKind::AddDomain => Some(Action::Execute(Command::CreateDomain {
                name: value.to_owned(),
            })),
            PromptKind::Upload if value.is_empty() => None,
            PromptKind::Upload => Some(Action::UploadFile(PathBuf::from(value))),
        }
    }

    fn toggle_under_cursor(&mut self) -> Option<Action> {
        let result = match self.pane {
            Pane::Domains => {
                let id = self.domains.selected()?.id.clone();
                self.form.toggle_domain(id)
            }
            Pane::Templates => {
                let id = self.templates.selected()?.id.clone();
                self.form.toggle_template(id)
            }
        };
        result.err().map(|e| Action::Notify(Toast::error(e.to_string())))
    }

    fn toggle_all(&mut self) -> Option<Action> {
        match self.pane {
            Pane::Domains => {
                self.form.toggle_all_domains();
                None
            }
            Pane::Templates => self
                .form
                .toggle_all_templates()
                .err()
                .map(|e| Action::Notify(Toast::error(e.to_string()))),
        }
    }

    fn submit_scan(&self) -> Action {
        let names: Vec<String> = self.domains.items().iter().map(|d| d.name.clone()).collect();
        match self.form.submission(&names) {
            Ok(all @ ScanSubmission::AllDomains { .. }) => {
                Action::ShowConfirm(ConfirmAction::ScanAllDomains(all))
            }
            Ok(submission) => Action::Execute(Command::StartScan(submission)),
            Err(e) => Action::Notify(Toast::error(e.to_string())),
        }
    }

    fn delete_selected(&self) -> Option<Action> {
        if self.pane != Pane::Domains {
            return None;
        }
        let domain = self.domains.selected()?;
        Some(Action::ShowConfirm(ConfirmAction::DeleteDomain {
            id: domain.id.clone(),
            name: domain.name.clone(),
        }))
    }

    fn nav(&mut self, code: KeyCode) -> bool {
        match self.pane {
            Pane::Domains => self.domains.handle_nav_key(code),
            Pane::Templates => self.templates.handle_nav_key(code),
        }
    }

    fn selection_summary(&self) -> Line<'static> {
        let domains = match &self.form.domains {
            Selection::None => "no domains".to_owned(),
            Selection::All => "all domains".to_owned(),
            Selection::Explicit(ids) => format!("{} domain(s)", ids.len()),
        };
        let templates = match &self.form.templates {
            _ if !self.form.templates_enabled() => "every template".to_owned(),
            Selection::None => "no templates".to_owned(),
            Selection::All => "all templates".to_owned(),
            Selection::Explicit(ids) => format!("{} template(s)", ids.len()),
        };
        Line::from(vec![
            Span::styled(" Scan: ", theme::label()),
            Span::styled(format!("{domains} × {templates}"), theme::value()),
            Span::styled("   enter ", theme::key_hint_key()),
            Span::styled("start", theme::key_hint()),
        ])
    }
}

impl Component for TargetsScreen {
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

        if self.nav(key.code) {
            return Ok(None);
        }

        Ok(match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.pane = match self.pane {
                    Pane::Domains => Pane::Templates,
                    Pane::Templates => Pane::Domains,
                };
                None
            }
            KeyCode::Char(' ') => self.toggle_under_cursor(),
            KeyCode::Char('A') => self.toggle_all(),
            KeyCode::Char('c') => {
                self.form.reset();
                None
            }
            KeyCode::Enter => Some(self.submit_scan()),
            KeyCode::Char('a') => {
                self.open_prompt(PromptKind::AddDomain);
                None
            }
            KeyCode::Char('u') => {
                self.open_prompt(PromptKind::Upload);
                None
            }
            KeyCode::Char('/') => {
                self.open_prompt(PromptKind::Filter);
                None
            }
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DomainsUpdated(items) => self.domains.set_items(items.clone()),
            Action::TemplatesUpdated(items) => self.templates.set_items(items.clone()),
            Action::LoadStateChanged(Resource::Domains, state) => {
                self.domains.set_load_state(state.clone());
            }
            Action::LoadStateChanged(Resource::Templates, state) => {
                self.templates.set_load_state(state.clone());
            }
            Action::CommandDone {
                affects: Resource::Scans,
                succeeded: true,
            } => self.form.reset(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [tables, summary] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(tables);

        let domain_marker = |d: &Domain| marker(&self.form.domains, &d.id);
        self.domains.render(
            frame,
            left,
            "Domains",
            self.focused && self.pane == Pane::Domains,
            &Columns {
                header: &[" ", "Domain", "Uploaded"],
                widths: &[
                    Constraint::Length(2),
                    Constraint::Fill(1),
                    Constraint::Length(17),
                ],
            },
            |d| {
                Row::new(vec![
                    Cell::from(domain_marker(d)),
                    Cell::from(d.name.clone()),
                    Cell::from(format_timestamp(d.uploaded_at)),
                ])
            },
        );

        let title = if self.form.templates_enabled() {
            "Templates"
        } else {
            "Templates (locked: all domains)"
        };
        let template_marker = |t: &Template| marker(&self.form.templates, &t.id);
        self.templates.render(
            frame,
            right,
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
                Row::new(vec![
                    Cell::from(template_marker(t)),
                    Cell::from(t.name.clone()),
                    Cell::from(t.kind.clone()),
                ])
            },
        );

        frame.render_widget(Paragraph::new(self.selection_summary()), summary);

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
