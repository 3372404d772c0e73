//! Application core: event loop, screen mounting, action dispatch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cybertrap_core::{Command, Controller, EntityId, UploadDomainsRequest, ViewScope};

use crate::action::{Action, ConfirmAction, Toast, ToastLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::centered;

const TOAST_TTL: Duration = Duration::from_secs(4);

pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    /// Blocks all other input while set.
    pending_confirm: Option<ConfirmAction>,
    toast: Option<(Toast, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    /// Lifetime of the mounted screen's fetches.
    scope: Arc<ViewScope>,
    bridge_cancel: CancellationToken,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(controller.config().page_size)
            .into_iter()
            .collect();
        let scope = Arc::new(controller.scope());

        Self {
            active_screen: ScreenId::default(),
            screens,
            running: true,
            help_visible: false,
            pending_confirm: None,
            toast: None,
            action_tx,
            action_rx,
            controller,
            scope,
            bridge_cancel: CancellationToken::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        let cancel = self.bridge_cancel.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
        });

        self.mount(self.active_screen);

        let mut events = EventReader::new(Duration::from_millis(250), Duration::from_millis(33));
        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(action)?;
                if !self.running {
                    break;
                }
            }
            if self.running && matches!(event, Event::Render | Event::Resize(..)) {
                tui.draw(|frame| self.render(frame))?;
            }
        }

        events.stop();
        self.bridge_cancel.cancel();
        self.scope.cancel();
        self.controller.shutdown();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ────────────────────────────────────────────────────────

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        let captured = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.captures_input());
        if captured {
            return self.delegate_key(key);
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='3')) => {
                let n = u8::try_from(c).unwrap_or_default() - b'0';
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }
            _ => {}
        }

        self.delegate_key(key)
    }

    fn delegate_key(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_key_event(key),
            None => Ok(None),
        }
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    fn process_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render | Action::Resize(..) => {}

            Action::Tick => {
                if self
                    .toast
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > TOAST_TTL)
                {
                    self.toast = None;
                }
            }

            Action::SwitchScreen(target) => {
                if target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = target;
                    self.mount(target);
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Refresh => {
                self.toast = Some((Toast::info("Refreshing…"), Instant::now()));
                self.refresh_active();
            }

            Action::Execute(cmd) => self.execute(cmd),
            Action::UploadFile(path) => self.upload(path),

            Action::OpenScanDetail(id) => self.load_scan_detail(id),

            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm),
            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute(confirm.into_command());
                }
            }
            Action::ConfirmNo => self.pending_confirm = None,

            Action::Notify(toast) => self.toast = Some((toast, Instant::now())),

            broadcast if broadcast.is_broadcast() => {
                let keys: Vec<ScreenId> = self.screens.keys().copied().collect();
                for id in keys {
                    self.dispatch_to(id, &broadcast)?;
                }
            }

            other => self.dispatch_to_active(&other)?,
        }
        Ok(())
    }

    fn dispatch_to(&mut self, id: ScreenId, action: &Action) -> Result<()> {
        let follow_up = match self.screens.get_mut(&id) {
            Some(screen) => screen.update(action)?,
            None => None,
        };
        if let Some(follow_up) = follow_up {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn dispatch_to_active(&mut self, action: &Action) -> Result<()> {
        self.dispatch_to(self.active_screen, action)
    }

    // ── Controller work ──────────────────────────────────────────────

    /// End the previous screen's fetches and load what `screen` shows.
    fn mount(&mut self, screen: ScreenId) {
        self.scope.cancel();
        self.scope = Arc::new(self.controller.scope());
        if let Some(component) = self.screens.get_mut(&screen) {
            component.set_focused(true);
        }
        self.refresh_active();
    }

    fn refresh_active(&self) {
        let controller = self.controller.clone();
        let scope = Arc::clone(&self.scope);
        let resources = self.active_screen.resources();
        tokio::spawn(async move {
            let fetches = resources.iter().map(|r| controller.refresh_in(&scope, *r));
            for (resource, result) in resources.iter().zip(futures::future::join_all(fetches).await)
            {
                if let Some(Err(e)) = result {
                    warn!(%resource, error = %e, "screen refresh failed");
                }
            }
        });
    }

    /// Mutations outlive the screen that started them.
    fn execute(&self, cmd: Command) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move { run_command(&controller, &tx, cmd).await });
    }

    fn upload(&self, path: PathBuf) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match read_upload(&path).await {
                Ok(req) => run_command(&controller, &tx, Command::UploadDomains(req)).await,
                Err(message) => {
                    warn!(path = %path.display(), "{message}");
                    let _ = tx.send(Action::Notify(Toast::error(message)));
                }
            }
        });
    }

    fn load_scan_detail(&self, id: EntityId) {
        let controller = self.controller.clone();
        let scope = Arc::clone(&self.scope);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let action = match scope.run(controller.scan_detail(&id)).await {
                None => return,
                Some(Ok(scan)) => Action::ScanDetailLoaded(Arc::new(scan)),
                Some(Err(e)) => Action::ScanDetailFailed {
                    id,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(action);
        });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [content, tabs, status] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content);
        }
        self.render_tab_bar(frame, tabs);
        self.render_status_bar(frame, status);

        if let Some((toast, _)) = &self.toast {
            render_toast(frame, area, toast);
        }
        if let Some(confirm) = &self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    theme::tab(id == self.active_screen),
                ))
            })
            .collect();
        let selected = ScreenId::ALL
            .iter()
            .position(|&s| s == self.active_screen)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(selected);
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        for (key, label) in screen_hints(self.active_screen)
            .iter()
            .chain(&[("?", "help"), ("q", "quit")])
        {
            spans.push(Span::styled(*key, theme::key_hint_key()));
            spans.push(Span::styled(format!(" {label}  "), theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

async fn run_command(controller: &Controller, tx: &mpsc::UnboundedSender<Action>, cmd: Command) {
    let affects = cmd.affects();
    let action = cmd.action();
    let succeeded = match controller.execute(cmd).await {
        Ok(_) => true,
        Err(e) => {
            warn!(action, error = %e, "command failed");
            false
        }
    };
    let _ = tx.send(Action::CommandDone { affects, succeeded });
}

async fn read_upload(path: &Path) -> Result<UploadDomainsRequest, String> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
    let file_name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );
    Ok(UploadDomainsRequest { file_name, content })
}

fn screen_hints(screen: ScreenId) -> &'static [(&'static str, &'static str)] {
    match screen {
        ScreenId::Targets => &[
            ("space", "select"),
            ("enter", "scan"),
            ("a", "add"),
            ("u", "upload"),
            ("d", "delete"),
            ("/", "filter"),
        ],
        ScreenId::Scans => &[
            ("enter", "details"),
            ("f", "status"),
            ("/", "filter"),
            ("s", "sort"),
        ],
        ScreenId::Schedule => &[
            ("space", "pick"),
            ("t", "date"),
            ("enter", "schedule"),
            ("d", "delete"),
        ],
    }
}

fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast) {
    let msg_len = u16::try_from(toast.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 70).min(area.width);
    let height = 3u16;
    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let rect = Rect::new(area.x + x, area.y + y, width, height);

    let (color, icon) = match toast.level {
        ToastLevel::Success => (theme::OK_GREEN, "✓"),
        ToastLevel::Error => (theme::ERR_RED, "✗"),
        ToastLevel::Info => (theme::TEAL, "·"),
    };

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_PANEL));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(toast.message.as_str(), theme::value()),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let rect = centered(area, 56, 5);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title(Span::styled(" Confirm ", theme::title()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::WARN_AMBER))
        .style(Style::default().bg(theme::BG_PANEL));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let text = vec![
        Line::from(Span::styled(format!("  {confirm}"), theme::value())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

fn help_line(key: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
        Span::styled(what, theme::key_hint()),
    ])
}

fn help_section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(format!("  {title}"), theme::title()))
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let rect = centered(area, 62, 30);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title(Span::styled(" Keyboard Shortcuts ", theme::title()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(Style::default().bg(theme::BG_PANEL));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let text = vec![
        help_section("Everywhere"),
        help_line("1-3", "Jump to screen"),
        help_line("Tab", "Next pane"),
        help_line("j/k ↑/↓", "Move"),
        help_line("←/→", "Previous / next page"),
        help_line("/", "Filter the focused table"),
        help_line("s / S", "Next sort field / flip direction"),
        help_line("r", "Refresh"),
        Line::from(""),
        help_section("Targets"),
        help_line("space / A", "Toggle row / toggle all"),
        help_line("enter", "Start scan with the selection"),
        help_line("a / u / d", "Add / upload file / delete domain"),
        Line::from(""),
        help_section("Scans"),
        help_line("enter / Esc", "Open / close scan details"),
        help_line("f", "Cycle status filter"),
        Line::from(""),
        help_section("Schedule"),
        help_line("space / A", "Pick domain or template / all"),
        help_line("t", "Set date (YYYY-MM-DD)"),
        help_line("enter / d", "Create / delete scheduled scan"),
        Line::from(""),
        Line::from(Span::styled("  Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cybertrap_core::ClientConfig;

    use super::*;

    fn app() -> App {
        let config = ClientConfig::new("http://127.0.0.1:9".parse().unwrap());
        App::new(Controller::new(config).unwrap())
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn number_keys_switch_screens() {
        let mut app = app();
        let action = app.handle_key_event(key('2')).unwrap();
        assert!(matches!(action, Some(Action::SwitchScreen(ScreenId::Scans))));
        assert!(app.handle_key_event(key('9')).unwrap().is_none());
    }

    #[test]
    fn confirm_dialog_swallows_other_keys() {
        let mut app = app();
        app.pending_confirm = Some(ConfirmAction::DeleteDomain {
            id: EntityId::from("d1"),
            name: "a.com".into(),
        });
        assert!(app.handle_key_event(key('q')).unwrap().is_none());
        assert!(matches!(
            app.handle_key_event(key('y')).unwrap(),
            Some(Action::ConfirmYes)
        ));
    }

    #[test]
    fn ctrl_c_always_quits() {
        let mut app = app();
        app.help_visible = true;
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(
            app.handle_key_event(ctrl_c).unwrap(),
            Some(Action::Quit)
        ));
    }

    #[tokio::test]
    async fn upload_reads_the_file_off_the_event_loop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.txt");
        std::fs::write(&path, "a.com\nb.com\n").unwrap();

        let req = read_upload(&path).await.unwrap();
        assert_eq!(req.file_name, "targets.txt");
        assert_eq!(req.line_count(), 2);
    }

    #[tokio::test]
    async fn unreadable_upload_becomes_an_error_toast() {
        let mut app = app();
        app.process_action(Action::UploadFile(PathBuf::from(
            "/nonexistent/cybertrap-domains.txt",
        )))
        .unwrap();

        let Some(Action::Notify(toast)) = app.action_rx.recv().await else {
            panic!("expected an error toast");
        };
        assert_eq!(toast.level, ToastLevel::Error);
        assert!(toast.message.contains("cybertrap-domains.txt"));
    }

    #[test]
    fn toast_expires_on_tick() {
        let mut app = app();
        app.process_action(Action::Notify(Toast::info("hi"))).unwrap();
        assert!(app.toast.is_some());
        app.toast.as_mut().unwrap().1 = Instant::now() - TOAST_TTL - Duration::from_millis(1);
        app.process_action(Action::Tick).unwrap();
        assert!(app.toast.is_none());
    }
}
