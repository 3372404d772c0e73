//! A paginated, filterable table over one store collection.
//!
//! The pane keeps the latest snapshot and load state and re-projects
//! through [`ViewState`] whenever either of them, the filters, the sort,
//! or the page changes. The cursor indexes rows on the current page.

use std::sync::Arc;

use crossterm::event::KeyCode;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use strum::IntoEnumIterator;

use cybertrap_core::LoadState;
use cybertrap_core::view::{Projection, SortKey, ViewState, ViewStatus, Viewable};

use crate::theme;

/// Column headers and widths for [`TablePane::render`].
pub struct Columns<'a> {
    pub header: &'a [&'a str],
    pub widths: &'a [Constraint],
}

pub struct TablePane<T: Viewable> {
    view: ViewState<T::Field>,
    items: Arc<Vec<Arc<T>>>,
    load: LoadState,
    projection: Projection<T>,
    cursor: usize,
}

impl<T> TablePane<T>
where
    T: Viewable,
    T::Field: IntoEnumIterator,
{
    pub fn new(page_size: usize) -> Self {
        let view = ViewState::new(page_size);
        let load = LoadState::Idle;
        let projection = view.project::<T>(&[], &load);
        Self {
            view,
            items: Arc::new(Vec::new()),
            load,
            projection,
            cursor: 0,
        }
    }

    fn reproject(&mut self) {
        self.projection = self.view.project(self.items.as_slice(), &self.load);
        self.cursor = self
            .cursor
            .min(self.projection.rows.len().saturating_sub(1));
    }

    // ── Inputs ───────────────────────────────────────────────────────

    pub fn set_items(&mut self, items: Arc<Vec<Arc<T>>>) {
        self.items = items;
        self.reproject();
    }

    pub fn set_load_state(&mut self, load: LoadState) {
        self.load = load;
        self.reproject();
    }

    pub fn set_filter(&mut self, field: T::Field, value: &str) {
        self.view.set_filter(field, value);
        self.cursor = 0;
        self.reproject();
    }

    pub fn filter(&self, field: T::Field) -> &str {
        self.view.filters().value(field)
    }

    /// Next field ascending; past the last field, back to store order.
    pub fn cycle_sort(&mut self) {
        let fields: Vec<T::Field> = T::Field::iter().collect();
        let next = match self.view.sort() {
            None => fields.first().copied(),
            Some(key) => fields
                .iter()
                .position(|f| *f == key.field)
                .and_then(|i| fields.get(i + 1))
                .copied(),
        };
        self.view.set_sort(next.map(SortKey::ascending));
        self.reproject();
    }

    /// Re-sort by the current field (asc, desc, asc, ...). With nothing
    /// sorted yet this sorts the first field ascending.
    pub fn flip_sort(&mut self) {
        let field = match self.view.sort() {
            Some(key) => key.field,
            None => match T::Field::iter().next() {
                Some(field) => field,
                None => return,
            },
        };
        self.view.toggle_sort(field);
        self.reproject();
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.view.next_page(self.projection.matched);
        if moved {
            self.cursor = 0;
            self.reproject();
        }
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.view.prev_page(self.projection.matched);
        if moved {
            self.cursor = 0;
            self.reproject();
        }
        moved
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.projection.rows.len();
        if len > 0 {
            self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
        }
    }

    /// Movement, paging and sort keys. Returns `false` for anything else.
    pub fn handle_nav_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => self.cursor = 0,
            KeyCode::Char('G') | KeyCode::End => self.move_cursor(isize::MAX),
            KeyCode::Right | KeyCode::PageDown => {
                self.next_page();
            }
            KeyCode::Left | KeyCode::PageUp => {
                self.prev_page();
            }
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('S') => self.flip_sort(),
            _ => return false,
        }
        true
    }

    // ── Outputs ──────────────────────────────────────────────────────

    /// The whole snapshot, unfiltered.
    pub fn items(&self) -> &[Arc<T>] {
        &self.items
    }

    pub fn rows(&self) -> &[Arc<T>] {
        &self.projection.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&Arc<T>> {
        self.projection.rows.get(self.cursor)
    }

    pub fn sort_label(&self) -> Option<String> {
        self.view
            .sort()
            .map(|key| format!("{} {}", key.field, key.direction.arrow()))
    }

    pub fn filter_label(&self) -> Option<String> {
        let filters = self.view.filters();
        if filters.is_empty() {
            return None;
        }
        let parts: Vec<String> = filters
            .iter()
            .map(|(field, _)| format!("{field}: {}", filters.value(field)))
            .collect();
        Some(parts.join(", "))
    }

    pub fn page_label(&self) -> String {
        let p = &self.projection;
        if p.page_count == 0 {
            return String::new();
        }
        format!("page {}/{} · {} of {}", p.page, p.page_count, p.matched, p.total)
    }

    /// What to show in place of rows, if anything.
    pub fn status_message(&self) -> Option<String> {
        match &self.projection.status {
            ViewStatus::Ready => None,
            ViewStatus::Loading => Some("Loading…".into()),
            ViewStatus::Empty => Some("Nothing here yet.".into()),
            ViewStatus::NoMatches => Some(format!(
                "No rows match the filter ({} total).",
                self.projection.total
            )),
            ViewStatus::Failed(msg) => Some(format!("Load failed: {msg}")),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        focused: bool,
        columns: &Columns<'_>,
        row: impl Fn(&T) -> Row<'static>,
    ) {
        let refreshing = if self.load.is_loading() { " ⟳" } else { "" };
        let mut block = Block::default()
            .title(Line::from(Span::styled(
                format!(" {title}{refreshing} "),
                theme::title(),
            )))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(focused))
            .title_bottom(Line::from(Span::styled(
                format!(" {} ", self.page_label()),
                theme::key_hint(),
            )).right_aligned());
        if let Some(sort) = self.sort_label() {
            block = block.title(
                Line::from(Span::styled(format!(" {sort} "), theme::key_hint())).right_aligned(),
            );
        }
        if let Some(filter) = self.filter_label() {
            block = block.title_bottom(Line::from(Span::styled(
                format!(" / {filter} "),
                theme::key_hint_key(),
            )));
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(message) = self.status_message() {
            let style = match self.projection.status {
                ViewStatus::Failed(_) => ratatui::style::Style::default().fg(theme::ERR_RED),
                _ => theme::key_hint(),
            };
            frame.render_widget(
                Paragraph::new(Span::styled(message, style)).alignment(Alignment::Center),
                inner,
            );
            return;
        }

        let header = Row::new(
            columns
                .header
                .iter()
                .map(|h| Cell::from(*h).style(theme::table_header())),
        );
        let rows: Vec<Row> = self
            .rows()
            .iter()
            .map(|item| row(item.as_ref()).style(theme::table_row()))
            .collect();

        let table = Table::new(rows, columns.widths.to_vec())
            .header(header)
            .row_highlight_style(theme::table_cursor());

        let mut state = TableState::default();
        if focused {
            state.select(Some(self.cursor()));
        }
        frame.render_stateful_widget(table, inner, &mut state);
    }
}
