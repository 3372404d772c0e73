//! Shared helpers for command handlers.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use strum::IntoEnumIterator;

use cybertrap_core::view::{Projection, SortKey, ViewField, ViewState, Viewable};
use cybertrap_core::{Command, CommandResult, Controller, EntityId, LoadState, Resource};

use crate::cli::{GlobalOpts, ListArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Prompt(e.to_string()))
}

/// Stderr spinner, hidden in quiet mode and for machine-readable output.
fn spinner(message: &str, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || global.output != OutputFormat::Table {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Fetch `resources` into the controller's store behind a spinner.
pub async fn fetch(
    controller: &Controller,
    resources: &[Resource],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let label = resources
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let bar = spinner(&format!("Loading {label}…"), global);
    let result = controller.refresh_many(resources).await;
    bar.finish_and_clear();
    result.map_err(CliError::from)
}

/// Parse `--sort`/`--desc` into a sort key, listing valid fields on error.
pub fn parse_sort<F>(raw: Option<&str>, desc: bool) -> Result<Option<SortKey<F>>, CliError>
where
    F: ViewField + FromStr + IntoEnumIterator,
{
    let Some(raw) = raw else {
        return Ok(None);
    };
    let field = raw.trim().parse::<F>().map_err(|_| CliError::Validation {
        field: "sort".into(),
        reason: format!(
            "unknown field '{raw}', expected one of: {}",
            F::iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
        ),
    })?;
    Ok(Some(if desc {
        SortKey::descending(field)
    } else {
        SortKey::ascending(field)
    }))
}

/// Build a view from the shared list flags.
pub fn view_state<F>(list: &ListArgs, default_page_size: usize) -> Result<ViewState<F>, CliError>
where
    F: ViewField + FromStr + IntoEnumIterator,
{
    let page_size = if list.all {
        usize::MAX
    } else {
        list.page_size.unwrap_or(default_page_size)
    };
    if page_size == 0 {
        return Err(CliError::Validation {
            field: "page-size".into(),
            reason: "must be at least 1".into(),
        });
    }
    let mut view = ViewState::new(page_size);
    view.set_sort(parse_sort(list.sort.as_deref(), list.desc)?);
    view.set_page(list.page);
    Ok(view)
}

/// Render one page (or every row with `--all`) and its footer.
pub fn print_view<T, R>(
    projection: &Projection<T>,
    list: &ListArgs,
    global: &GlobalOpts,
    to_row: impl Fn(&Arc<T>) -> R,
    id_fn: impl Fn(&Arc<T>) -> String,
) where
    T: Viewable + serde::Serialize,
    R: tabled::Tabled,
{
    let out = output::render_list(global.output, &projection.rows, to_row, id_fn);
    output::print_output(&out, global.quiet);
    if global.output == OutputFormat::Table {
        if let Some(footer) = output::projection_footer(projection, list.all) {
            output::print_note(&footer, global.quiet, global.color);
        }
    }
}

/// Store load state, for views that only read one collection.
pub fn load_state(controller: &Controller, resource: Resource) -> LoadState {
    controller.store().load_state(resource)
}

/// Resolve a domain given as an ID or a hostname against the store.
pub fn resolve_domain_id(controller: &Controller, identifier: &str) -> Result<EntityId, CliError> {
    let needle = identifier.trim();
    controller
        .store()
        .domains_snapshot()
        .iter()
        .find(|d| d.id.as_str() == needle || d.name.eq_ignore_ascii_case(needle))
        .map(|d| d.id.clone())
        .ok_or_else(|| CliError::NotFound {
            resource_type: "Domain".into(),
            identifier: identifier.into(),
            list_command: "domains list".into(),
        })
}

/// Check that every template ID names a known template.
pub fn resolve_template_ids(
    controller: &Controller,
    identifiers: &[String],
) -> Result<Vec<EntityId>, CliError> {
    let snap = controller.store().templates_snapshot();
    identifiers
        .iter()
        .map(|raw| {
            let needle = raw.trim();
            snap.iter()
                .find(|t| t.id.as_str() == needle || t.template_id == needle)
                .map(|t| t.id.clone())
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "Template".into(),
                    identifier: raw.clone(),
                    list_command: "templates list".into(),
                })
        })
        .collect()
}

/// `2024-11-01 14:05`, or an empty cell.
pub fn format_timestamp(ts: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Join ids for a table cell.
pub fn join_ids(ids: &[EntityId], empty: &str) -> String {
    if ids.is_empty() {
        return empty.to_owned();
    }
    ids.iter().map(EntityId::as_str).collect::<Vec<_>>().join(", ")
}

/// Run a write command and echo its success notification on stderr.
pub async fn execute(
    controller: &Controller,
    cmd: Command,
    global: &GlobalOpts,
) -> Result<CommandResult, CliError> {
    let mut notifications = controller.notifications();
    let result = controller.execute(cmd).await?;
    while let Ok(note) = notifications.try_recv() {
        if !note.is_failure() {
            output::print_success(&note.message, global.quiet, global.color);
        }
    }
    Ok(result)
}
