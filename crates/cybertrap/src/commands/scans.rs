//! Scan command handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use owo_colors::OwoColorize;
use tabled::Tabled;

use cybertrap_core::view::{MultiScanField, ScanField};
use cybertrap_core::{
    ALL_TEMPLATES, Command as CoreCommand, Controller, EntityId, MultiScan, MultiScanStatus,
    Resource, Scan, ScanForm, ScanStatus,
};

use crate::cli::{GlobalOpts, ScanTargetArgs, ScansArgs, ScansCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ScanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Templates")]
    templates: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Date")]
    date: String,
}

impl From<&Arc<Scan>> for ScanRow {
    fn from(s: &Arc<Scan>) -> Self {
        Self {
            id: s.id.to_string(),
            domain: s.domain.clone(),
            templates: templates_label(s),
            status: s.status.to_string(),
            date: util::format_timestamp(s.scan_date.as_ref()),
        }
    }
}

fn templates_label(scan: &Scan) -> String {
    if scan.covers_all_templates() {
        ALL_TEMPLATES.to_owned()
    } else {
        util::join_ids(&scan.template_ids, "")
    }
}

#[derive(Tabled)]
struct MultiScanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Started")]
    started: String,
    #[tabled(rename = "Total")]
    total: u64,
    #[tabled(rename = "Done")]
    completed: u64,
    #[tabled(rename = "Failed")]
    failed: u64,
}

impl From<&Arc<MultiScan>> for MultiScanRow {
    fn from(m: &Arc<MultiScan>) -> Self {
        Self {
            id: m.id.to_string(),
            name: m.name.clone(),
            status: m.status.to_string(),
            started: util::format_timestamp(m.datetime.as_ref()),
            total: m.total_scans,
            completed: m.completed_scans,
            failed: m.failed_scans,
        }
    }
}

// ── Detail view ─────────────────────────────────────────────────────

fn detail(scan: &Scan, color: bool) -> String {
    let status = if color {
        match scan.status {
            ScanStatus::Completed => scan.status.green().to_string(),
            ScanStatus::Failed | ScanStatus::Canceled => scan.status.red().to_string(),
            ScanStatus::Pending | ScanStatus::InProgress => scan.status.yellow().to_string(),
            ScanStatus::Unknown(_) => scan.status.to_string(),
        }
    } else {
        scan.status.to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "ID:        {}", scan.id);
    let _ = writeln!(out, "Domain:    {} ({})", scan.domain, scan.domain_id);
    let _ = writeln!(out, "Templates: {}", templates_label(scan));
    let _ = writeln!(out, "Status:    {status}");
    let _ = writeln!(
        out,
        "Date:      {}",
        util::format_timestamp(scan.scan_date.as_ref())
    );
    if let Some(err) = &scan.error {
        let _ = writeln!(out, "Error:     {err}");
    }
    match scan.result_urls.as_deref() {
        Some(urls) if !urls.is_empty() => {
            let _ = writeln!(out, "Results:");
            for url in urls {
                let _ = writeln!(out, "  {url}");
            }
        }
        _ => {
            let _ = writeln!(out, "Results:   (none yet)");
        }
    }
    out.trim_end().to_owned()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ScansArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ScansCommand::List {
            domain,
            template,
            status,
            list,
        } => {
            let mut view = util::view_state::<ScanField>(&list, controller.config().page_size)?;
            if let Some(needle) = domain.as_deref() {
                view.set_filter(ScanField::Domain, needle);
            }
            if let Some(needle) = template.as_deref() {
                view.set_filter(ScanField::Template, needle);
            }
            if let Some(raw) = status.as_deref() {
                view.set_filter(ScanField::Status, ScanStatus::from_wire(raw).as_str());
            }
            view.set_page(list.page);

            util::fetch(controller, &[Resource::Scans], global).await?;
            let snap = controller.store().scans_snapshot();
            let projection = view.project(&snap, &util::load_state(controller, Resource::Scans));
            util::print_view(
                &projection,
                &list,
                global,
                |s| ScanRow::from(s),
                |s| s.id.to_string(),
            );
            Ok(())
        }

        ScansCommand::Get { id } => {
            let scan = controller.scan_detail(&EntityId::from(id)).await?;
            let color = output::should_color(global.color);
            let out = output::render_single(
                global.output,
                &scan,
                |s| detail(s, color),
                |s| {
                    s.result_urls
                        .as_deref()
                        .map(|urls| urls.join("\n"))
                        .unwrap_or_default()
                },
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ScansCommand::Multi { status, list } => {
            let mut view =
                util::view_state::<MultiScanField>(&list, controller.config().page_size)?;
            if let Some(raw) = status.as_deref() {
                view.set_filter(MultiScanField::Status, MultiScanStatus::from_wire(raw).as_str());
            }
            view.set_page(list.page);

            util::fetch(controller, &[Resource::MultiScans], global).await?;
            let snap = controller.store().multi_scans_snapshot();
            let projection =
                view.project(&snap, &util::load_state(controller, Resource::MultiScans));
            util::print_view(
                &projection,
                &list,
                global,
                |m| MultiScanRow::from(m),
                |m| m.id.to_string(),
            );
            Ok(())
        }

        ScansCommand::Start(target) => start(controller, target, global).await,
    }
}

async fn start(
    controller: &Controller,
    target: ScanTargetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::fetch(controller, &[Resource::Domains, Resource::Templates], global).await?;

    let mut form = ScanForm::new();
    if target.all_domains {
        form.toggle_all_domains();
    } else {
        for raw in &target.domains {
            let id = util::resolve_domain_id(controller, raw)?;
            if !form.domains.is_selected(&id) {
                form.toggle_domain(id)?;
            }
        }
        if target.all_templates {
            form.toggle_all_templates()?;
        } else {
            for id in util::resolve_template_ids(controller, &target.templates)? {
                if !form.templates.is_selected(&id) {
                    form.toggle_template(id)?;
                }
            }
        }
    }

    let submission = form.submission(&controller.store().domain_names())?;

    let count = submission.domain_count();
    if target.all_domains
        && !util::confirm(
            &format!("Scan all {count} domains with every template?"),
            global.yes,
        )?
    {
        return Ok(());
    }

    util::execute(controller, CoreCommand::StartScan(submission), global).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan() -> Scan {
        Scan {
            id: EntityId::from("s1"),
            domain_id: EntityId::from("d1"),
            domain: "a.com".into(),
            template_ids: vec![EntityId::from("dns"), EntityId::from("xss")],
            scan_date: None,
            status: ScanStatus::Completed,
            error: None,
            result_urls: Some(vec!["https://r/1.json".into()]),
        }
    }

    #[test]
    fn detail_lists_result_urls() {
        let text = detail(&scan(), false);
        assert!(text.contains("Templates: dns, xss"));
        assert!(text.contains("Status:    completed"));
        assert!(text.contains("  https://r/1.json"));
    }

    #[test]
    fn detail_without_results() {
        let mut s = scan();
        s.result_urls = None;
        s.error = Some("timeout".into());
        let text = detail(&s, false);
        assert!(text.contains("Error:     timeout"));
        assert!(text.contains("(none yet)"));
    }
}
