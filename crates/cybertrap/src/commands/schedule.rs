//! Scheduled scan command handlers.

use std::sync::Arc;

use chrono::NaiveDate;
use tabled::Tabled;

use cybertrap_core::command::requests::SCHEDULE_DATE_FORMAT;
use cybertrap_core::view::{ScheduleField, ScheduleRow};
use cybertrap_core::{
    ALL_TEMPLATES, Command as CoreCommand, Controller, EntityId, Resource, ScheduleForm,
};

use crate::cli::{GlobalOpts, ScheduleArgs, ScheduleCommand};
use crate::error::CliError;

use super::util;

#[derive(Tabled)]
struct ScheduleTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Templates")]
    templates: String,
    #[tabled(rename = "Date")]
    date: String,
}

impl From<&Arc<ScheduleRow>> for ScheduleTableRow {
    fn from(row: &Arc<ScheduleRow>) -> Self {
        Self {
            id: row.scan.id.to_string(),
            domain: row.domain.clone(),
            templates: util::join_ids(&row.scan.template_ids, ALL_TEMPLATES),
            date: row
                .scan
                .scheduled_date
                .map(|d| d.format(SCHEDULE_DATE_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

/// Parse `YYYY-MM-DD`, rejecting dates before `today`.
fn parse_schedule_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, CliError> {
    let date = NaiveDate::parse_from_str(raw.trim(), SCHEDULE_DATE_FORMAT).map_err(|_| {
        CliError::Validation {
            field: "date".into(),
            reason: format!("expected YYYY-MM-DD, got '{raw}'"),
        }
    })?;
    if date < today {
        return Err(CliError::Validation {
            field: "date".into(),
            reason: format!("{date} is in the past"),
        });
    }
    Ok(date)
}

pub async fn handle(
    controller: &Controller,
    args: ScheduleArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ScheduleCommand::List { list } => {
            let mut view = util::view_state::<ScheduleField>(&list, controller.config().page_size)?;
            view.set_page(list.page);

            util::fetch(controller, &[Resource::ScheduledScans], global).await?;
            // Rows fall back to "Unknown Domain" when hostnames can't be loaded.
            if let Err(e) = controller.refresh(Resource::Domains).await {
                tracing::warn!(error = %e, "could not load domain names");
            }

            let rows = ScheduleRow::build(controller.store());
            let projection =
                view.project(&rows, &util::load_state(controller, Resource::ScheduledScans));
            util::print_view(
                &projection,
                &list,
                global,
                |r| ScheduleTableRow::from(r),
                |r| r.scan.id.to_string(),
            );
            Ok(())
        }

        ScheduleCommand::Create {
            domain,
            all_domains,
            templates,
            all_templates,
            date,
        } => {
            let date = parse_schedule_date(&date, chrono::Local::now().date_naive())?;
            util::fetch(controller, &[Resource::Domains, Resource::Templates], global).await?;

            let mut form = ScheduleForm::new();
            if all_domains {
                form.toggle_all_domains();
            } else if let Some(raw) = domain.as_deref() {
                form.pick_domain(util::resolve_domain_id(controller, raw)?)?;
                if all_templates {
                    form.toggle_all_templates()?;
                } else {
                    for id in util::resolve_template_ids(controller, &templates)? {
                        if !form.templates.is_selected(&id) {
                            form.toggle_template(id)?;
                        }
                    }
                }
            }
            form.set_date(Some(date));

            let request = form.submission()?;
            util::execute(controller, CoreCommand::ScheduleScan(request), global).await?;
            Ok(())
        }

        ScheduleCommand::Delete { id } => {
            if !util::confirm(&format!("Delete scheduled scan '{id}'?"), global.yes)? {
                return Ok(());
            }
            util::execute(
                controller,
                CoreCommand::DeleteScheduledScan {
                    id: EntityId::from(id),
                },
                global,
            )
            .await?;
            Ok(())
        }
    }
}
