//! Template command handlers.

use std::sync::Arc;

use tabled::Tabled;

use cybertrap_core::view::TemplateField;
use cybertrap_core::{Controller, Resource, Template};

use crate::cli::{GlobalOpts, TemplatesArgs, TemplatesCommand};
use crate::error::CliError;

use super::util;

const DESCRIPTION_WIDTH: usize = 60;

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Template")]
    template_id: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

impl From<&Arc<Template>> for TemplateRow {
    fn from(t: &Arc<Template>) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.clone(),
            template_id: t.template_id.clone(),
            kind: t.kind.clone(),
            description: truncate(&t.description, DESCRIPTION_WIDTH),
            created_at: util::format_timestamp(t.created_at.as_ref()),
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= width {
        return line.to_owned();
    }
    let mut out: String = line.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub async fn handle(
    controller: &Controller,
    args: TemplatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TemplatesCommand::List {
            filter_name,
            filter_type,
            list,
        } => {
            let mut view =
                util::view_state::<TemplateField>(&list, controller.config().page_size)?;
            if let Some(needle) = filter_name.as_deref() {
                view.set_filter(TemplateField::Name, needle);
            }
            if let Some(kind) = filter_type.as_deref() {
                view.set_filter(TemplateField::Kind, kind);
            }
            view.set_page(list.page);

            util::fetch(controller, &[Resource::Templates], global).await?;
            let snap = controller.store().templates_snapshot();
            let projection =
                view.project(&snap, &util::load_state(controller, Resource::Templates));
            util::print_view(
                &projection,
                &list,
                global,
                |t| TemplateRow::from(t),
                |t| t.id.to_string(),
            );
            Ok(())
        }
    }
}
