//! Domain command handlers.

use std::sync::Arc;

use tabled::Tabled;

use cybertrap_core::view::DomainField;
use cybertrap_core::{
    Command as CoreCommand, Controller, Domain, Resource, UploadDomainsRequest,
};

use crate::cli::{DomainsArgs, DomainsCommand, GlobalOpts};
use crate::error::CliError;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Uploaded")]
    uploaded_at: String,
    #[tabled(rename = "Owner")]
    owner: String,
}

impl From<&Arc<Domain>> for DomainRow {
    fn from(d: &Arc<Domain>) -> Self {
        Self {
            id: d.id.to_string(),
            domain: d.name.clone(),
            uploaded_at: util::format_timestamp(d.uploaded_at.as_ref()),
            owner: d.owner_id.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DomainsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DomainsCommand::List {
            filter_domain,
            list,
        } => {
            let mut view = util::view_state::<DomainField>(&list, controller.config().page_size)?;
            if let Some(needle) = filter_domain.as_deref() {
                view.set_filter(DomainField::Domain, needle);
            }
            // Filters reset the page, so apply the requested one last.
            view.set_page(list.page);

            util::fetch(controller, &[Resource::Domains], global).await?;
            let snap = controller.store().domains_snapshot();
            let projection =
                view.project(&snap, &util::load_state(controller, Resource::Domains));
            util::print_view(
                &projection,
                &list,
                global,
                |d| DomainRow::from(d),
                |d| d.name.clone(),
            );
            Ok(())
        }

        DomainsCommand::Add { name } => {
            util::execute(controller, CoreCommand::CreateDomain { name }, global).await?;
            Ok(())
        }

        DomainsCommand::Delete { domain } => {
            util::fetch(controller, &[Resource::Domains], global).await?;
            let id = util::resolve_domain_id(controller, &domain)?;
            let label = controller.store().domain_name(&id);
            if !util::confirm(
                &format!("Delete domain '{label}'? Its scans may be removed too."),
                global.yes,
            )? {
                return Ok(());
            }
            util::execute(controller, CoreCommand::DeleteDomain { id }, global).await?;
            Ok(())
        }

        DomainsCommand::Upload { file } => {
            let content = std::fs::read(&file)?;
            let file_name = file
                .file_name()
                .map_or_else(|| "domains.txt".to_owned(), |n| n.to_string_lossy().into_owned());
            let req = UploadDomainsRequest { file_name, content };
            util::execute(controller, CoreCommand::UploadDomains(req), global).await?;
            Ok(())
        }
    }
}
