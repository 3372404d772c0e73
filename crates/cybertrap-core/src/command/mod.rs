// ── Command API ──
//
// Every write operation flows through one `Command` enum. The controller
// routes each variant to the matching ApiClient call, emits one
// notification, then re-fetches the resource the command touched.

pub mod requests;

use crate::model::{Domain, EntityId, ScheduledScan};
use crate::store::Resource;

pub use requests::{ScanSubmission, ScheduleRequest, UploadDomainsRequest};

/// All write operations against the backend.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Domains ──────────────────────────────────────────────────────
    CreateDomain { name: String },
    DeleteDomain { id: EntityId },
    UploadDomains(UploadDomainsRequest),

    // ── Scans ────────────────────────────────────────────────────────
    StartScan(ScanSubmission),

    // ── Scheduled scans ──────────────────────────────────────────────
    ScheduleScan(ScheduleRequest),
    DeleteScheduledScan { id: EntityId },
}

impl Command {
    /// The resource to re-fetch after this command succeeds.
    pub fn affects(&self) -> Resource {
        match self {
            Self::CreateDomain { .. } | Self::DeleteDomain { .. } | Self::UploadDomains(_) => {
                Resource::Domains
            }
            Self::StartScan(_) => Resource::Scans,
            Self::ScheduleScan(_) | Self::DeleteScheduledScan { .. } => Resource::ScheduledScans,
        }
    }

    /// Short verb phrase for failure messages ("Failed to {action}").
    pub fn action(&self) -> &'static str {
        match self {
            Self::CreateDomain { .. } => "add domain",
            Self::DeleteDomain { .. } => "delete domain",
            Self::UploadDomains(_) => "upload domains",
            Self::StartScan(_) => "start scan",
            Self::ScheduleScan(_) => "schedule scan",
            Self::DeleteScheduledScan { .. } => "delete scheduled scan",
        }
    }

    pub(crate) fn success_message(&self, result: &CommandResult) -> String {
        match (self, result) {
            (Self::CreateDomain { .. }, CommandResult::Domain(d)) => {
                format!("Domain {} added", d.name)
            }
            (Self::CreateDomain { name }, _) => format!("Domain {name} added"),
            (Self::DeleteDomain { .. }, _) => "Domain deleted".into(),
            (Self::UploadDomains(req), _) => match req.line_count() {
                1 => "Uploaded 1 domain".into(),
                n => format!("Uploaded {n} domains"),
            },
            (Self::StartScan(sub), _) => match sub.domain_count() {
                1 => "Scan started for 1 domain".into(),
                n => format!("Scan started for {n} domains"),
            },
            (Self::ScheduleScan(req), _) => format!("Scan scheduled for {}", req.date),
            (Self::DeleteScheduledScan { .. }, _) => "Scheduled scan deleted".into(),
        }
    }
}

/// What a successful command returned.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Domain(Domain),
    Scheduled(ScheduledScan),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_refresh_the_resource_they_touch() {
        assert_eq!(
            Command::CreateDomain { name: "a.com".into() }.affects(),
            Resource::Domains
        );
        assert_eq!(
            Command::StartScan(ScanSubmission::AllDomains { domains: vec![] }).affects(),
            Resource::Scans
        );
        assert_eq!(
            Command::DeleteScheduledScan {
                id: EntityId::from("s1")
            }
            .affects(),
            Resource::ScheduledScans
        );
    }

    #[test]
    fn success_messages() {
        let cmd = Command::UploadDomains(UploadDomainsRequest {
            file_name: "d.txt".into(),
            content: b"a.com\nb.com".to_vec(),
        });
        assert_eq!(cmd.success_message(&CommandResult::Ok), "Uploaded 2 domains");

        let cmd = Command::StartScan(ScanSubmission::Domains {
            domain_ids: vec![EntityId::from("d1")],
            template_ids: vec![],
            all_templates: true,
        });
        assert_eq!(
            cmd.success_message(&CommandResult::Ok),
            "Scan started for 1 domain"
        );
    }
}
