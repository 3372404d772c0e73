// ── Typed request payloads for Command variants ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::EntityId;

/// Wire format of `scheduledDate`.
pub const SCHEDULE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated immediate-scan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "kebab-case")]
pub enum ScanSubmission {
    /// `POST /v1/scans`. With `all_templates`, `template_ids` is empty.
    Domains {
        domain_ids: Vec<EntityId>,
        template_ids: Vec<EntityId>,
        all_templates: bool,
    },
    /// `POST /v1/scans/all` with every known hostname.
    AllDomains { domains: Vec<String> },
}

impl ScanSubmission {
    /// Number of domains the backend will scan.
    pub fn domain_count(&self) -> usize {
        match self {
            Self::Domains { domain_ids, .. } => domain_ids.len(),
            Self::AllDomains { domains } => domains.len(),
        }
    }
}

/// A validated schedule request.
///
/// `scan_all` implies no domain and no template ids. An empty
/// `template_ids` with a domain means every template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub domain_id: Option<EntityId>,
    pub template_ids: Vec<EntityId>,
    pub scan_all: bool,
    pub date: NaiveDate,
}

impl ScheduleRequest {
    pub(crate) fn to_wire(&self) -> cybertrap_api::types::ScheduleScanRequest {
        if self.scan_all {
            return cybertrap_api::types::ScheduleScanRequest {
                domain_ids: Vec::new(),
                template_ids: Vec::new(),
                scan_all: true,
                scheduled_date: self.date.format(SCHEDULE_DATE_FORMAT).to_string(),
            };
        }
        cybertrap_api::types::ScheduleScanRequest {
            domain_ids: self
                .domain_id
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect(),
            template_ids: self
                .template_ids
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect(),
            scan_all: false,
            scheduled_date: self.date.format(SCHEDULE_DATE_FORMAT).to_string(),
        }
    }
}

/// A newline-delimited domain list read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDomainsRequest {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadDomainsRequest {
    /// Non-blank lines, trimmed. Used for the success message only; the
    /// backend parses the file itself.
    pub fn line_count(&self) -> usize {
        String::from_utf8_lossy(&self.content)
            .lines()
            .filter(|l| !l.trim().is_empty())
            .count()
    }
}
