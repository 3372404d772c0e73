use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Entity, EntityId};

/// Label used wherever an empty template list has to be shown.
pub const ALL_TEMPLATES: &str = "All Templates";

// ── ScanStatus ──────────────────────────────────────────────────────

/// Lifecycle of a single scan. Transitions happen on the backend.
///
/// Decoding accepts the spellings seen across backend builds
/// (`complete`, `cancelled`, `in_progress`); anything else is kept
/// verbatim in [`ScanStatus::Unknown`] rather than failing the list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScanStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Canceled,
    Unknown(String),
}

impl ScanStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" => Self::Pending,
            "in-progress" | "in_progress" | "inprogress" | "running" => Self::InProgress,
            "completed" | "complete" => Self::Completed,
            "failed" => Self::Failed,
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::Unknown(raw.trim().to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Unknown(raw) => raw,
        }
    }

    /// No further transitions expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ScanStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ScanStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

// ── Scan ────────────────────────────────────────────────────────────

/// One executed (or executing) run of templates against a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: EntityId,
    pub domain_id: EntityId,
    /// Denormalized hostname, as recorded by the backend.
    pub domain: String,
    /// Empty means every template was requested.
    pub template_ids: Vec<EntityId>,
    pub scan_date: Option<DateTime<Utc>>,
    pub status: ScanStatus,
    pub error: Option<String>,
    pub result_urls: Option<Vec<String>>,
}

impl Scan {
    pub fn covers_all_templates(&self) -> bool {
        self.template_ids.is_empty()
    }
}

impl Entity for Scan {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

// ── MultiScan ───────────────────────────────────────────────────────

/// Outcome of a scan group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MultiScanStatus {
    Pass,
    Fail,
    InProgress,
    Unknown(String),
}

impl MultiScanStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pass" | "passed" => Self::Pass,
            "fail" | "failed" => Self::Fail,
            "in-progress" | "in_progress" | "inprogress" => Self::InProgress,
            _ => Self::Unknown(raw.trim().to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
            Self::InProgress => "in-progress",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for MultiScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MultiScanStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MultiScanStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

/// Summary of a group of scans started together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiScan {
    pub id: EntityId,
    pub name: String,
    pub status: MultiScanStatus,
    pub datetime: Option<DateTime<Utc>>,
    pub total_scans: u64,
    pub completed_scans: u64,
    pub failed_scans: u64,
    pub scan_ids: Vec<EntityId>,
}

impl Entity for MultiScan {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_aliases_collapse_to_canonical() {
        assert_eq!(ScanStatus::from_wire("complete"), ScanStatus::Completed);
        assert_eq!(ScanStatus::from_wire("Completed"), ScanStatus::Completed);
        assert_eq!(ScanStatus::from_wire("cancelled"), ScanStatus::Canceled);
        assert_eq!(ScanStatus::from_wire("in_progress"), ScanStatus::InProgress);
        assert_eq!(ScanStatus::from_wire("in-progress").to_string(), "in-progress");
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let status = ScanStatus::from_wire(" exploding ");
        assert_eq!(status, ScanStatus::Unknown("exploding".into()));
        assert_eq!(status.as_str(), "exploding");
        assert!(!status.is_terminal());
    }

    #[test]
    fn multi_status_parsing() {
        assert_eq!(MultiScanStatus::from_wire("Pass"), MultiScanStatus::Pass);
        assert_eq!(MultiScanStatus::from_wire("FAIL"), MultiScanStatus::Fail);
        assert_eq!(
            MultiScanStatus::from_wire("in-progress"),
            MultiScanStatus::InProgress
        );
    }
}
