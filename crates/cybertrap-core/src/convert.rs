// ── API-to-domain type conversions ──
//
// Bridges raw `cybertrap_api::types` responses into `crate::model` types.
// Timestamps are parsed leniently; anything unparseable becomes `None`
// instead of failing the whole list.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use cybertrap_api::types;

use crate::model::{
    Domain, EntityId, MultiScan, MultiScanStatus, Scan, ScanStatus, ScheduledScan, Template,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken as UTC),
/// a space-separated variant of the same, and a bare `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    parse_date(raw)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a calendar date. A full timestamp is accepted and truncated.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn opt_timestamp(raw: Option<&String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| parse_timestamp(s))
}

fn ids(raw: Vec<String>) -> Vec<EntityId> {
    raw.into_iter()
        .map(EntityId::from)
        .filter(|id| !id.is_empty())
        .collect()
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

// ── Conversions ────────────────────────────────────────────────────

impl From<types::DomainResponse> for Domain {
    fn from(d: types::DomainResponse) -> Self {
        Self {
            id: EntityId::from(d.id),
            name: d.domain.trim().to_owned(),
            uploaded_at: opt_timestamp(d.uploaded_at.as_ref()),
            owner_id: non_empty(d.owner_id),
        }
    }
}

impl From<types::TemplateResponse> for Template {
    fn from(t: types::TemplateResponse) -> Self {
        Self {
            id: EntityId::from(t.id),
            template_id: t.template_id,
            name: t.name,
            description: t.description,
            artifact_url: t.artifact_url,
            metadata: t.metadata.filter(|m| !m.is_null()),
            kind: t.kind,
            created_at: opt_timestamp(t.created_at.as_ref()),
        }
    }
}

impl From<types::ScanResponse> for Scan {
    fn from(s: types::ScanResponse) -> Self {
        Self {
            id: EntityId::from(s.id),
            domain_id: EntityId::from(s.domain_id),
            domain: s.domain,
            template_ids: ids(s.template_ids),
            scan_date: opt_timestamp(s.scan_date.as_ref()),
            status: ScanStatus::from_wire(&s.status),
            error: non_empty(s.error),
            result_urls: s.result_urls,
        }
    }
}

impl From<types::MultiScanResponse> for MultiScan {
    fn from(m: types::MultiScanResponse) -> Self {
        Self {
            id: EntityId::from(m.id),
            name: m.name,
            status: MultiScanStatus::from_wire(&m.status),
            datetime: opt_timestamp(m.datetime.as_ref()),
            total_scans: m.total_scans,
            completed_scans: m.completed_scans,
            failed_scans: m.failed_scans,
            scan_ids: ids(m.scan_ids),
        }
    }
}

impl From<types::ScheduledScanResponse> for ScheduledScan {
    fn from(s: types::ScheduledScanResponse) -> Self {
        // A scan-all entry never carries a domain or template subset.
        let (domain_id, template_ids) = if s.scan_all {
            (None, Vec::new())
        } else {
            let id = EntityId::from(s.domain_id);
            ((!id.is_empty()).then_some(id), ids(s.template_ids))
        };

        Self {
            id: EntityId::from(s.id),
            domain_id,
            template_ids,
            scheduled_date: parse_date(&s.scheduled_date),
            scan_all: s.scan_all,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn timestamps_in_all_observed_shapes() {
        let rfc = parse_timestamp("2024-11-14T10:30:00+02:00");
        assert_eq!(rfc.map(|d| d.hour()), Some(8));

        let naive = parse_timestamp("2024-11-14T10:30:00.123");
        assert_eq!(naive.map(|d| d.minute()), Some(30));

        let spaced = parse_timestamp("2024-11-14 10:30:00");
        assert_eq!(spaced.map(|d| d.hour()), Some(10));

        let date_only = parse_timestamp("2024-11-14");
        assert_eq!(date_only.map(|d| (d.day(), d.hour())), Some((14, 0)));

        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn dates_accept_full_timestamps() {
        assert_eq!(
            parse_date("2030-01-15T00:00:00Z"),
            NaiveDate::from_ymd_opt(2030, 1, 15)
        );
        assert_eq!(parse_date("15/01/2030"), None);
    }

    #[test]
    fn scan_all_schedule_drops_stray_ids() {
        let s = ScheduledScan::from(types::ScheduledScanResponse {
            id: "sch1".into(),
            domain_id: "d1".into(),
            template_ids: vec!["t1".into()],
            scheduled_date: "2030-01-15".into(),
            scan_all: true,
        });
        assert!(s.domain_id.is_none());
        assert!(s.template_ids.is_empty());
    }

    #[test]
    fn single_domain_schedule_keeps_ids() {
        let s = ScheduledScan::from(types::ScheduledScanResponse {
            id: "sch2".into(),
            domain_id: "d1".into(),
            template_ids: vec!["t1".into(), String::new()],
            scheduled_date: "2030-01-15".into(),
            scan_all: false,
        });
        assert_eq!(s.domain_id, Some(EntityId::from("d1")));
        assert_eq!(s.template_ids, vec![EntityId::from("t1")]);
    }

    #[test]
    fn scan_status_and_error_normalized() {
        let scan = Scan::from(types::ScanResponse {
            id: "s1".into(),
            domain_id: "d1".into(),
            domain: "a.com".into(),
            template_ids: vec![],
            scan_date: Some("2024-11-14".into()),
            status: "complete".into(),
            error: Some("  ".into()),
            result_urls: None,
        });
        assert_eq!(scan.status, ScanStatus::Completed);
        assert!(scan.error.is_none());
        assert!(scan.covers_all_templates());
    }
}
