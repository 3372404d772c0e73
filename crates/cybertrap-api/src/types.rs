//! Wire types for the `/v1/` backend endpoints.
//!
//! Field names use camelCase via `#[serde(rename_all = "camelCase")]`.
//! Older backend builds spelled a few fields differently; those spellings
//! are accepted through `#[serde(alias)]` on decode and never emitted.
//! Timestamps stay as raw strings here; `cybertrap-core` parses them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Domains ──────────────────────────────────────────────────────────

/// Scan target, from `GET /v1/domains`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResponse {
    pub id: String,
    pub domain: String,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default, alias = "userId")]
    pub owner_id: Option<String>,
}

/// Body of `POST /v1/domains`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDomainRequest {
    pub domain: String,
}

// ── Templates ────────────────────────────────────────────────────────

/// Scan template, from `GET /v1/templates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: String,
    #[serde(default)]
    pub template_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "s3Url", alias = "s3URL")]
    pub artifact_url: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, alias = "CreatedAt")]
    pub created_at: Option<String>,
}

// ── Scans ────────────────────────────────────────────────────────────

/// One scan run, from `GET /v1/scans` and `GET /v1/scans/{id}`.
///
/// An empty `template_ids` means every template was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub id: String,
    #[serde(default)]
    pub domain_id: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default, alias = "templatesIds", deserialize_with = "null_as_empty")]
    pub template_ids: Vec<String>,
    #[serde(default)]
    pub scan_date: Option<String>,
    /// Raw status string. Vocabulary varies between backend builds.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, alias = "s3ResultUrl", alias = "s3ResultURL")]
    pub result_urls: Option<Vec<String>>,
}

/// Scan-group summary, from `GET /v1/scans/multi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiScanResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// One of `Pass`, `Fail`, `in-progress`.
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "createdAt")]
    pub datetime: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_scans: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub completed_scans: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub failed_scans: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scan_ids: Vec<String>,
}

/// Body of `POST /v1/scans`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub domain_ids: Vec<String>,
    pub template_ids: Vec<String>,
    pub scan_all_nuclei: bool,
}

/// Body of `POST /v1/scans/all`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanAllRequest {
    pub domains: Vec<String>,
}

// ── Scheduled scans ──────────────────────────────────────────────────

/// Deferred scan, from `GET /v1/scans/schedule`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledScanResponse {
    pub id: String,
    #[serde(default)]
    pub domain_id: String,
    #[serde(default, alias = "templatesIds", deserialize_with = "null_as_empty")]
    pub template_ids: Vec<String>,
    #[serde(default)]
    pub scheduled_date: String,
    #[serde(default)]
    pub scan_all: bool,
}

/// Body of `POST /v1/scans/schedule`.
///
/// `domain_ids` holds at most one id; it is empty when `scan_all` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleScanRequest {
    pub domain_ids: Vec<String>,
    pub template_ids: Vec<String>,
    pub scan_all: bool,
    /// `YYYY-MM-DD`.
    pub scheduled_date: String,
}

// ── Lenient decoding helpers ─────────────────────────────────────────

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counts arrive as numbers, numeric strings, or arrays of ids.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("count out of range: {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("count is not a number: {s:?}"))),
        Value::Array(items) => Ok(u64::try_from(items.len()).unwrap_or(u64::MAX)),
        other => Err(D::Error::custom(format!("unexpected count value: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn template_accepts_legacy_artifact_field() {
        let t: TemplateResponse = serde_json::from_value(json!({
            "id": "t1",
            "templateId": "cve-2024-1",
            "name": "CVE check",
            "s3Url": "s3://bucket/t1.yaml",
            "type": "nuclei",
            "CreatedAt": "2024-11-14T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(t.artifact_url, "s3://bucket/t1.yaml");
        assert_eq!(t.kind, "nuclei");
        assert_eq!(t.created_at.as_deref(), Some("2024-11-14T10:00:00Z"));
        assert!(t.metadata.is_none());
    }

    #[test]
    fn scan_accepts_result_url_spellings() {
        for key in ["resultUrls", "s3ResultUrl", "s3ResultURL"] {
            let mut raw = json!({
                "id": "s1",
                "domainId": "d1",
                "domain": "a.com",
                "templateIds": null,
                "scanDate": "2024-11-14",
                "status": "completed"
            });
            raw[key] = json!(["https://r/1.json"]);
            let scan: ScanResponse = serde_json::from_value(raw).unwrap();
            assert_eq!(scan.result_urls, Some(vec!["https://r/1.json".to_owned()]));
            assert!(scan.template_ids.is_empty());
        }
    }

    #[test]
    fn multi_scan_counts_are_lenient() {
        let m: MultiScanResponse = serde_json::from_value(json!({
            "id": "m1",
            "name": "weekly",
            "status": "Pass",
            "datetime": "2024-11-14T10:00:00Z",
            "totalScans": "3",
            "completedScans": ["s1", "s2"],
            "failedScans": 1,
            "scanIds": ["s1", "s2", "s3"]
        }))
        .unwrap();
        assert_eq!(m.total_scans, 3);
        assert_eq!(m.completed_scans, 2);
        assert_eq!(m.failed_scans, 1);
    }

    #[test]
    fn scan_request_uses_camel_case() {
        let body = serde_json::to_value(ScanRequest {
            domain_ids: vec!["d1".into()],
            template_ids: vec![],
            scan_all_nuclei: true,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"domainIds": ["d1"], "templateIds": [], "scanAllNuclei": true})
        );
    }

    #[test]
    fn domain_owner_alias() {
        let d: DomainResponse = serde_json::from_value(json!({
            "id": "d1",
            "domain": "a.com",
            "uploadedAt": "2024-11-14T10:00:00Z",
            "userId": "u1"
        }))
        .unwrap();
        assert_eq!(d.owner_id.as_deref(), Some("u1"));
    }
}
