// Field selectors for every entity the screens list.

use std::borrow::Cow;
use std::sync::Arc;

use serde::Serialize;

use super::{FieldValue, ViewField, Viewable};
use crate::model::{
    ALL_DOMAINS, Domain, EntityId, MultiScan, Scan, ScheduledScan, Template, UNKNOWN_DOMAIN,
};
use crate::store::DataStore;

fn ids(list: &[EntityId]) -> FieldValue<'_> {
    FieldValue::List(list.iter().map(|id| Cow::Borrowed(id.as_str())).collect())
}

// ── Domains ─────────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum DomainField {
    Domain,
    UploadedAt,
    Owner,
}

impl ViewField for DomainField {}

impl Viewable for Domain {
    type Field = DomainField;

    fn field(&self, field: DomainField) -> FieldValue<'_> {
        match field {
            DomainField::Domain => FieldValue::Text(Cow::Borrowed(&self.name)),
            DomainField::UploadedAt => FieldValue::Date(self.uploaded_at),
            DomainField::Owner => {
                FieldValue::Text(Cow::Borrowed(self.owner_id.as_deref().unwrap_or_default()))
            }
        }
    }
}

// ── Templates ───────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TemplateField {
    Name,
    TemplateId,
    #[strum(to_string = "type")]
    Kind,
    Description,
    CreatedAt,
}

impl ViewField for TemplateField {
    fn is_exact(self) -> bool {
        matches!(self, Self::Kind)
    }
}

impl Viewable for Template {
    type Field = TemplateField;

    fn field(&self, field: TemplateField) -> FieldValue<'_> {
        match field {
            TemplateField::Name => FieldValue::Text(Cow::Borrowed(&self.name)),
            TemplateField::TemplateId => FieldValue::Text(Cow::Borrowed(&self.template_id)),
            TemplateField::Kind => FieldValue::Enum(Cow::Borrowed(&self.kind)),
            TemplateField::Description => FieldValue::Text(Cow::Borrowed(&self.description)),
            TemplateField::CreatedAt => FieldValue::Date(self.created_at),
        }
    }
}

// ── Scans ───────────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ScanField {
    Domain,
    Template,
    Status,
    Date,
}

impl ViewField for ScanField {
    fn is_exact(self) -> bool {
        matches!(self, Self::Status)
    }
}

impl Viewable for Scan {
    type Field = ScanField;

    fn field(&self, field: ScanField) -> FieldValue<'_> {
        match field {
            ScanField::Domain => FieldValue::Text(Cow::Borrowed(&self.domain)),
            ScanField::Template => ids(&self.template_ids),
            ScanField::Status => FieldValue::Enum(Cow::Borrowed(self.status.as_str())),
            ScanField::Date => FieldValue::Date(self.scan_date),
        }
    }
}

// ── Scan groups ─────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum MultiScanField {
    Name,
    Status,
    Date,
    Total,
}

impl ViewField for MultiScanField {
    fn is_exact(self) -> bool {
        matches!(self, Self::Status)
    }
}

impl Viewable for MultiScan {
    type Field = MultiScanField;

    fn field(&self, field: MultiScanField) -> FieldValue<'_> {
        match field {
            MultiScanField::Name => FieldValue::Text(Cow::Borrowed(&self.name)),
            MultiScanField::Status => FieldValue::Enum(Cow::Borrowed(self.status.as_str())),
            MultiScanField::Date => FieldValue::Date(self.datetime),
            MultiScanField::Total => FieldValue::Number(self.total_scans),
        }
    }
}

// ── Scheduled scans ─────────────────────────────────────────────────

/// A scheduled scan joined with its domain's hostname.
///
/// Built at render time from both snapshots, so the result does not
/// depend on which of the two fetches finished first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRow {
    #[serde(flatten)]
    pub scan: Arc<ScheduledScan>,
    pub domain: String,
}

impl ScheduleRow {
    pub fn new(scan: Arc<ScheduledScan>, store: &DataStore) -> Self {
        let domain = if scan.scan_all {
            ALL_DOMAINS.to_owned()
        } else {
            scan.domain_id
                .as_ref()
                .map_or_else(|| UNKNOWN_DOMAIN.to_owned(), |id| store.domain_name(id))
        };
        Self { scan, domain }
    }

    /// Rows for every scheduled scan currently in `store`.
    pub fn build(store: &DataStore) -> Vec<Arc<Self>> {
        store
            .scheduled_scans_snapshot()
            .iter()
            .map(|s| Arc::new(Self::new(Arc::clone(s), store)))
            .collect()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ScheduleField {
    Domain,
    Template,
    Date,
}

impl ViewField for ScheduleField {}

impl Viewable for ScheduleRow {
    type Field = ScheduleField;

    fn field(&self, field: ScheduleField) -> FieldValue<'_> {
        match field {
            ScheduleField::Domain => FieldValue::Text(Cow::Borrowed(&self.domain)),
            ScheduleField::Template => ids(&self.scan.template_ids),
            ScheduleField::Date => FieldValue::Date(
                self.scan
                    .scheduled_date
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_parse_from_kebab_case() {
        assert_eq!("uploaded-at".parse::<DomainField>().ok(), Some(DomainField::UploadedAt));
        assert_eq!("TYPE".parse::<TemplateField>().ok(), Some(TemplateField::Kind));
        assert_eq!(ScanField::Status.to_string(), "status");
        assert!("bogus".parse::<ScanField>().is_err());
    }

    #[test]
    fn schedule_row_labels() {
        let store = DataStore::new();
        store.replace_domains(vec![Domain {
            id: EntityId::from("d1"),
            name: "a.com".into(),
            uploaded_at: None,
            owner_id: None,
        }]);

        let all = ScheduleRow::new(
            Arc::new(ScheduledScan {
                id: EntityId::from("s1"),
                domain_id: None,
                template_ids: vec![],
                scheduled_date: None,
                scan_all: true,
            }),
            &store,
        );
        assert_eq!(all.domain, ALL_DOMAINS);

        let known = ScheduleRow::new(
            Arc::new(ScheduledScan {
                id: EntityId::from("s2"),
                domain_id: Some(EntityId::from("d1")),
                template_ids: vec![EntityId::from("t1")],
                scheduled_date: None,
                scan_all: false,
            }),
            &store,
        );
        assert_eq!(known.domain, "a.com");

        let orphan = ScheduleRow::new(
            Arc::new(ScheduledScan {
                id: EntityId::from("s3"),
                domain_id: Some(EntityId::from("gone")),
                template_ids: vec![EntityId::from("t1")],
                scheduled_date: None,
                scan_all: false,
            }),
            &store,
        );
        assert_eq!(orphan.domain, UNKNOWN_DOMAIN);
    }
}
