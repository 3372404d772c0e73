// ── Central entity store ──
//
// One collection per backend resource. The controller is the only
// writer; screens read snapshots and subscribe to changes.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::{EntityCollection, LoadState};
use crate::model::{
    Domain, Entity, EntityId, MultiScan, Scan, ScheduledScan, Template, UNKNOWN_DOMAIN,
};
use crate::stream::EntityStream;

/// Backend resource groups, one per collection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Resource {
    Domains,
    Templates,
    Scans,
    MultiScans,
    ScheduledScans,
}

/// Newest first, entries without a timestamp last. Stable under `sort_by`.
fn newest_first(a: Option<&DateTime<Utc>>, b: Option<&DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub struct DataStore {
    pub(crate) domains: EntityCollection<Domain>,
    pub(crate) templates: EntityCollection<Template>,
    pub(crate) scans: EntityCollection<Scan>,
    pub(crate) multi_scans: EntityCollection<MultiScan>,
    pub(crate) scheduled_scans: EntityCollection<ScheduledScan>,
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            domains: EntityCollection::new(),
            templates: EntityCollection::new(),
            scans: EntityCollection::new(),
            multi_scans: EntityCollection::new(),
            scheduled_scans: EntityCollection::new(),
        }
    }

    // ── Replacement (sorted where the screens expect it) ────────────

    pub fn replace_domains(&self, mut domains: Vec<Domain>) {
        domains.sort_by(|a, b| newest_first(a.uploaded_at.as_ref(), b.uploaded_at.as_ref()));
        self.domains.replace(domains);
    }

    pub fn replace_templates(&self, templates: Vec<Template>) {
        self.templates.replace(templates);
    }

    pub fn replace_scans(&self, mut scans: Vec<Scan>) {
        scans.sort_by(|a, b| newest_first(a.scan_date.as_ref(), b.scan_date.as_ref()));
        self.scans.replace(scans);
    }

    pub fn replace_multi_scans(&self, mut groups: Vec<MultiScan>) {
        groups.sort_by(|a, b| newest_first(a.datetime.as_ref(), b.datetime.as_ref()));
        self.multi_scans.replace(groups);
    }

    pub fn replace_scheduled_scans(&self, scheduled: Vec<ScheduledScan>) {
        self.scheduled_scans.replace(scheduled);
    }

    // ── Load state ───────────────────────────────────────────────────

    pub fn load_state(&self, resource: Resource) -> LoadState {
        match resource {
            Resource::Domains => self.domains.load_state(),
            Resource::Templates => self.templates.load_state(),
            Resource::Scans => self.scans.load_state(),
            Resource::MultiScans => self.multi_scans.load_state(),
            Resource::ScheduledScans => self.scheduled_scans.load_state(),
        }
    }

    pub fn set_load_state(&self, resource: Resource, state: LoadState) {
        match resource {
            Resource::Domains => self.domains.set_load_state(state),
            Resource::Templates => self.templates.set_load_state(state),
            Resource::Scans => self.scans.set_load_state(state),
            Resource::MultiScans => self.multi_scans.set_load_state(state),
            Resource::ScheduledScans => self.scheduled_scans.set_load_state(state),
        }
    }

    pub fn subscribe_load_state(&self, resource: Resource) -> watch::Receiver<LoadState> {
        match resource {
            Resource::Domains => self.domains.subscribe_load_state(),
            Resource::Templates => self.templates.subscribe_load_state(),
            Resource::Scans => self.scans.subscribe_load_state(),
            Resource::MultiScans => self.multi_scans.subscribe_load_state(),
            Resource::ScheduledScans => self.scheduled_scans.subscribe_load_state(),
        }
    }

    /// Number of replacements applied to `resource` so far.
    pub fn version(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Domains => self.domains.version(),
            Resource::Templates => self.templates.version(),
            Resource::Scans => self.scans.version(),
            Resource::MultiScans => self.multi_scans.version(),
            Resource::ScheduledScans => self.scheduled_scans.version(),
        }
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn domains_snapshot(&self) -> Arc<Vec<Arc<Domain>>> {
        self.domains.snapshot()
    }

    pub fn templates_snapshot(&self) -> Arc<Vec<Arc<Template>>> {
        self.templates.snapshot()
    }

    pub fn scans_snapshot(&self) -> Arc<Vec<Arc<Scan>>> {
        self.scans.snapshot()
    }

    pub fn multi_scans_snapshot(&self) -> Arc<Vec<Arc<MultiScan>>> {
        self.multi_scans.snapshot()
    }

    pub fn scheduled_scans_snapshot(&self) -> Arc<Vec<Arc<ScheduledScan>>> {
        self.scheduled_scans.snapshot()
    }

    // ── Streams ──────────────────────────────────────────────────────

    pub fn domains(&self) -> EntityStream<Domain> {
        EntityStream::new(self.domains.subscribe())
    }

    pub fn templates(&self) -> EntityStream<Template> {
        EntityStream::new(self.templates.subscribe())
    }

    pub fn scans(&self) -> EntityStream<Scan> {
        EntityStream::new(self.scans.subscribe())
    }

    pub fn multi_scans(&self) -> EntityStream<MultiScan> {
        EntityStream::new(self.multi_scans.subscribe())
    }

    pub fn scheduled_scans(&self) -> EntityStream<ScheduledScan> {
        EntityStream::new(self.scheduled_scans.subscribe())
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn domain(&self, id: &EntityId) -> Option<Arc<Domain>> {
        self.domains.get(id)
    }

    pub fn template(&self, id: &EntityId) -> Option<Arc<Template>> {
        self.templates.get(id)
    }

    pub fn scan(&self, id: &EntityId) -> Option<Arc<Scan>> {
        self.scans.get(id)
    }

    pub fn scheduled_scan(&self, id: &EntityId) -> Option<Arc<ScheduledScan>> {
        self.scheduled_scans.get(id)
    }

    /// Hostname for `id`, or the "Unknown Domain" placeholder when the
    /// domain list is missing, stale, or failed to load.
    pub fn domain_name(&self, id: &EntityId) -> String {
        self.domains
            .get(id)
            .map_or_else(|| UNKNOWN_DOMAIN.to_owned(), |d| d.name.clone())
    }

    /// Template display name, falling back to the raw id.
    pub fn template_name(&self, id: &EntityId) -> String {
        self.templates
            .get(id)
            .map_or_else(|| id.to_string(), |t| t.name.clone())
    }

    /// Every known hostname, in store order.
    pub fn domain_names(&self) -> Vec<String> {
        self.domains
            .snapshot()
            .iter()
            .map(|d| d.name.clone())
            .collect()
    }

    /// Every known template id, in store order.
    pub fn template_ids(&self) -> Vec<EntityId> {
        self.templates
            .snapshot()
            .iter()
            .map(|t| t.id().clone())
            .collect()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::convert::parse_timestamp;

    fn domain(id: &str, name: &str, at: Option<&str>) -> Domain {
        Domain {
            id: EntityId::from(id),
            name: name.into(),
            uploaded_at: at.and_then(parse_timestamp),
            owner_id: None,
        }
    }

    #[test]
    fn domains_sorted_newest_first_after_each_replace() {
        let store = DataStore::new();
        store.replace_domains(vec![
            domain("1", "old.com", Some("2024-01-01")),
            domain("2", "undated.com", None),
            domain("3", "new.com", Some("2024-06-01")),
        ]);
        let names: Vec<_> = store.domains_snapshot().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["new.com", "old.com", "undated.com"]);

        store.replace_domains(vec![
            domain("4", "a.com", Some("2023-01-01")),
            domain("5", "b.com", Some("2025-01-01")),
        ]);
        let names: Vec<_> = store.domains_snapshot().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["b.com", "a.com"]);
    }

    #[test]
    fn unknown_domain_fallback() {
        let store = DataStore::new();
        assert_eq!(store.domain_name(&EntityId::from("missing")), UNKNOWN_DOMAIN);

        store.replace_domains(vec![domain("d1", "a.com", None)]);
        assert_eq!(store.domain_name(&EntityId::from("d1")), "a.com");
        assert_eq!(store.domain_names(), vec!["a.com".to_owned()]);
    }

    #[test]
    fn resource_names_are_kebab_case() {
        assert_eq!(Resource::ScheduledScans.to_string(), "scheduled-scans");
        assert_eq!(Resource::MultiScans.as_ref(), "multi-scans");
    }
}
