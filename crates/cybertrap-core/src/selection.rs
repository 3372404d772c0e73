// ── Selection and form controllers ──
//
// "Select all" is its own state, never an enumerated id list. Forms
// turn selections into backend requests and refuse to build one that
// the backend would reject.

use chrono::NaiveDate;
use indexmap::IndexSet;
use thiserror::Error;

use crate::command::requests::{ScanSubmission, ScheduleRequest};
use crate::model::EntityId;

/// Why a selection or form change was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("individual items cannot be picked while \"select all\" is active")]
    AllSelected,

    #[error("templates cannot be picked while all domains are selected")]
    TemplatesLocked,

    #[error("select at least one domain or \"all domains\"")]
    NoDomains,

    #[error("select at least one template or \"all templates\"")]
    NoTemplates,

    #[error("pick a date for the scheduled scan")]
    NoDate,

    #[error("there are no domains to scan")]
    NothingToScan,
}

// ── Selection ───────────────────────────────────────────────────────

/// Multi-select state over one axis (domains or templates).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<Id: std::hash::Hash + Eq> {
    #[default]
    None,
    /// Items the user picked, in the order they were picked.
    Explicit(IndexSet<Id>),
    /// Every current and future item.
    All,
}

impl<Id: std::hash::Hash + Eq + Clone> Selection<Id> {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_selected(&self, id: &Id) -> bool {
        match self {
            Self::None => false,
            Self::Explicit(ids) => ids.contains(id),
            Self::All => true,
        }
    }

    /// Explicitly picked ids; empty for `None` and `All`.
    pub fn explicit_ids(&self) -> Vec<Id> {
        match self {
            Self::Explicit(ids) => ids.iter().cloned().collect(),
            Self::None | Self::All => Vec::new(),
        }
    }

    /// `None`/`Explicit` → `All`; `All` → `None`. Any explicit subset is dropped.
    pub fn toggle_all(&mut self) {
        *self = if self.is_all() { Self::None } else { Self::All };
    }

    /// Flip one item. Refused while `All` is active.
    pub fn toggle(&mut self, id: Id) -> Result<(), SelectionError> {
        if self.is_selected(&id) {
            self.deselect(&id)
        } else {
            self.select(id)
        }
    }

    pub fn select(&mut self, id: Id) -> Result<(), SelectionError> {
        match self {
            Self::All => Err(SelectionError::AllSelected),
            Self::Explicit(ids) => {
                ids.insert(id);
                Ok(())
            }
            Self::None => {
                *self = Self::Explicit(IndexSet::from([id]));
                Ok(())
            }
        }
    }

    pub fn deselect(&mut self, id: &Id) -> Result<(), SelectionError> {
        match self {
            Self::All => Err(SelectionError::AllSelected),
            Self::Explicit(ids) => {
                ids.shift_remove(id);
                if ids.is_empty() {
                    *self = Self::None;
                }
                Ok(())
            }
            Self::None => Ok(()),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::None;
    }
}

// ── Single choice ───────────────────────────────────────────────────

/// Single-select state with an "all" shortcut (the schedule domain picker).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Choice<Id> {
    #[default]
    None,
    One(Id),
    All,
}

impl<Id: PartialEq> Choice<Id> {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn toggle_all(&mut self) {
        *self = if self.is_all() { Self::None } else { Self::All };
    }

    /// Pick `id`, replacing any previous pick. Refused while `All` is active.
    pub fn pick(&mut self, id: Id) -> Result<(), SelectionError> {
        if self.is_all() {
            return Err(SelectionError::AllSelected);
        }
        *self = Self::One(id);
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::None;
    }
}

// ── Immediate scan form ─────────────────────────────────────────────

/// Domain and template pickers for starting scans right away.
///
/// Selecting all domains locks the template picker: the all-domains
/// endpoint always runs every template. Selecting all templates leaves
/// the domain picker usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanForm {
    pub domains: Selection<EntityId>,
    pub templates: Selection<EntityId>,
}

impl ScanForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn templates_enabled(&self) -> bool {
        !self.domains.is_all()
    }

    pub fn toggle_all_domains(&mut self) {
        self.domains.toggle_all();
        if self.domains.is_all() {
            self.templates.clear();
        }
    }

    pub fn toggle_domain(&mut self, id: EntityId) -> Result<(), SelectionError> {
        self.domains.toggle(id)
    }

    pub fn toggle_all_templates(&mut self) -> Result<(), SelectionError> {
        if !self.templates_enabled() {
            return Err(SelectionError::TemplatesLocked);
        }
        self.templates.toggle_all();
        Ok(())
    }

    pub fn toggle_template(&mut self, id: EntityId) -> Result<(), SelectionError> {
        if !self.templates_enabled() {
            return Err(SelectionError::TemplatesLocked);
        }
        self.templates.toggle(id)
    }

    /// Validate and assemble the request. `known_domains` supplies the
    /// hostnames for the all-domains variant.
    pub fn submission(&self, known_domains: &[String]) -> Result<ScanSubmission, SelectionError> {
        match &self.domains {
            Selection::None => Err(SelectionError::NoDomains),
            Selection::All => {
                if known_domains.is_empty() {
                    Err(SelectionError::NothingToScan)
                } else {
                    Ok(ScanSubmission::AllDomains {
                        domains: known_domains.to_vec(),
                    })
                }
            }
            Selection::Explicit(ids) => {
                let domain_ids: Vec<EntityId> = ids.iter().cloned().collect();
                match &self.templates {
                    Selection::None => Err(SelectionError::NoTemplates),
                    Selection::All => Ok(ScanSubmission::Domains {
                        domain_ids,
                        template_ids: Vec::new(),
                        all_templates: true,
                    }),
                    Selection::Explicit(t) => Ok(ScanSubmission::Domains {
                        domain_ids,
                        template_ids: t.iter().cloned().collect(),
                        all_templates: false,
                    }),
                }
            }
        }
    }

    /// Back to an empty form, after a successful submission.
    pub fn reset(&mut self) {
        self.domains.clear();
        self.templates.clear();
    }
}

// ── Schedule form ───────────────────────────────────────────────────

/// Domain, template, and date pickers for scheduling a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleForm {
    pub domain: Choice<EntityId>,
    pub templates: Selection<EntityId>,
    pub date: Option<NaiveDate>,
}

impl ScheduleForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn templates_enabled(&self) -> bool {
        !self.domain.is_all()
    }

    pub fn toggle_all_domains(&mut self) {
        self.domain.toggle_all();
        if self.domain.is_all() {
            self.templates.clear();
        }
    }

    pub fn pick_domain(&mut self, id: EntityId) -> Result<(), SelectionError> {
        self.domain.pick(id)
    }

    pub fn toggle_all_templates(&mut self) -> Result<(), SelectionError> {
        if !self.templates_enabled() {
            return Err(SelectionError::TemplatesLocked);
        }
        self.templates.toggle_all();
        Ok(())
    }

    pub fn toggle_template(&mut self, id: EntityId) -> Result<(), SelectionError> {
        if !self.templates_enabled() {
            return Err(SelectionError::TemplatesLocked);
        }
        self.templates.toggle(id)
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.date = date;
    }

    pub fn submission(&self) -> Result<ScheduleRequest, SelectionError> {
        let (domain_id, template_ids, scan_all) = match &self.domain {
            Choice::None => return Err(SelectionError::NoDomains),
            Choice::All => (None, Vec::new(), true),
            Choice::One(id) => match &self.templates {
                Selection::None => return Err(SelectionError::NoTemplates),
                Selection::All => (Some(id.clone()), Vec::new(), false),
                Selection::Explicit(t) => (Some(id.clone()), t.iter().cloned().collect(), false),
            },
        };
        let date = self.date.ok_or(SelectionError::NoDate)?;

        Ok(ScheduleRequest {
            domain_id,
            template_ids,
            scan_all,
            date,
        })
    }

    pub fn reset(&mut self) {
        self.domain.clear();
        self.templates.clear();
        self.date = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(s: &str) -> EntityId {
        EntityId::from(s)
    }

    #[test]
    fn toggle_all_clears_explicit_subset_and_toggles_back_to_none() {
        let mut sel = Selection::<EntityId>::None;
        sel.select(id("a")).unwrap();
        sel.select(id("b")).unwrap();

        sel.toggle_all();
        assert_eq!(sel, Selection::All);
        assert!(sel.explicit_ids().is_empty());

        sel.toggle_all();
        assert_eq!(sel, Selection::None);
    }

    #[test]
    fn individual_picks_refused_while_all() {
        let mut sel = Selection::<EntityId>::All;
        assert_eq!(sel.toggle(id("a")), Err(SelectionError::AllSelected));
        assert_eq!(sel.deselect(&id("a")), Err(SelectionError::AllSelected));
        assert!(sel.is_all());
    }

    #[test]
    fn deselecting_last_item_returns_to_none() {
        let mut sel = Selection::<EntityId>::None;
        sel.toggle(id("a")).unwrap();
        assert!(sel.is_selected(&id("a")));
        sel.toggle(id("a")).unwrap();
        assert!(sel.is_none());
    }

    #[test]
    fn explicit_keeps_pick_order_without_duplicates() {
        let mut sel = Selection::<EntityId>::None;
        for s in ["c", "a", "c", "b"] {
            sel.select(id(s)).unwrap();
        }
        assert_eq!(sel.explicit_ids(), vec![id("c"), id("a"), id("b")]);
    }

    #[test]
    fn all_templates_submits_flag_not_enumeration() {
        let templates = [id("t1"), id("t2"), id("t3")];
        let mut form = ScanForm::new();
        form.toggle_domain(id("d1")).unwrap();
        for t in &templates {
            form.toggle_template(t.clone()).unwrap();
        }
        form.toggle_all_templates().unwrap();

        assert_eq!(
            form.submission(&[]).unwrap(),
            ScanSubmission::Domains {
                domain_ids: vec![id("d1")],
                template_ids: vec![],
                all_templates: true,
            }
        );
    }

    #[test]
    fn all_domains_locks_templates() {
        let mut form = ScanForm::new();
        form.toggle_template(id("t1")).unwrap();
        form.toggle_all_domains();

        assert!(!form.templates_enabled());
        assert!(form.templates.is_none());
        assert_eq!(form.toggle_template(id("t2")), Err(SelectionError::TemplatesLocked));
        assert_eq!(form.toggle_all_templates(), Err(SelectionError::TemplatesLocked));

        let names = vec!["a.com".to_owned(), "b.com".to_owned()];
        assert_eq!(
            form.submission(&names).unwrap(),
            ScanSubmission::AllDomains { domains: names }
        );
        assert_eq!(form.submission(&[]), Err(SelectionError::NothingToScan));
    }

    #[test]
    fn all_templates_keeps_domains_usable() {
        let mut form = ScanForm::new();
        form.toggle_all_templates().unwrap();
        assert!(form.toggle_domain(id("d1")).is_ok());
        assert!(form.toggle_domain(id("d2")).is_ok());
    }

    #[test]
    fn scan_validation() {
        let mut form = ScanForm::new();
        assert_eq!(form.submission(&[]), Err(SelectionError::NoDomains));
        form.toggle_domain(id("d1")).unwrap();
        assert_eq!(form.submission(&[]), Err(SelectionError::NoTemplates));
        form.toggle_template(id("t1")).unwrap();
        assert!(form.submission(&[]).is_ok());

        form.reset();
        assert_eq!(form, ScanForm::new());
    }

    #[test]
    fn schedule_all_domains_sends_scan_all_with_no_ids() {
        let mut form = ScheduleForm::new();
        form.toggle_all_domains();
        form.set_date(NaiveDate::from_ymd_opt(2030, 1, 15));

        let req = form.submission().unwrap();
        assert!(req.scan_all);
        assert!(req.domain_id.is_none());
        assert!(req.template_ids.is_empty());
    }

    #[test]
    fn schedule_requires_date_and_templates() {
        let mut form = ScheduleForm::new();
        assert_eq!(form.submission(), Err(SelectionError::NoDomains));

        form.pick_domain(id("d1")).unwrap();
        assert_eq!(form.submission(), Err(SelectionError::NoTemplates));

        form.toggle_template(id("t1")).unwrap();
        assert_eq!(form.submission(), Err(SelectionError::NoDate));

        form.set_date(NaiveDate::from_ymd_opt(2030, 1, 15));
        let req = form.submission().unwrap();
        assert_eq!(req.domain_id, Some(id("d1")));
        assert_eq!(req.template_ids, vec![id("t1")]);
        assert!(!req.scan_all);

        form.reset();
        assert_eq!(form, ScheduleForm::new());
    }

    #[test]
    fn schedule_domain_pick_refused_while_all() {
        let mut form = ScheduleForm::new();
        form.toggle_all_domains();
        assert_eq!(form.pick_domain(id("d1")), Err(SelectionError::AllSelected));
        form.toggle_all_domains();
        assert!(form.pick_domain(id("d1")).is_ok());
    }
}
