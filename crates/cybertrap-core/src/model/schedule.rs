use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId};

/// Label for a scheduled scan that covers every domain.
pub const ALL_DOMAINS: &str = "All Domains";

/// A deferred scan request, executed by the backend on `scheduled_date`.
///
/// When `scan_all` is set, `domain_id` is `None` and `template_ids` is
/// empty; conversion from the wire enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledScan {
    pub id: EntityId,
    pub domain_id: Option<EntityId>,
    pub template_ids: Vec<EntityId>,
    pub scheduled_date: Option<NaiveDate>,
    pub scan_all: bool,
}

impl Entity for ScheduledScan {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
