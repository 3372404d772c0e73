use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entity, EntityId};

/// A reusable scan ruleset. Read-only on this side of the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: EntityId,
    /// Human-facing identifier from the template file itself.
    pub template_id: String,
    pub name: String,
    pub description: String,
    pub artifact_url: String,
    pub metadata: Option<Value>,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Template {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
