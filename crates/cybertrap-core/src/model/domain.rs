use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId};

/// Placeholder shown when a domain id cannot be resolved to a name.
pub const UNKNOWN_DOMAIN: &str = "Unknown Domain";

/// A scan target hostname.
///
/// Created by an explicit add or a bulk upload and never edited
/// afterwards; the only mutation is deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: EntityId,
    #[serde(rename = "domain")]
    pub name: String,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub owner_id: Option<String>,
}

impl Entity for Domain {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// Normalize and validate a hostname typed by the user.
///
/// Returns the trimmed, lowercased name, or `None` if it is empty or
/// contains whitespace.
pub fn normalize_domain_name(raw: &str) -> Option<String> {
    let name = raw.trim().trim_end_matches('.');
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_names() {
        assert_eq!(
            normalize_domain_name("  Example.COM. ").as_deref(),
            Some("example.com")
        );
        assert_eq!(normalize_domain_name("   "), None);
        assert_eq!(normalize_domain_name("a b.com"), None);
    }
}
