// ── Core identity type ──
//
// Every backend entity is keyed by an opaque string id (a database
// ObjectId in practice). The newtype keeps ids from mixing with names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical identifier for any backend entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        let trimmed = s.trim();
        if trimmed.len() == s.len() {
            Self(s)
        } else {
            Self(trimmed.to_owned())
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_owned())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Anything stored in an entity collection.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> &EntityId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_trimmed() {
        assert_eq!(EntityId::from(" 64f0a1 ").as_str(), "64f0a1");
        assert_eq!(EntityId::from("abc".to_owned()).to_string(), "abc");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = EntityId::from("d1");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"d1\""));
    }
}
