use indexmap::IndexMap;

use super::{FieldValue, ViewField, Viewable};

const DATE_FILTER_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One field constraint. Needles are stored trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Contains(String),
    Equals(String),
}

impl Predicate {
    fn needle(&self) -> &str {
        match self {
            Self::Contains(n) | Self::Equals(n) => n,
        }
    }

    fn matches_str(&self, haystack: &str) -> bool {
        let haystack = haystack.trim().to_lowercase();
        match self {
            Self::Contains(n) => haystack.contains(n.as_str()),
            Self::Equals(n) => haystack == *n,
        }
    }

    pub fn matches(&self, value: &FieldValue<'_>) -> bool {
        match value {
            FieldValue::Text(s) | FieldValue::Enum(s) => self.matches_str(s),
            FieldValue::List(items) => items.iter().any(|s| self.matches_str(s)),
            FieldValue::Date(Some(dt)) => match self {
                Self::Contains(_) => self.matches_str(&dt.format(DATE_FILTER_FORMAT).to_string()),
                Self::Equals(n) => dt.format("%Y-%m-%d").to_string() == *n,
            },
            FieldValue::Date(None) => false,
            FieldValue::Number(n) => self.matches_str(&n.to_string()),
        }
    }
}

/// Active filters for one view, keyed by field.
///
/// Conjunctive: an item must satisfy every predicate. Setting a blank
/// value removes the constraint for that field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec<F: ViewField> {
    predicates: IndexMap<F, Predicate>,
}

impl<F: ViewField> Default for FilterSpec<F> {
    fn default() -> Self {
        Self {
            predicates: IndexMap::new(),
        }
    }
}

impl<F: ViewField> FilterSpec<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain `field` with its default predicate kind.
    ///
    /// Returns `true` if the filter set changed.
    pub fn set(&mut self, field: F, value: &str) -> bool {
        let needle = value.trim().to_lowercase();
        if needle.is_empty() {
            return self.predicates.shift_remove(&field).is_some();
        }
        let predicate = if field.is_exact() {
            Predicate::Equals(needle)
        } else {
            Predicate::Contains(needle)
        };
        self.predicates.insert(field, predicate.clone()) != Some(predicate)
    }

    pub fn remove(&mut self, field: F) -> bool {
        self.predicates.shift_remove(&field).is_some()
    }

    pub fn clear(&mut self) -> bool {
        let had_any = !self.predicates.is_empty();
        self.predicates.clear();
        had_any
    }

    pub fn get(&self, field: F) -> Option<&Predicate> {
        self.predicates.get(&field)
    }

    /// The needle currently applied to `field`, or `""`.
    pub fn value(&self, field: F) -> &str {
        self.predicates.get(&field).map_or("", Predicate::needle)
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &Predicate)> {
        self.predicates.iter().map(|(f, p)| (*f, p))
    }

    pub fn matches<T: Viewable<Field = F>>(&self, item: &T) -> bool {
        self.predicates
            .iter()
            .all(|(field, predicate)| predicate.matches(&item.field(*field)))
    }
}
