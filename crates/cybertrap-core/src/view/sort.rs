use std::cmp::Ordering;

use super::{FieldValue, ViewField, Viewable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F: ViewField> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: ViewField> SortKey<F> {
    pub fn ascending(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    /// Sorting by the current field again flips the direction; a new
    /// field starts ascending.
    pub fn toggled(current: Option<Self>, field: F) -> Self {
        match current {
            Some(key) if key.field == field => Self {
                field,
                direction: key.direction.flipped(),
            },
            _ => Self::ascending(field),
        }
    }

    pub fn compare<T: Viewable<Field = F>>(&self, a: &T, b: &T) -> Ordering {
        let ord = compare_values(&a.field(self.field), &b.field(self.field));
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Case-insensitive for strings, chronological for dates. Values of
/// different kinds compare equal so a stable sort keeps their order.
fn compare_values(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Text(a) | FieldValue::Enum(a), FieldValue::Text(b) | FieldValue::Enum(b)) => {
            fold(a).cmp(&fold(b))
        }
        (FieldValue::List(a), FieldValue::List(b)) => {
            let a: Vec<String> = a.iter().map(|s| fold(s)).collect();
            let b: Vec<String> = b.iter().map(|s| fold(s)).collect();
            a.cmp(&b)
        }
        (FieldValue::Date(a), FieldValue::Date(b)) => {
            a.map(|d| d.timestamp_millis()).cmp(&b.map(|d| d.timestamp_millis()))
        }
        (FieldValue::Number(a), FieldValue::Number(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
