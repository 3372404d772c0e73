// ── Derived view engine ──
//
// Filtered, sorted, paginated projections over store snapshots. A
// projection is a pure function of (items, filters, sort, page); nothing
// here mutates the store.

mod fields;
mod filter;
mod page;
mod sort;
mod state;

use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};

pub use fields::{
    DomainField, MultiScanField, ScanField, ScheduleField, ScheduleRow, TemplateField,
};
pub use filter::{FilterSpec, Predicate};
pub use page::{DEFAULT_PAGE_SIZE, Pager};
pub use sort::{SortDirection, SortKey};
pub use state::{Projection, ViewState, ViewStatus};

/// A single field value as seen by filters and sorts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Free text. Filtered by substring, sorted case-insensitively.
    Text(Cow<'a, str>),
    /// Closed vocabulary (statuses). Filtered by exact match.
    Enum(Cow<'a, str>),
    /// Several values; a filter matches if any element matches.
    List(Vec<Cow<'a, str>>),
    /// Sorted chronologically; filtered against `YYYY-MM-DD HH:MM`.
    Date(Option<DateTime<Utc>>),
    Number(u64),
}

/// Field selector for one entity type.
pub trait ViewField: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Exact-match fields get an [`Predicate::Equals`] by default,
    /// everything else a [`Predicate::Contains`].
    fn is_exact(self) -> bool {
        false
    }
}

/// Something a view can filter and sort.
pub trait Viewable {
    type Field: ViewField;

    fn field(&self, field: Self::Field) -> FieldValue<'_>;
}
