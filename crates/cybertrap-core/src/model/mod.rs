// ── Domain model ──
//
// Typed entities the rest of the workspace works with. Wire types from
// `cybertrap-api` are converted into these in `crate::convert`.

pub mod domain;
pub mod entity_id;
pub mod scan;
pub mod schedule;
pub mod template;

pub use domain::{Domain, UNKNOWN_DOMAIN, normalize_domain_name};
pub use entity_id::{Entity, EntityId};
pub use scan::{ALL_TEMPLATES, MultiScan, MultiScanStatus, Scan, ScanStatus};
pub use schedule::{ALL_DOMAINS, ScheduledScan};
pub use template::Template;
