// cybertrap-core: Entity stores, derived views and scan forms shared by the CLI and TUI.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod notify;
pub mod scope;
pub mod selection;
pub mod store;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{
    Command, CommandResult, ScanSubmission, ScheduleRequest, UploadDomainsRequest,
};
pub use config::ClientConfig;
pub use controller::Controller;
pub use error::CoreError;
pub use notify::{Notification, NotificationLevel, Notifier};
pub use scope::ViewScope;
pub use selection::{Choice, ScanForm, ScheduleForm, Selection, SelectionError};
pub use store::{DataStore, LoadState, Resource};
pub use stream::EntityStream;

pub use model::{
    ALL_DOMAINS, ALL_TEMPLATES, Domain, Entity, EntityId, MultiScan, MultiScanStatus, Scan,
    ScanStatus, ScheduledScan, Template, UNKNOWN_DOMAIN,
};
