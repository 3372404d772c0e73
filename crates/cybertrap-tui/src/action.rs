//! Every state change in the TUI travels through [`Action`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use cybertrap_core::view::ScheduleRow;
use cybertrap_core::{
    Command, Domain, EntityId, LoadState, MultiScan, Notification, Resource, Scan,
    ScanSubmission, Template,
};

use crate::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

/// A transient message in the corner of the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
}

impl Toast {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: ToastLevel::Error,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: ToastLevel::Info,
        }
    }
}

impl From<&Notification> for Toast {
    fn from(n: &Notification) -> Self {
        Self {
            message: n.message.clone(),
            level: if n.is_failure() {
                ToastLevel::Error
            } else {
                ToastLevel::Success
            },
        }
    }
}

/// A mutation waiting on a y/n answer.
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    DeleteDomain { id: EntityId, name: String },
    DeleteScheduledScan { id: EntityId, label: String },
    ScanAllDomains(ScanSubmission),
}

impl ConfirmAction {
    pub fn into_command(self) -> Command {
        match self {
            Self::DeleteDomain { id, .. } => Command::DeleteDomain { id },
            Self::DeleteScheduledScan { id, .. } => Command::DeleteScheduledScan { id },
            Self::ScanAllDomains(submission) => Command::StartScan(submission),
        }
    }
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteDomain { name, .. } => write!(f, "Delete domain {name}?"),
            Self::DeleteScheduledScan { label, .. } => {
                write!(f, "Delete the scheduled scan for {label}?")
            }
            Self::ScanAllDomains(submission) => write!(
                f,
                "Scan all {} domains with every template?",
                submission.domain_count()
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Store updates (from the data bridge) ──────────────────────
    DomainsUpdated(Arc<Vec<Arc<Domain>>>),
    TemplatesUpdated(Arc<Vec<Arc<Template>>>),
    ScansUpdated(Arc<Vec<Arc<Scan>>>),
    MultiScansUpdated(Arc<Vec<Arc<MultiScan>>>),
    ScheduleRowsUpdated(Arc<Vec<Arc<ScheduleRow>>>),
    LoadStateChanged(Resource, LoadState),

    // ── Requests to the controller ────────────────────────────────
    /// Re-fetch everything the active screen shows.
    Refresh,
    Execute(Command),
    /// Read the file off the event loop, then upload its domains.
    UploadFile(PathBuf),
    CommandDone { affects: Resource, succeeded: bool },
    OpenScanDetail(EntityId),
    ScanDetailLoaded(Arc<Scan>),
    ScanDetailFailed { id: EntityId, message: String },

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Toasts ────────────────────────────────────────────────────
    Notify(Toast),
}

impl Action {
    /// Actions every screen sees, mounted or not.
    pub fn is_broadcast(&self) -> bool {
        matches!(
            self,
            Self::DomainsUpdated(_)
                | Self::TemplatesUpdated(_)
                | Self::ScansUpdated(_)
                | Self::MultiScansUpdated(_)
                | Self::ScheduleRowsUpdated(_)
                | Self::LoadStateChanged(..)
                | Self::CommandDone { .. }
                | Self::ScanDetailLoaded(_)
                | Self::ScanDetailFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use cybertrap_core::NotificationLevel;

    use super::*;

    #[test]
    fn failure_notifications_become_error_toasts() {
        let n = Notification {
            level: NotificationLevel::Failure,
            message: "Failed to add domain: boom".into(),
            at: Utc::now(),
        };
        let toast = Toast::from(&n);
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Failed to add domain: boom");
    }

    #[test]
    fn confirm_maps_to_command() {
        let confirm = ConfirmAction::DeleteScheduledScan {
            id: EntityId::from("s1"),
            label: "a.com".into(),
        };
        assert_eq!(confirm.to_string(), "Delete the scheduled scan for a.com?");
        assert!(matches!(
            confirm.into_command(),
            Command::DeleteScheduledScan { id } if id == EntityId::from("s1")
        ));

        let all = ConfirmAction::ScanAllDomains(ScanSubmission::AllDomains {
            domains: vec!["a.com".into(), "b.com".into()],
        });
        assert_eq!(all.to_string(), "Scan all 2 domains with every template?");
    }
}
