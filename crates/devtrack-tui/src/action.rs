//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use devtrack_core::navigation::UNSAVED_CHANGES_MESSAGE;
use devtrack_core::{
    CreateDeviation, Deviation, DeviationState, FilterUpdate, Route, UpdateDeviation,
};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification shown in the status bar.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Pending confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Leave a dirty form for `Route`.
    LeaveForm(Route),
    DeleteDeviation { id: String, title: String },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeaveForm(_) => f.write_str(UNSAVED_CHANGES_MESSAGE),
            Self::DeleteDeviation { title, .. } => {
                write!(f, "Delete \"{title}\"? This cannot be undone.")
            }
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Navigation ────────────────────────────────────────────────
    /// Guarded navigation request.
    Navigate(Route),
    /// Sent to screens once a route is active.
    RouteEntered(Route),
    FocusNav,
    FocusContent,

    // ── Store ─────────────────────────────────────────────────────
    StateUpdated(Arc<DeviationState>),

    // ── Deviation list ────────────────────────────────────────────
    Reload,
    LoadPage(u32),
    SetFilters(FilterUpdate),
    ClearFilters,

    // ── Form ──────────────────────────────────────────────────────
    /// Result of resolving the record behind an edit route.
    FormLoaded(Option<Arc<Deviation>>),
    SubmitCreate(CreateDeviation),
    SubmitUpdate(String, UpdateDeviation),
    /// Outcome of the last submit.
    SaveFinished(bool),

    // ── Confirm Dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
