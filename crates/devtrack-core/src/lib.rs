// devtrack-core: Reactive deviation state between devtrack-api and consumers (CLI/TUI).

pub mod config;
pub mod error;
pub mod facade;
pub mod form;
pub mod model;
pub mod navigation;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, TlsVerification};
pub use error::CoreError;
pub use facade::{DeviationFacade, FailureKind};
pub use form::{DeviationForm, FormField};
pub use navigation::{Confirm, Route, UnsavedChangesGuard, resolve_deviation};
pub use store::{DeviationState, DeviationStore, LoadingGuard};
pub use stream::StateStream;

pub use model::{
    CreateDeviation, Deviation, DeviationFilters, DeviationPatch, DeviationPriority,
    DeviationStats, DeviationStatus, FilterUpdate, ListParams, Page, Pagination,
    PaginationUpdate, SortOrder, UpdateDeviation,
};
