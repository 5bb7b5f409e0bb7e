// ── Reactive deviation store ──

mod deviation_store;
mod state;
mod views;

pub use deviation_store::{DeviationStore, LoadingGuard};
pub use state::DeviationState;
