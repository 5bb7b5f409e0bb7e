use std::sync::Arc;

use crate::model::{Deviation, DeviationFilters, Pagination};

/// Process-wide deviation state.
///
/// Immutable once published: the store replaces the whole value on every
/// effective mutation, so two snapshots that are `Arc::ptr_eq` are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviationState {
    /// Records in server response order.
    pub records: Vec<Arc<Deviation>>,
    pub selected: Option<Arc<Deviation>>,
    pub filters: DeviationFilters,
    pub pagination: Pagination,
    /// True while a facade operation's request is in flight.
    pub loading: bool,
    /// Failure message of the last operation.
    pub error: Option<String>,
}

impl DeviationState {
    pub fn record(&self, id: &str) -> Option<&Arc<Deviation>> {
        self.records.iter().find(|d| d.id == id)
    }
}
