// Derived views. Pure projections of a snapshot, recomputed on each read.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::state::DeviationState;
use crate::model::{Deviation, DeviationPriority, DeviationStatus};

impl DeviationState {
    /// Records matching every active filter, in stored order.
    pub fn filtered(&self) -> Vec<Arc<Deviation>> {
        if self.filters.is_empty() {
            return self.records.clone();
        }
        self.records
            .iter()
            .filter(|d| self.filters.matches(d))
            .cloned()
            .collect()
    }

    /// Frequency of each status over all records (filters ignored).
    /// Only statuses that occur are present.
    pub fn counts_by_status(&self) -> BTreeMap<DeviationStatus, usize> {
        let mut counts = BTreeMap::new();
        for d in &self.records {
            *counts.entry(d.status).or_default() += 1;
        }
        counts
    }

    pub fn counts_by_priority(&self) -> BTreeMap<DeviationPriority, usize> {
        let mut counts = BTreeMap::new();
        for d in &self.records {
            *counts.entry(d.priority).or_default() += 1;
        }
        counts
    }
}
