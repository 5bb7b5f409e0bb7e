use serde::{Deserialize, Serialize};

use super::{Deviation, DeviationPriority, DeviationStatus};

/// Active list filters. Each is independently optional; present filters
/// are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviationFilters {
    pub status: Option<DeviationStatus>,
    pub priority: Option<DeviationPriority>,
    pub search: Option<String>,
}

impl DeviationFilters {
    /// Search term that actually constrains the list (empty means none).
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.search_term().is_none()
    }

    pub fn matches(&self, deviation: &Deviation) -> bool {
        if self.status.is_some_and(|s| deviation.status != s) {
            return false;
        }
        if self.priority.is_some_and(|p| deviation.priority != p) {
            return false;
        }
        match self.search_term() {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                deviation.title.to_lowercase().contains(&needle)
                    || deviation.description.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Partial filter change.
///
/// Outer `None` keeps the current value; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub status: Option<Option<DeviationStatus>>,
    pub priority: Option<Option<DeviationPriority>>,
    pub search: Option<Option<String>>,
}

impl FilterUpdate {
    pub fn status(status: Option<DeviationStatus>) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn priority(priority: Option<DeviationPriority>) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn search(search: Option<String>) -> Self {
        Self {
            search: Some(search),
            ..Self::default()
        }
    }

    pub(crate) fn apply_to(self, filters: &mut DeviationFilters) {
        if let Some(status) = self.status {
            filters.status = status;
        }
        if let Some(priority) = self.priority {
            filters.priority = priority;
        }
        if let Some(search) = self.search {
            filters.search = search;
        }
    }
}

/// Set every filter that is present in `filters`, keep the rest.
impl From<DeviationFilters> for FilterUpdate {
    fn from(filters: DeviationFilters) -> Self {
        Self {
            status: filters.status.map(Some),
            priority: filters.priority.map(Some),
            search: filters.search.map(Some),
        }
    }
}
