// ── Central reactive deviation store ──
//
// Holds one `Arc<DeviationState>` in a `watch` channel. Mutations clone,
// change, and publish a fresh `Arc` only when the value actually changed.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use super::state::DeviationState;
use crate::model::{Deviation, DeviationPatch, FilterUpdate, PaginationUpdate};
use crate::stream::StateStream;

/// Reactive holder of the deviation state.
///
/// The only way to change state is through the named mutations below.
/// Subscribers are notified once per effective change; a mutation that
/// leaves the state equal keeps the current `Arc` and notifies nobody.
pub struct DeviationStore {
    state: watch::Sender<Arc<DeviationState>>,
}

impl DeviationStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arc::new(DeviationState::default()));
        Self { state }
    }

    // ── Snapshot access ──────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<DeviationState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.state.subscribe())
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Apply `change` to a copy of the state and publish it if different.
    /// Returns `true` when subscribers were notified.
    fn update(&self, op: &'static str, change: impl FnOnce(&mut DeviationState)) -> bool {
        let modified = self.state.send_if_modified(|current| {
            let mut next = DeviationState::clone(current);
            change(&mut next);
            if next == **current {
                false
            } else {
                *current = Arc::new(next);
                true
            }
        });
        trace!(op, modified, "store mutation");
        modified
    }

    /// Replace the record list wholesale.
    pub fn set_records(&self, records: Vec<Deviation>) -> bool {
        self.update("set_records", |s| {
            s.records = records.into_iter().map(Arc::new).collect();
        })
    }

    /// Append one record.
    pub fn push(&self, record: Deviation) -> bool {
        self.update("push", |s| s.records.push(Arc::new(record)))
    }

    /// Overwrite the present fields of the record with `id`. No-op when
    /// the id is not in the list.
    pub fn patch(&self, id: &str, patch: &DeviationPatch) -> bool {
        self.update("patch", |s| {
            if let Some(slot) = s.records.iter_mut().find(|d| d.id == id) {
                patch.apply_to(Arc::make_mut(slot));
            }
        })
    }

    /// Drop the record with `id`, keeping the order of the rest.
    pub fn remove(&self, id: &str) -> bool {
        self.update("remove", |s| s.records.retain(|d| d.id != id))
    }

    pub fn set_selected(&self, selected: Option<Deviation>) -> bool {
        self.update("set_selected", |s| s.selected = selected.map(Arc::new))
    }

    pub fn set_loading(&self, loading: bool) -> bool {
        self.update("set_loading", |s| s.loading = loading)
    }

    pub fn set_error(&self, error: Option<String>) -> bool {
        self.update("set_error", |s| s.error = error)
    }

    pub fn merge_filters(&self, update: FilterUpdate) -> bool {
        self.update("merge_filters", |s| update.apply_to(&mut s.filters))
    }

    pub fn clear_filters(&self) -> bool {
        self.update("clear_filters", |s| s.filters = Default::default())
    }

    pub fn merge_pagination(&self, update: PaginationUpdate) -> bool {
        self.update("merge_pagination", |s| update.apply_to(&mut s.pagination))
    }

    /// Back to the initial state.
    pub fn reset(&self) -> bool {
        self.update("reset", |s| *s = DeviationState::default())
    }

    // ── Operation scope ──────────────────────────────────────────────

    /// Start a network-backed operation: clears the error and raises
    /// `loading` until the returned guard is dropped.
    pub fn begin_operation(&self) -> LoadingGuard<'_> {
        self.update("begin_operation", |s| {
            s.error = None;
            s.loading = true;
        });
        LoadingGuard { store: self }
    }
}

impl Default for DeviationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps `loading` raised for the lifetime of an operation.
///
/// Dropping it, on success, failure, early return, unwinding or a
/// cancelled future, lowers the flag.
#[must_use = "loading is cleared as soon as the guard is dropped"]
pub struct LoadingGuard<'a> {
    store: &'a DeviationStore,
}

impl LoadingGuard<'_> {
    /// Record a failure message for the running operation.
    pub fn fail(&self, message: impl Into<String>) {
        self.store.set_error(Some(message.into()));
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.set_loading(false);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{DeviationPriority, DeviationStatus};

    fn dev(id: &str) -> Deviation {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        Deviation {
            id: id.into(),
            title: format!("Deviation {id}"),
            description: "Observed during inspection".into(),
            status: DeviationStatus::Open,
            priority: DeviationPriority::Medium,
            category: "Process".into(),
            created_by: "alice".into(),
            created_at: at,
            updated_at: at,
            assigned_to: None,
            due_date: None,
            tags: None,
        }
    }

    fn ids(store: &DeviationStore) -> Vec<String> {
        store
            .snapshot()
            .records
            .iter()
            .map(|d| d.id.clone())
            .collect()
    }

    #[test]
    fn initial_state() {
        let store = DeviationStore::new();
        let s = store.snapshot();
        assert!(s.records.is_empty());
        assert!(!s.loading);
        assert_eq!(s.error, None);
        assert_eq!(s.pagination.page, 1);
        assert_eq!(s.pagination.page_size, 25);
    }

    #[test]
    fn push_patch_remove() {
        let store = DeviationStore::new();
        store.set_records(vec![dev("a"), dev("b"), dev("c")]);
        assert!(store.push(dev("d")));

        let patch = DeviationPatch {
            status: Some(DeviationStatus::Closed),
            ..DeviationPatch::default()
        };
        assert!(store.patch("b", &patch));
        assert_eq!(
            store.snapshot().record("b").unwrap().status,
            DeviationStatus::Closed
        );

        assert!(store.remove("a"));
        assert_eq!(ids(&store), vec!["b", "c", "d"]);
    }

    #[test]
    fn patch_and_remove_of_unknown_id_are_noops() {
        let store = DeviationStore::new();
        store.set_records(vec![dev("a")]);
        let before = store.snapshot();

        assert!(!store.patch(
            "zzz",
            &DeviationPatch {
                title: Some("x".into()),
                ..DeviationPatch::default()
            }
        ));
        assert!(!store.remove("zzz"));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn clear_filters_is_idempotent() {
        let store = DeviationStore::new();
        store.merge_filters(FilterUpdate::search(Some("pump".into())));

        assert!(store.clear_filters());
        let once = store.snapshot();
        assert!(!store.clear_filters());
        assert!(Arc::ptr_eq(&once, &store.snapshot()));
    }

    #[test]
    fn merge_filters_keeps_absent_fields() {
        let store = DeviationStore::new();
        store.merge_filters(FilterUpdate::status(Some(DeviationStatus::Open)));
        store.merge_filters(FilterUpdate::search(Some("pump".into())));

        let filters = store.snapshot().filters.clone();
        assert_eq!(filters.status, Some(DeviationStatus::Open));
        assert_eq!(filters.search.as_deref(), Some("pump"));

        store.merge_filters(FilterUpdate::status(None));
        assert_eq!(store.snapshot().filters.status, None);
        assert_eq!(store.snapshot().filters.search.as_deref(), Some("pump"));
    }

    #[test]
    fn merge_pagination_overrides_present_fields() {
        let store = DeviationStore::new();
        store.merge_pagination(PaginationUpdate {
            total: Some(120),
            ..PaginationUpdate::default()
        });
        let p = store.snapshot().pagination;
        assert_eq!((p.page, p.page_size, p.total), (1, 25, 120));
    }

    #[test]
    fn guard_clears_error_and_releases_loading() {
        let store = DeviationStore::new();
        store.set_error(Some("old failure".into()));

        {
            let guard = store.begin_operation();
            let s = store.snapshot();
            assert!(s.loading);
            assert_eq!(s.error, None);
            guard.fail("Failed to load deviations");
        }

        let s = store.snapshot();
        assert!(!s.loading);
        assert_eq!(s.error.as_deref(), Some("Failed to load deviations"));
    }

    #[test]
    fn guard_releases_loading_on_unwind() {
        let store = DeviationStore::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.begin_operation();
            panic!("operation blew up");
        }));
        assert!(result.is_err());
        assert!(!store.snapshot().loading);
    }

    #[test]
    fn reset_restores_defaults() {
        let store = DeviationStore::new();
        store.set_records(vec![dev("a")]);
        store.set_selected(Some(dev("a")));
        store.merge_filters(FilterUpdate::status(Some(DeviationStatus::Closed)));

        assert!(store.reset());
        assert_eq!(*store.snapshot(), DeviationState::default());
    }
}
