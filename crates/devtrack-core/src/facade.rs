// ── Deviation facade ──
//
// The single entry point UI code uses. Every network-backed method runs
// the same envelope: clear error + raise loading, call the API, mutate
// the store on success or record a message on failure, lower loading.

use std::collections::BTreeMap;
use std::sync::Arc;

use devtrack_api::DeviationClient;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::{
    CreateDeviation, Deviation, DeviationFilters, DeviationPatch, DeviationPriority,
    DeviationStats, DeviationStatus, FilterUpdate, ListParams, Pagination, PaginationUpdate,
    UpdateDeviation,
};
use crate::store::{DeviationState, DeviationStore, LoadingGuard};
use crate::stream::StateStream;

const LOAD_LIST_FAILED: &str = "Failed to load deviations";
const LOAD_ONE_FAILED: &str = "Failed to load deviation";
const CREATE_FAILED: &str = "Failed to create deviation";
const UPDATE_FAILED: &str = "Failed to update deviation";
const DELETE_FAILED: &str = "Failed to delete deviation";
const STATS_FAILED: &str = "Failed to load statistics";

/// Coarse class of the last facade failure, for shells that need more
/// than the display message (exit codes, retry hints).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Connection,
    Timeout,
    /// Any other non-success status.
    Status(u16),
    /// Malformed response or client-side setup failure.
    Other,
}

impl FailureKind {
    pub fn classify(err: &devtrack_api::Error) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection
        } else if let Some(status) = err.status() {
            Self::Status(status)
        } else {
            Self::Other
        }
    }
}

/// Cheaply cloneable handle over the API client and the store.
///
/// Failures never come back as `Err`: they land in the store's `error`
/// and the method returns `false`/`None`.
#[derive(Clone)]
pub struct DeviationFacade {
    inner: Arc<FacadeInner>,
}

struct FacadeInner {
    api: DeviationClient,
    store: Arc<DeviationStore>,
    last_failure: watch::Sender<Option<FailureKind>>,
}

impl DeviationFacade {
    pub fn new(api: DeviationClient, store: Arc<DeviationStore>) -> Self {
        let (last_failure, _) = watch::channel(None);
        Self {
            inner: Arc::new(FacadeInner {
                api,
                store,
                last_failure,
            }),
        }
    }

    /// Build the API client from `config` with a fresh store.
    pub fn from_config(config: &ClientConfig) -> Result<Self, CoreError> {
        let api = DeviationClient::new(config.api_url.as_str(), &config.transport())?;
        Ok(Self::new(api, Arc::new(DeviationStore::new())))
    }

    pub fn api(&self) -> &DeviationClient {
        &self.inner.api
    }

    pub fn store(&self) -> &Arc<DeviationStore> {
        &self.inner.store
    }

    // ── Envelope ─────────────────────────────────────────────────────

    fn begin(&self) -> LoadingGuard<'_> {
        self.inner.last_failure.send_replace(None);
        self.inner.store.begin_operation()
    }

    /// Turn an API result into the envelope's outcome: the value on
    /// success, or `None` with the server message (else `fallback`)
    /// recorded in the store.
    fn settle<T>(
        &self,
        guard: &LoadingGuard<'_>,
        op: &'static str,
        result: Result<T, devtrack_api::Error>,
        fallback: &str,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(op, error = %e, "deviation operation failed");
                self.inner
                    .last_failure
                    .send_replace(Some(FailureKind::classify(&e)));
                guard.fail(e.server_message().unwrap_or(fallback));
                None
            }
        }
    }

    // ── Network-backed operations ────────────────────────────────────

    /// Fetch a page and replace the stored records with it.
    pub async fn load_list(&self, params: Option<&ListParams>) -> bool {
        debug!(?params, "loading deviations");
        let guard = self.begin();
        let result = self.inner.api.list(params).await;
        let Some(page) = self.settle(&guard, "load_list", result, LOAD_LIST_FAILED) else {
            return false;
        };

        debug!(count = page.data.len(), total = page.total, "deviations loaded");
        let store = &self.inner.store;
        store.set_records(page.data);
        store.merge_pagination(PaginationUpdate {
            page: Some(page.page),
            page_size: Some(page.page_size),
            total: Some(page.total),
        });
        true
    }

    /// Fetch one record into `selected`. On failure `selected` is untouched.
    pub async fn load_one(&self, id: &str) -> bool {
        debug!(id, "loading deviation");
        let guard = self.begin();
        let result = self.inner.api.get_deviation(id).await;
        match self.settle(&guard, "load_one", result, LOAD_ONE_FAILED) {
            Some(record) => {
                self.inner.store.set_selected(Some(record));
                true
            }
            None => false,
        }
    }

    /// Create a record and append the server's copy to the list.
    pub async fn create(&self, payload: &CreateDeviation) -> Option<Deviation> {
        debug!(title = %payload.title, "creating deviation");
        let guard = self.begin();
        let result = self.inner.api.create(payload).await;
        let created = self.settle(&guard, "create", result, CREATE_FAILED)?;

        debug!(id = %created.id, "deviation created");
        self.inner.store.push(created.clone());
        Some(created)
    }

    /// PATCH a record and merge the server's copy into the list.
    pub async fn update(&self, id: &str, payload: &UpdateDeviation) -> Option<Deviation> {
        debug!(id, "updating deviation");
        let guard = self.begin();
        let result = self.inner.api.update(id, payload).await;
        let updated = self.settle(&guard, "update", result, UPDATE_FAILED)?;

        self.inner
            .store
            .patch(id, &DeviationPatch::from(updated.clone()));
        Some(updated)
    }

    pub async fn delete(&self, id: &str) -> bool {
        debug!(id, "deleting deviation");
        let guard = self.begin();
        let result = self.inner.api.delete_deviation(id).await;
        if self.settle(&guard, "delete", result, DELETE_FAILED).is_none() {
            return false;
        }

        self.inner.store.remove(id);
        true
    }

    /// Server-side aggregate counts. The store is not changed on success.
    pub async fn load_stats(&self) -> Option<DeviationStats> {
        let guard = self.begin();
        let result = self.inner.api.stats().await;
        self.settle(&guard, "load_stats", result, STATS_FAILED)
    }

    // ── Local pass-throughs ──────────────────────────────────────────

    pub fn set_filters(&self, update: impl Into<FilterUpdate>) {
        self.inner.store.merge_filters(update.into());
    }

    pub fn clear_filters(&self) {
        self.inner.store.clear_filters();
    }

    pub fn select(&self, record: Option<Deviation>) {
        self.inner.store.set_selected(record);
    }

    pub fn reset(&self) {
        self.inner.store.reset();
    }

    // ── Read accessors ───────────────────────────────────────────────

    pub fn state(&self) -> Arc<DeviationState> {
        self.inner.store.snapshot()
    }

    pub fn records(&self) -> Vec<Arc<Deviation>> {
        self.state().records.clone()
    }

    pub fn filtered(&self) -> Vec<Arc<Deviation>> {
        self.state().filtered()
    }

    pub fn selected(&self) -> Option<Arc<Deviation>> {
        self.state().selected.clone()
    }

    pub fn loading(&self) -> bool {
        self.state().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn filters(&self) -> DeviationFilters {
        self.state().filters.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.state().pagination
    }

    pub fn counts_by_status(&self) -> BTreeMap<DeviationStatus, usize> {
        self.state().counts_by_status()
    }

    pub fn counts_by_priority(&self) -> BTreeMap<DeviationPriority, usize> {
        self.state().counts_by_priority()
    }

    pub fn subscribe(&self) -> StateStream {
        self.inner.store.subscribe()
    }

    /// Class of the last operation's failure; cleared when the next
    /// operation starts.
    pub fn last_failure(&self) -> Option<FailureKind> {
        *self.inner.last_failure.borrow()
    }
}
