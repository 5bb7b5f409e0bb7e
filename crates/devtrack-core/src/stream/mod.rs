// ── Reactive state streams ──
//
// Subscription type for consuming deviation state changes from the store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::DeviationState;

/// A subscription to the deviation state.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct StateStream {
    current: Arc<DeviationState>,
    receiver: watch::Receiver<Arc<DeviationState>>,
}

impl StateStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<DeviationState>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<DeviationState> {
        &self.current
    }

    /// Latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<DeviationState> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<DeviationState>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    /// The first item is the current snapshot.
    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StateWatchStream {
    inner: WatchStream<Arc<DeviationState>>,
}

impl Stream for StateWatchStream {
    type Item = Arc<DeviationState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::StreamExt;

    use crate::model::FilterUpdate;
    use crate::store::DeviationStore;

    #[tokio::test]
    async fn changed_yields_new_snapshot() {
        let store = DeviationStore::new();
        let mut stream = store.subscribe();
        assert!(!stream.current().loading);

        store.set_loading(true);
        let snap = stream.changed().await.unwrap();
        assert!(snap.loading);
        assert!(stream.current().loading);
    }

    #[tokio::test]
    async fn noop_mutations_do_not_notify() {
        let store = DeviationStore::new();
        let stream = store.subscribe();

        store.clear_filters();
        store.set_error(None);
        assert!(!stream.receiver.has_changed().unwrap());

        store.merge_filters(FilterUpdate::search(Some("leak".into())));
        assert!(stream.receiver.has_changed().unwrap());
    }

    #[tokio::test]
    async fn into_stream_starts_with_current() {
        let store = DeviationStore::new();
        store.set_error(Some("boom".into()));
        let mut stream = store.subscribe().into_stream();

        let first = stream.next().await.unwrap();
        assert_eq!(first.error.as_deref(), Some("boom"));
    }
}
