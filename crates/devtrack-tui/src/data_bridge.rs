//! Data bridge: connects the deviation store to TUI actions.
//!
//! Runs as a background task: subscribes to the store through the facade
//! and forwards every published snapshot as an [`Action`] through the
//! TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use devtrack_core::DeviationFacade;

use crate::action::Action;

/// Forward store snapshots until cancelled or the store goes away.
pub async fn spawn_data_bridge(
    facade: DeviationFacade,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut state = facade.subscribe();

    // Push the initial snapshot so screens render immediately
    let _ = action_tx.send(Action::StateUpdated(state.current().clone()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = state.changed() => {
                let Some(snapshot) = changed else { break };
                debug!(
                    records = snapshot.records.len(),
                    loading = snapshot.loading,
                    "dispatching StateUpdated"
                );
                if action_tx.send(Action::StateUpdated(snapshot)).is_err() {
                    break;
                }
            }
        }
    }

    debug!("data bridge shut down");
}
