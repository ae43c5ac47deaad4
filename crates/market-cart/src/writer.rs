//! # Snapshot Writer
//!
//! Single background task that mirrors the cart to storage.
//!
//! ## Write Queue Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Snapshot Writer Flow                                 │
//! │                                                                         │
//! │  add_to_cart / increment / decrement / clear                           │
//! │       │  (under the cart lock)                                          │
//! │       ▼                                                                 │
//! │  WriteRequest { revision, cart } ──► unbounded mpsc (never blocks)     │
//! │                                           │                             │
//! │                                           ▼                             │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    SnapshotWriter::run                          │   │
//! │  │                                                                 │   │
//! │  │  1. recv() one request                                          │   │
//! │  │  2. Drain the queue, keep only the newest revision              │   │
//! │  │  3. cart.to_json() → storage.set_item(key, json)                │   │
//! │  │  4. Publish PersistStatus                                       │   │
//! │  │     ok  → persisted_revision = revision                         │   │
//! │  │     err → last_error = Some(..), error! log                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Every write replaces the whole snapshot. A failed write is not         │
//! │  retried; the next mutation writes the full list again.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use market_core::Cart;
use market_db::KeyValueStore;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

// =============================================================================
// Messages
// =============================================================================

/// One snapshot to persist.
#[derive(Debug, Clone)]
pub(crate) struct WriteRequest {
    pub revision: u64,
    pub cart: Cart,
}

/// Outcome of the most recent write attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistStatus {
    /// Revision of the last snapshot the writer tried to store.
    pub attempted_revision: u64,

    /// Revision of the last snapshot stored successfully.
    pub persisted_revision: u64,

    /// Error from the last attempt, cleared by the next success.
    pub last_error: Option<String>,
}

impl PersistStatus {
    /// True when memory and storage agree as of `revision`.
    pub fn is_persisted(&self, revision: u64) -> bool {
        self.persisted_revision >= revision
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Background writer owning all snapshot writes.
pub(crate) struct SnapshotWriter {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    requests: mpsc::UnboundedReceiver<WriteRequest>,
    status: watch::Sender<PersistStatus>,
}

impl SnapshotWriter {
    /// Creates a writer, the sender feeding it, and a status receiver.
    pub(crate) fn new(
        storage: Arc<dyn KeyValueStore>,
        key: String,
    ) -> (
        Self,
        mpsc::UnboundedSender<WriteRequest>,
        watch::Receiver<PersistStatus>,
    ) {
        let (request_tx, requests) = mpsc::unbounded_channel();
        let (status, status_rx) = watch::channel(PersistStatus::default());

        let writer = SnapshotWriter {
            storage,
            key,
            requests,
            status,
        };

        (writer, request_tx, status_rx)
    }

    /// Runs until every sender is dropped and the queue is drained.
    pub(crate) async fn run(mut self) {
        info!(key = %self.key, "Cart writer starting");

        while let Some(mut request) = self.requests.recv().await {
            let mut skipped = 0usize;
            while let Ok(newer) = self.requests.try_recv() {
                request = newer;
                skipped += 1;
            }

            if skipped > 0 {
                debug!(
                    skipped,
                    revision = request.revision,
                    "Coalesced queued cart snapshots"
                );
            }

            self.write(request).await;
        }

        info!(key = %self.key, "Cart writer stopped");
    }

    async fn write(&self, request: WriteRequest) {
        let result = match request.cart.to_json() {
            Ok(json) => self
                .storage
                .set_item(&self.key, &json)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(()) => {
                debug!(
                    revision = request.revision,
                    items = request.cart.item_count(),
                    "Cart snapshot persisted"
                );
                self.status.send_modify(|status| {
                    status.attempted_revision = request.revision;
                    status.persisted_revision = request.revision;
                    status.last_error = None;
                });
            }
            Err(e) => {
                error!(
                    revision = request.revision,
                    key = %self.key,
                    error = %e,
                    "Failed to persist cart snapshot; memory and storage have diverged"
                );
                self.status.send_modify(|status| {
                    status.attempted_revision = request.revision;
                    status.last_error = Some(e);
                });
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::AddRequest;
    use market_db::MemoryKeyValueStore;

    fn cart_with(ids: &[&str]) -> Cart {
        let mut cart = Cart::new();
        for id in ids {
            cart.add_item(&AddRequest::new(*id, "T", "u", 1.0));
        }
        cart
    }

    #[tokio::test]
    async fn test_writes_newest_snapshot() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let (writer, tx, status) = SnapshotWriter::new(storage.clone(), "k".to_string());

        tx.send(WriteRequest {
            revision: 1,
            cart: cart_with(&["a"]),
        })
        .unwrap();
        tx.send(WriteRequest {
            revision: 2,
            cart: cart_with(&["a", "b"]),
        })
        .unwrap();
        drop(tx);

        writer.run().await;

        let stored = storage.get_item("k").await.unwrap().unwrap();
        assert_eq!(Cart::from_json(&stored).unwrap(), cart_with(&["a", "b"]));

        let status = status.borrow().clone();
        assert_eq!(status.persisted_revision, 2);
        assert!(status.is_persisted(2));
        assert_eq!(status.last_error, None);
    }

    #[test]
    fn test_status_default_is_nothing_persisted() {
        let status = PersistStatus::default();
        assert!(status.is_persisted(0));
        assert!(!status.is_persisted(1));
    }
}
