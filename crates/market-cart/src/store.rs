//! # Cart Store
//!
//! The single owner of cart state for the running process.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CartStore Lifecycle                                  │
//! │                                                                         │
//! │  CartStore::start(storage, config)                                     │
//! │   ├── state = empty Cart, revision 0                                   │
//! │   ├── spawn SnapshotWriter::run        (owns every storage write)      │
//! │   └── spawn hydrate                    (one storage read)              │
//! │          │                                                              │
//! │          ├── stored + valid   ──► replace list, publish  Loaded(n)     │
//! │          ├── nothing stored   ──► keep empty list        Empty         │
//! │          ├── unreadable       ──► keep empty list, warn! Failed        │
//! │          └── already changed  ──► keep memory, warn!     Discarded     │
//! │                                                                         │
//! │  add_to_cart / increment / decrement / clear                           │
//! │   └── lock ─► mutate Cart ─► revision+1 ─► publish ─► enqueue write    │
//! │       (a no-op before hydration resolves is published, not written)    │
//! │                                                                         │
//! │  shutdown().await                                                      │
//! │   └── close write queue, wait for the writer to drain                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! State sits behind a `std::sync::Mutex`. Every mutation reads the current
//! list, applies its rule and publishes under one lock acquisition, so two
//! concurrent calls can never both start from the same stale list.
//! The lock is never held across an `.await`.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use market_core::{AddRequest, Cart, CartChange, LineItem};
use market_db::{Database, DbError, KeyValueStore};

use crate::config::CartConfig;
use crate::error::{CartError, CartResult};
use crate::writer::{PersistStatus, SnapshotWriter, WriteRequest};

// =============================================================================
// Published Types
// =============================================================================

/// A published cart list.
///
/// `revision` increases by one for every mutation and for a successful
/// hydration, so subscribers can tell lists apart even when equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartSnapshot {
    pub revision: u64,
    pub products: Vec<LineItem>,
}

/// Outcome of the startup load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// The storage read has not resolved yet.
    Pending,
    /// A stored list with this many items replaced the empty cart.
    Loaded(usize),
    /// Nothing was stored under the key.
    Empty,
    /// A mutation happened first; the stored list was ignored.
    Discarded,
    /// The stored value was unreadable or the read failed.
    Failed,
}

impl Hydration {
    /// True once the startup load has resolved either way.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Hydration::Pending)
    }
}

// =============================================================================
// Internal State
// =============================================================================

#[derive(Debug)]
struct State {
    cart: Cart,
    revision: u64,
    /// Revision of the last mutation, i.e. the last one sent to the writer.
    last_write: u64,
    /// The startup load has not resolved yet.
    hydrating: bool,
    /// A mutation changed the list while `hydrating`.
    dirty: bool,
}

#[derive(Debug)]
struct Inner {
    key: String,
    state: Mutex<State>,
    published: watch::Sender<CartSnapshot>,
    hydration: watch::Sender<Hydration>,
    writes: Mutex<Option<mpsc::UnboundedSender<WriteRequest>>>,
    persist_status: watch::Receiver<PersistStatus>,
    writer_task: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, request: WriteRequest) {
        let writes = self.writes.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(tx) = writes.as_ref() else {
            warn!(
                revision = request.revision,
                "Cart writer is shut down; snapshot not persisted"
            );
            return;
        };

        if tx.send(request).is_err() {
            warn!("Cart writer task is gone; snapshot not persisted");
        }
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// Handle to the process-wide cart.
///
/// Cloning is cheap and every clone sees the same cart. Construct one at
/// startup and hand clones to whatever needs cart access.
///
/// ## Usage
/// ```rust,ignore
/// let store = CartStore::open(&CartConfig::load_or_default(None)).await?;
/// store.hydrated().await;
///
/// store.add_to_cart(&AddRequest::new("1", "Mug", "https://img/mug.png", 10.0));
/// store.increment("1");
/// assert_eq!(store.products()[0].quantity, 2);
/// ```
#[derive(Debug, Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl CartStore {
    /// Starts a store over `storage`, hydrating in the background.
    ///
    /// Must be called from within a Tokio runtime. Returns immediately;
    /// the cart reads as empty until hydration resolves.
    pub fn start(storage: Arc<dyn KeyValueStore>, config: &CartConfig) -> CartResult<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CartError::NoRuntime(e.to_string()))?;

        let key = config.storage_key.clone();
        let (writer, write_tx, persist_status) =
            SnapshotWriter::new(storage.clone(), key.clone());
        let (published, _) = watch::channel(CartSnapshot::default());
        let (hydration, _) = watch::channel(Hydration::Pending);

        let inner = Arc::new(Inner {
            key,
            state: Mutex::new(State {
                cart: Cart::new(),
                revision: 0,
                last_write: 0,
                hydrating: true,
                dirty: false,
            }),
            published,
            hydration,
            writes: Mutex::new(Some(write_tx)),
            persist_status,
            writer_task: Mutex::new(None),
        });

        let writer_task = runtime.spawn(writer.run());
        *inner
            .writer_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(writer_task);

        runtime.spawn(hydrate(inner.clone(), storage));

        info!(key = %inner.key, "Cart store started");
        Ok(CartStore { inner })
    }

    /// Opens the configured SQLite database and starts a store over it.
    pub async fn open(config: &CartConfig) -> CartResult<Self> {
        config.validate()?;
        ensure_parent_dir(&config.database_path)?;

        let db = Database::new(config.db_config()).await?;
        if !db.health_check().await {
            return Err(DbError::ConnectionFailed(format!(
                "{} is not answering queries",
                config.database_path.display()
            ))
            .into());
        }

        Self::start(Arc::new(db), config)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current list of line items.
    pub fn products(&self) -> Vec<LineItem> {
        self.inner.lock_state().cart.items().to_vec()
    }

    /// Current list together with its revision.
    pub fn snapshot(&self) -> CartSnapshot {
        self.inner.published.borrow().clone()
    }

    /// Subscribes to every published list.
    ///
    /// The receiver starts marked as seen; call `changed().await` to wait
    /// for the next list.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.published.subscribe()
    }

    /// Storage key this store writes to.
    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    /// Current hydration outcome without waiting.
    pub fn hydration(&self) -> Hydration {
        *self.inner.hydration.borrow()
    }

    /// Waits for the startup load to resolve and returns its outcome.
    pub async fn hydrated(&self) -> Hydration {
        let mut rx = self.inner.hydration.subscribe();
        let outcome = match rx.wait_for(Hydration::is_settled).await {
            Ok(outcome) => *outcome,
            // Sender lives in `inner`, which we hold
            Err(_) => self.hydration(),
        };
        outcome
    }

    /// Outcome of the most recent snapshot write.
    pub fn persist_status(&self) -> PersistStatus {
        self.inner.persist_status.borrow().clone()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product, or bumps its quantity if already in the cart.
    ///
    /// `item.quantity` is ignored: new entries start at 1, repeats add 1.
    pub fn add_to_cart(&self, item: &AddRequest) -> CartChange {
        let change = self.mutate(|cart| cart.add_item(item));
        debug!(id = %item.id, ?change, "add_to_cart");
        change
    }

    /// Raises the quantity of `id` by one. No-op when absent.
    pub fn increment(&self, id: &str) -> CartChange {
        let change = self.mutate(|cart| cart.increment(id));
        debug!(id = %id, ?change, "increment");
        change
    }

    /// Lowers the quantity of `id` by one, removing it at quantity 1.
    pub fn decrement(&self, id: &str) -> CartChange {
        let change = self.mutate(|cart| cart.decrement(id));
        debug!(id = %id, ?change, "decrement");
        change
    }

    /// Empties the cart.
    pub fn clear(&self) -> CartChange {
        let change = self.mutate(Cart::clear);
        debug!(?change, "clear");
        change
    }

    /// Applies `f` to the current list, publishes and enqueues the result.
    fn mutate<F>(&self, f: F) -> CartChange
    where
        F: FnOnce(&mut Cart) -> CartChange,
    {
        let mut state = self.inner.lock_state();

        let change = f(&mut state.cart);
        state.revision += 1;

        let revision = state.revision;
        self.inner.published.send_replace(CartSnapshot {
            revision,
            products: state.cart.items().to_vec(),
        });

        if state.hydrating {
            if !change.is_change() {
                // Storage still holds a list we have not read
                return change;
            }
            state.dirty = true;
        }

        state.last_write = revision;
        self.inner.enqueue(WriteRequest {
            revision,
            cart: state.cart.clone(),
        });

        change
    }

    // =========================================================================
    // Durability
    // =========================================================================

    /// Waits until every mutation so far has been written.
    ///
    /// ## Returns
    /// - `Ok(())` once storage holds the latest list
    /// - `Err(CartError::Persistence)` if the latest write failed
    /// - `Err(CartError::WriterClosed)` if the writer stopped first
    pub async fn flush(&self) -> CartResult<()> {
        let target = self.inner.lock_state().last_write;
        let mut rx = self.inner.persist_status.clone();

        let status = rx
            .wait_for(|s| s.attempted_revision >= target)
            .await
            .map_err(|_| CartError::WriterClosed)?
            .clone();

        if status.is_persisted(target) {
            return Ok(());
        }

        Err(CartError::Persistence(
            status
                .last_error
                .unwrap_or_else(|| "snapshot not written".to_string()),
        ))
    }

    /// Stops the writer after it drains queued snapshots.
    ///
    /// Later mutations still change memory but are not persisted.
    pub async fn shutdown(&self) {
        let sender = self
            .inner
            .writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);

        let task = self
            .inner
            .writer_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Cart writer task ended abnormally");
            }
        }

        info!(key = %self.inner.key, "Cart store shut down");
    }
}

// =============================================================================
// Hydration
// =============================================================================

/// Loads the stored list once and applies it if nothing happened first.
async fn hydrate(inner: Arc<Inner>, storage: Arc<dyn KeyValueStore>) {
    let loaded = match storage.get_item(&inner.key).await {
        Ok(Some(json)) => match Cart::from_json(&json) {
            Ok(cart) => Ok(Some(cart)),
            Err(e) => {
                warn!(key = %inner.key, error = %e, "Stored cart is unreadable; starting empty");
                Err(())
            }
        },
        Ok(None) => Ok(None),
        Err(e) => {
            warn!(key = %inner.key, error = %e, "Failed to read stored cart; starting empty");
            Err(())
        }
    };

    let outcome = {
        let mut state = inner.lock_state();
        state.hydrating = false;

        match loaded {
            Ok(Some(_)) if state.dirty => {
                warn!(
                    revision = state.revision,
                    "Cart changed before hydration finished; keeping in-memory list"
                );
                Hydration::Discarded
            }
            Ok(Some(cart)) => {
                let count = cart.item_count();
                state.cart = cart;
                state.revision += 1;
                inner.published.send_replace(CartSnapshot {
                    revision: state.revision,
                    products: state.cart.items().to_vec(),
                });
                Hydration::Loaded(count)
            }
            Ok(None) => Hydration::Empty,
            Err(()) => Hydration::Failed,
        }
    };

    info!(key = %inner.key, ?outcome, "Cart hydration finished");
    inner.hydration.send_replace(outcome);
}

fn ensure_parent_dir(path: &Path) -> CartResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use market_db::{DbConfig, DbResult, MemoryKeyValueStore};
    use std::sync::atomic::{AtomicBool, Ordering};

    const KEY: &str = "@GoMarketplace:products";

    fn config() -> CartConfig {
        CartConfig {
            storage_key: KEY.to_string(),
            database_path: ":memory:".into(),
            ..CartConfig::default()
        }
    }

    fn request(id: &str) -> AddRequest {
        AddRequest::new(id, "A", "u", 10.0)
    }

    fn item(id: &str, quantity: u32) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: "A".to_string(),
            image_url: "u".to_string(),
            price: 10.0,
            quantity,
        }
    }

    fn stored(items: &[LineItem]) -> String {
        serde_json::to_string(items).unwrap()
    }

    async fn started(storage: Arc<dyn KeyValueStore>) -> CartStore {
        let store = CartStore::start(storage, &config()).unwrap();
        store.hydrated().await;
        store
    }

    async fn store_with(items: &[LineItem]) -> CartStore {
        started(Arc::new(MemoryKeyValueStore::with_entry(KEY, stored(items)))).await
    }

    /// Storage whose writes fail while `failing` is set.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryKeyValueStore,
        failing: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(DbError::QueryFailed("disk I/O error".to_string()));
            }
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> DbResult<()> {
            self.inner.remove_item(key).await
        }
    }

    /// Storage whose reads never resolve.
    struct StalledReads;

    #[async_trait]
    impl KeyValueStore for StalledReads {
        async fn get_item(&self, _key: &str) -> DbResult<Option<String>> {
            std::future::pending().await
        }

        async fn set_item(&self, _key: &str, _value: &str) -> DbResult<()> {
            Ok(())
        }

        async fn remove_item(&self, _key: &str) -> DbResult<()> {
            Ok(())
        }
    }

    // -------------------------------------------------------------------------
    // Mutation scenarios
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_to_empty_cart() {
        let store = started(Arc::new(MemoryKeyValueStore::new())).await;

        store.add_to_cart(&AddRequest::new("1", "A", "u", 10.0));

        assert_eq!(store.products(), vec![item("1", 1)]);
    }

    #[tokio::test]
    async fn test_add_existing_bumps_quantity() {
        let store = store_with(&[item("1", 1)]).await;

        store.add_to_cart(&request("1"));

        assert_eq!(store.products(), vec![item("1", 2)]);
    }

    #[tokio::test]
    async fn test_decrement_above_one() {
        let store = store_with(&[item("1", 2)]).await;

        store.decrement("1");

        assert_eq!(store.products(), vec![item("1", 1)]);
    }

    #[tokio::test]
    async fn test_decrement_at_one_removes() {
        let store = store_with(&[item("1", 1)]).await;

        assert_eq!(store.decrement("1"), CartChange::Removed);
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_increment_absent_is_noop() {
        let store = store_with(&[item("1", 1)]).await;

        assert_eq!(store.increment("2"), CartChange::Unchanged);
        assert_eq!(store.products(), vec![item("1", 1)]);
    }

    #[tokio::test]
    async fn test_noop_mutations_leave_storage_untouched() {
        let storage = Arc::new(MemoryKeyValueStore::with_entry(
            KEY,
            stored(&[item("1", 2), item("2", 1)]),
        ));
        let store = started(storage.clone()).await;
        let before = storage.get_item(KEY).await.unwrap();

        assert_eq!(store.increment("absent"), CartChange::Unchanged);
        assert_eq!(store.decrement("absent"), CartChange::Unchanged);
        store.flush().await.unwrap();

        assert_eq!(storage.get_item(KEY).await.unwrap(), before);
        assert_eq!(store.products(), vec![item("1", 2), item("2", 1)]);
    }

    #[tokio::test]
    async fn test_mutation_visible_immediately() {
        let store = started(Arc::new(MemoryKeyValueStore::new())).await;
        let before = store.snapshot().revision;

        store.add_to_cart(&request("1"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.revision, before + 1);
        assert_eq!(snapshot.products, vec![item("1", 1)]);
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_every_mutation_is_persisted() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let store = started(storage.clone()).await;

        store.add_to_cart(&request("1"));
        store.add_to_cart(&request("2"));
        store.increment("2");
        store.decrement("1");
        store.flush().await.unwrap();

        let json = storage.get_item(KEY).await.unwrap().unwrap();
        assert_eq!(Cart::from_json(&json).unwrap().into_items(), vec![item("2", 2)]);
    }

    #[tokio::test]
    async fn test_round_trip_through_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = started(Arc::new(db.clone())).await;
        first.add_to_cart(&AddRequest::new("1", "Mug", "mug.png", 12.5));
        first.add_to_cart(&AddRequest::new("2", "Cap", "cap.png", 7.25));
        first.increment("1");
        first.flush().await.unwrap();
        let expected = first.products();
        first.shutdown().await;

        let second = CartStore::start(Arc::new(db), &config()).unwrap();
        assert_eq!(second.hydrated().await, Hydration::Loaded(2));
        assert_eq!(second.products(), expected);
    }

    #[tokio::test]
    async fn test_round_trip_of_unusual_values() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.kv().set(KEY, &stored(&[item("max", u32::MAX)])).await.unwrap();

        let first = started(Arc::new(db.clone())).await;
        assert_eq!(first.increment("max"), CartChange::Unchanged);
        first.add_to_cart(&AddRequest::new("", "Blank", "", f64::NAN));
        first.add_to_cart(&AddRequest::new("   ", "Spaces", "", f64::INFINITY));
        first.add_to_cart(&AddRequest::new("-0", "Negative", "", -3.5));
        first.increment("");
        first.flush().await.unwrap();
        let expected = first.products();
        first.shutdown().await;

        let second = CartStore::start(Arc::new(db), &config()).unwrap();
        assert_eq!(second.hydrated().await, Hydration::Loaded(4));
        assert_eq!(second.products(), expected);
        assert_eq!(second.products()[0].quantity, u32::MAX);
        assert_eq!(second.products()[1].quantity, 2);
        assert_eq!(second.products()[1].price, 0.0);
    }

    #[tokio::test]
    async fn test_write_failure_reported_by_flush_only() {
        let storage = Arc::new(FlakyStore::default());
        let store = started(storage.clone()).await;

        storage.failing.store(true, Ordering::SeqCst);
        store.add_to_cart(&request("1"));

        assert_eq!(store.products(), vec![item("1", 1)]);
        assert!(matches!(store.flush().await, Err(CartError::Persistence(_))));
        assert!(store.persist_status().last_error.is_some());

        storage.failing.store(false, Ordering::SeqCst);
        store.increment("1");

        store.flush().await.unwrap();
        assert_eq!(store.persist_status().last_error, None);
        let json = storage.get_item(KEY).await.unwrap().unwrap();
        assert_eq!(Cart::from_json(&json).unwrap().into_items(), vec![item("1", 2)]);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let store = started(storage.clone()).await;

        for _ in 0..50 {
            store.add_to_cart(&request("1"));
        }
        store.shutdown().await;

        let json = storage.get_item(KEY).await.unwrap().unwrap();
        assert_eq!(Cart::from_json(&json).unwrap().into_items(), vec![item("1", 50)]);

        store.increment("1");
        assert_eq!(store.products(), vec![item("1", 51)]);
        assert!(matches!(store.flush().await, Err(CartError::WriterClosed)));
    }

    // -------------------------------------------------------------------------
    // Hydration
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_hydration_empty_storage() {
        let store = CartStore::start(Arc::new(MemoryKeyValueStore::new()), &config()).unwrap();

        assert_eq!(store.hydrated().await, Hydration::Empty);
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_hydration_malformed_snapshot() {
        let storage = Arc::new(MemoryKeyValueStore::with_entry(KEY, "{not json"));
        let store = CartStore::start(storage, &config()).unwrap();

        assert_eq!(store.hydrated().await, Hydration::Failed);
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_hydration_rejects_duplicate_ids() {
        let storage = Arc::new(MemoryKeyValueStore::with_entry(
            KEY,
            stored(&[item("1", 1), item("1", 3)]),
        ));
        let store = CartStore::start(storage, &config()).unwrap();

        assert_eq!(store.hydrated().await, Hydration::Failed);
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_hydration_publishes_to_subscribers() {
        let storage = Arc::new(MemoryKeyValueStore::with_entry(KEY, stored(&[item("1", 3)])));
        let store = CartStore::start(storage, &config()).unwrap();
        let mut rx = store.subscribe();

        let snapshot = rx
            .wait_for(|s| !s.products.is_empty())
            .await
            .unwrap()
            .clone();

        assert_eq!(snapshot.products, vec![item("1", 3)]);
        assert_eq!(store.hydrated().await, Hydration::Loaded(1));
    }

    #[tokio::test]
    async fn test_mutation_before_hydration_is_kept() {
        let store = CartStore::start(Arc::new(StalledReads), &config()).unwrap();

        store.add_to_cart(&request("1"));

        assert_eq!(store.hydration(), Hydration::Pending);
        assert_eq!(store.products(), vec![item("1", 1)]);
    }

    #[tokio::test]
    async fn test_stored_list_discarded_after_early_mutation() {
        let storage = Arc::new(MemoryKeyValueStore::with_entry(KEY, stored(&[item("9", 4)])));
        let store = CartStore::start(storage, &config()).unwrap();

        // Current-thread runtime: the hydration task has not been polled yet
        store.add_to_cart(&request("1"));

        assert_eq!(store.hydrated().await, Hydration::Discarded);
        assert_eq!(store.products(), vec![item("1", 1)]);
    }

    #[tokio::test]
    async fn test_noop_before_hydration_keeps_stored_list() {
        let storage = Arc::new(MemoryKeyValueStore::with_entry(KEY, stored(&[item("9", 4)])));
        let store = CartStore::start(storage.clone(), &config()).unwrap();

        // Hydration task not polled yet
        assert_eq!(store.increment("absent"), CartChange::Unchanged);
        assert_eq!(store.decrement("absent"), CartChange::Unchanged);

        assert_eq!(store.hydrated().await, Hydration::Loaded(1));
        assert_eq!(store.products(), vec![item("9", 4)]);

        store.flush().await.unwrap();
        assert_eq!(storage.get_item(KEY).await.unwrap(), Some(stored(&[item("9", 4)])));
    }

    #[tokio::test]
    async fn test_noop_then_change_before_hydration_is_discarded() {
        let storage = Arc::new(MemoryKeyValueStore::with_entry(KEY, stored(&[item("9", 4)])));
        let store = CartStore::start(storage.clone(), &config()).unwrap();

        store.increment("absent");
        store.add_to_cart(&request("1"));

        assert_eq!(store.hydrated().await, Hydration::Discarded);
        store.flush().await.unwrap();
        assert_eq!(storage.get_item(KEY).await.unwrap(), Some(stored(&[item("1", 1)])));
    }

    // -------------------------------------------------------------------------
    // Concurrency
    // -------------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutations_lose_nothing() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let store = started(storage.clone()).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..100 {
                        store.add_to_cart(&request("1"));
                        store.increment("1");
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.products(), vec![item("1", 1600)]);

        store.flush().await.unwrap();
        let json = storage.get_item(KEY).await.unwrap().unwrap();
        assert_eq!(Cart::from_json(&json).unwrap().into_items(), vec![item("1", 1600)]);
    }

    #[tokio::test]
    async fn test_uniqueness_under_interleaved_adds() {
        let store = started(Arc::new(MemoryKeyValueStore::new())).await;

        for round in 0..20 {
            store.add_to_cart(&request(&format!("{}", round % 5)));
        }

        let products = store.products();
        assert_eq!(products.len(), 5);
        assert!(products.iter().all(|p| p.quantity == 4));
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let result = CartStore::start(Arc::new(MemoryKeyValueStore::new()), &config());
        assert!(matches!(result, Err(CartError::NoRuntime(_))));
    }
}
