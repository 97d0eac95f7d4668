//! The storage boundary of the TypeRace core.
//!
//! The core does not own a database; it writes room state, session records,
//! and leaderboard entries through this small key-value contract and trusts
//! the backend to apply each call atomically and deliver the latest value
//! to subscribers eventually.
//!
//! Paths are `/`-separated segment strings (`rooms/AB12CD/players/u-1`).
//! A value is a [`serde_json::Value`] tree; `Null` means "absent", so
//! writing `Null` deletes — the merge-patch [`update`](KvStore::update)
//! uses this to drop individual fields.
//!
//! [`MemoryStore`] is the reference implementation, used by every test and
//! by single-process deployments. A networked backend implements the same
//! trait.

mod memory;

pub use memory::MemoryStore;

use std::future::Future;

use serde_json::{Map, Value};
use tokio::sync::watch;

/// Errors from store operations.
///
/// These are caller mistakes (malformed path, merge-patch against a
/// scalar), not transient backend failures — the in-memory backend cannot
/// fail any other way.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Empty path or a path with an empty segment.
    #[error("invalid store path {0:?}")]
    InvalidPath(String),

    /// A merge-patch was applied to a non-object value.
    #[error("value at {0:?} is not an object")]
    NotAnObject(String),
}

/// The primitive operations the core requires from storage.
///
/// Every mutation is atomic per call; subscribers observe each committed
/// value, starting with the value current at subscription time.
///
/// Methods are declared with `Send` futures (implementations just write
/// `async fn`) so callers can drive a generic store from spawned tasks —
/// the room actors live in `tokio::spawn`.
pub trait KvStore: Send + Sync {
    /// Reads the value at `path`, or `None` if absent.
    fn get(&self, path: &str) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Overwrites the value at `path`.
    fn set(&self, path: &str, value: Value)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Merge-patches the object at `path`: each field is inserted or
    /// replaced; a `Null` field value deletes that key. Creates the object
    /// if the path is absent. Atomic per call.
    fn update(
        &self,
        path: &str,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes the value at `path` (and any children).
    fn remove(&self, path: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Appends `value` under a fresh unique child key of `path` and
    /// returns the key. Keys sort in insertion order.
    fn push(
        &self,
        path: &str,
        value: Value,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Watches `path`. The returned subscription yields the current value
    /// immediately, then every subsequent change. Dropping it
    /// unsubscribes.
    fn subscribe(&self, path: &str) -> impl Future<Output = Result<Subscription, StoreError>> + Send;
}

/// A live watch on one store path.
pub struct Subscription {
    rx: watch::Receiver<Value>,
    first: bool,
}

impl Subscription {
    pub(crate) fn new(rx: watch::Receiver<Value>) -> Self {
        Self { rx, first: true }
    }

    /// The next observed value: the current one on the first call, then
    /// one per change. `Value::Null` means the path is absent. Returns
    /// `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Value> {
        if self.first {
            self.first = false;
            return Some(self.rx.borrow_and_update().clone());
        }
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    /// The value as of now, without waiting.
    pub fn current(&self) -> Value {
        self.rx.borrow().clone()
    }
}

/// Splits and validates a store path into segments.
pub(crate) fn segments(path: &str) -> Result<Vec<&str>, StoreError> {
    if path.is_empty() {
        return Err(StoreError::InvalidPath(path.to_owned()));
    }
    let segs: Vec<&str> = path.split('/').collect();
    if segs.iter().any(|s| s.is_empty()) {
        return Err(StoreError::InvalidPath(path.to_owned()));
    }
    Ok(segs)
}
