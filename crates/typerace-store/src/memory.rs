//! In-memory store: a JSON tree guarded by one async lock, watchers on
//! `tokio::sync::watch` channels.

use std::collections::HashMap;

use rand::Rng;
use serde_json::{Map, Value};
use tokio::sync::{watch, RwLock};

use crate::{segments, KvStore, StoreError, Subscription};

/// The in-memory reference backend.
///
/// All mutations take the write lock, so each call is atomic and watchers
/// are notified in commit order. Cheap to clone — clones share the tree.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: std::sync::Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    root: Value,
    /// One watch channel per subscribed path. Senders with no remaining
    /// receivers are dropped on the next mutation.
    watchers: HashMap<String, watch::Sender<Value>>,
    push_seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let segs = segments(path)?;
        let inner = self.inner.read().await;
        match value_at(&inner.root, &segs) {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let segs = segments(path)?;
        let mut inner = self.inner.write().await;
        *node_mut(&mut inner.root, &segs) = value;
        inner.commit();
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let segs = segments(path)?;
        let mut inner = self.inner.write().await;
        let node = node_mut(&mut inner.root, &segs);
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return Err(StoreError::NotAnObject(path.to_owned()));
        };
        for (key, value) in fields {
            if value.is_null() {
                map.remove(&key);
            } else {
                map.insert(key, value);
            }
        }
        inner.commit();
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let segs = segments(path)?;
        let mut inner = self.inner.write().await;
        *node_mut(&mut inner.root, &segs) = Value::Null;
        inner.commit();
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let segs = segments(path)?;
        let mut inner = self.inner.write().await;
        inner.push_seq += 1;
        // Monotonic prefix keeps keys sorted by insertion; the random
        // suffix keeps them unguessable across store restarts.
        let key = format!("{:012x}{:04x}", inner.push_seq, rand::rng().random::<u16>());
        let node = node_mut(&mut inner.root, &segs);
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return Err(StoreError::NotAnObject(path.to_owned()));
        };
        map.insert(key.clone(), value);
        inner.commit();
        Ok(key)
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        let segs = segments(path)?;
        let mut inner = self.inner.write().await;
        let current = value_at(&inner.root, &segs);
        let sender = inner
            .watchers
            .entry(path.to_owned())
            .or_insert_with(|| watch::channel(current).0);
        Ok(Subscription::new(sender.subscribe()))
    }
}

impl Inner {
    /// Post-mutation bookkeeping: prune deleted subtrees, notify watchers
    /// whose view actually changed, drop abandoned watchers.
    fn commit(&mut self) {
        prune_nulls(&mut self.root);
        let root = &self.root;
        self.watchers.retain(|path, sender| {
            if sender.receiver_count() == 0 {
                return false;
            }
            let segs: Vec<&str> = path.split('/').collect();
            let value = value_at(root, &segs);
            sender.send_if_modified(|current| {
                if *current != value {
                    *current = value;
                    true
                } else {
                    false
                }
            });
            true
        });
    }
}

/// Reads the value at a path, `Null` when absent.
fn value_at(root: &Value, segs: &[&str]) -> Value {
    let mut node = root;
    for seg in segs {
        match node.get(seg) {
            Some(child) => node = child,
            None => return Value::Null,
        }
    }
    node.clone()
}

/// Descends to the node at a path, materializing intermediate objects.
/// A scalar in the way is overwritten — the deeper write wins.
fn node_mut<'a>(root: &'a mut Value, segs: &[&str]) -> &'a mut Value {
    let mut node = root;
    for seg in segs {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .expect("just ensured object")
            .entry(seg.to_string())
            .or_insert(Value::Null);
    }
    node
}

/// Removes `Null` entries and empty objects, bottom-up, so a deleted room
/// leaves no tombstone behind.
fn prune_nulls(value: &mut Value) {
    if let Value::Object(map) = value {
        for child in map.values_mut() {
            prune_nulls(child);
        }
        map.retain(|_, v| !v.is_null() && !matches!(v, Value::Object(m) if m.is_empty()));
    }
}
