//! # Coordination store.
//!
//! [`Store`] is the key-value state served by the embedded coordinator. It is
//! cheap to clone; clones share the same state. Every mutation bumps a global
//! revision, which lets callers detect concurrent updates.
//!
//! Locks are ordinary keys under [`LOCK_PREFIX`] whose value is the owner.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Key prefix reserved for ownership locks.
pub const LOCK_PREFIX: &str = "__locks/";

/// A stored value with the revision that last wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub value: String,
    pub revision: u64,
}

/// Serializable store contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub(crate) revision: u64,
    pub(crate) entries: BTreeMap<String, KeyValue>,
}

/// Shared key-value state.
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<Snapshot>>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    pub(crate) async fn snapshot(&self) -> Snapshot {
        self.inner.read().await.clone()
    }

    /// Current global revision (0 for a fresh store).
    pub async fn revision(&self) -> u64 {
        self.inner.read().await.revision
    }

    pub async fn get(&self, key: &str) -> Option<KeyValue> {
        self.inner.read().await.entries.get(key).cloned()
    }

    /// Writes `value` under `key` and returns the new revision.
    pub async fn put(&self, key: impl Into<String>, value: impl Into<String>) -> u64 {
        let mut state = self.inner.write().await;
        Self::write(&mut state, key.into(), value.into())
    }

    /// Removes `key`; returns whether it existed.
    pub async fn delete(&self, key: &str) -> bool {
        let mut state = self.inner.write().await;
        if state.entries.remove(key).is_some() {
            state.revision += 1;
            true
        } else {
            false
        }
    }

    /// All entries whose key starts with `prefix`, in key order.
    pub async fn list(&self, prefix: &str) -> Vec<(String, KeyValue)> {
        self.inner
            .read()
            .await
            .entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Writes `value` only if the current value equals `expected`
    /// (`None` = key absent). Returns the new revision on success.
    pub async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        value: impl Into<String>,
    ) -> Option<u64> {
        let mut state = self.inner.write().await;
        let current = state.entries.get(key).map(|kv| kv.value.as_str());
        if current != expected {
            return None;
        }
        Some(Self::write(&mut state, key.to_string(), value.into()))
    }

    /// Acquires the named lock for `owner`. Re-acquiring an owned lock succeeds.
    pub async fn try_lock(&self, name: &str, owner: &str) -> bool {
        let key = format!("{LOCK_PREFIX}{name}");
        let mut state = self.inner.write().await;
        match state.entries.get(&key) {
            Some(kv) => kv.value == owner,
            None => {
                Self::write(&mut state, key, owner.to_string());
                true
            }
        }
    }

    /// Releases the named lock if `owner` holds it.
    pub async fn unlock(&self, name: &str, owner: &str) -> bool {
        let key = format!("{LOCK_PREFIX}{name}");
        let mut state = self.inner.write().await;
        let held = state.entries.get(&key).is_some_and(|kv| kv.value == owner);
        if held {
            state.entries.remove(&key);
            state.revision += 1;
        }
        held
    }

    fn write(state: &mut Snapshot, key: String, value: String) -> u64 {
        state.revision += 1;
        let revision = state.revision;
        state.entries.insert(key, KeyValue { value, revision });
        revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_bump_revision() {
        let store = Store::new();
        assert_eq!(store.put("a", "1").await, 1);
        assert_eq!(store.put("a", "2").await, 2);
        assert_eq!(
            store.get("a").await,
            Some(KeyValue {
                value: "2".into(),
                revision: 2
            })
        );
        assert!(store.delete("a").await);
        assert!(!store.delete("a").await);
        assert_eq!(store.revision().await, 3);
        assert_eq!(store.get("a").await, None);
    }

    #[tokio::test]
    async fn list_is_prefix_scoped() {
        let store = Store::new();
        store.put("runs/1", "queued").await;
        store.put("runs/2", "running").await;
        store.put("runsx", "other").await;
        store.put("projects/1", "p").await;

        let keys: Vec<String> = store.list("runs/").await.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["runs/1", "runs/2"]);
    }

    #[tokio::test]
    async fn compare_and_swap_checks_current_value() {
        let store = Store::new();
        assert!(store.compare_and_swap("k", Some("x"), "v").await.is_none());
        assert!(store.compare_and_swap("k", None, "v").await.is_some());
        assert!(store.compare_and_swap("k", None, "w").await.is_none());
        assert!(store.compare_and_swap("k", Some("v"), "w").await.is_some());
        assert_eq!(store.get("k").await.unwrap().value, "w");
    }

    #[tokio::test]
    async fn locks_are_exclusive_per_owner() {
        let store = Store::new();
        assert!(store.try_lock("scheduler", "node-a").await);
        assert!(store.try_lock("scheduler", "node-a").await);
        assert!(!store.try_lock("scheduler", "node-b").await);
        assert!(!store.unlock("scheduler", "node-b").await);
        assert!(store.unlock("scheduler", "node-a").await);
        assert!(store.try_lock("scheduler", "node-b").await);
    }
}
