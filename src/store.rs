use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Key-value storage capability consumed by the cache service
pub trait KvStore: Send + Sync + 'static {
    /// Get the current value for a key, `None` if absent
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Insert or overwrite the value for a key
    fn set(&self, key: String, value: Vec<u8>);

    /// Remove a key; absent keys are ignored
    fn delete(&self, key: &str);
}

/// In-memory key-value store
///
/// Every operation holds a single exclusive lock for its whole duration, so
/// reads are serialized with each other as well as with writes. `get` never
/// mutates, so an `RwLock` can replace the mutex without changing behavior.
pub struct Store {
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl Store {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live keys
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Critical sections never leave the map half-updated, so a poisoned
    // lock still guards a consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for Store {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: String, value: Vec<u8>) {
        self.lock().insert(key, value);
    }

    fn delete(&self, key: &str) {
        self.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_set_then_get() {
        let store = Store::new();
        store.set("ts_1".to_string(), b"testUser1".to_vec());

        assert_eq!(store.get("ts_1"), Some(b"testUser1".to_vec()));
    }

    #[test]
    fn test_get_missing_key() {
        let store = Store::new();
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_delete_removes_key() {
        let store = Store::new();
        store.set("key".to_string(), b"value".to_vec());
        store.delete("key");

        assert_eq!(store.get("key"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_missing_key_leaves_others() {
        let store = Store::new();
        store.set("keep".to_string(), b"1".to_vec());

        store.delete("never-set");

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("keep"), Some(b"1".to_vec()));
    }

    #[test]
    fn test_set_is_idempotent() {
        let store = Store::new();
        store.set("key".to_string(), b"value".to_vec());
        store.set("key".to_string(), b"value".to_vec());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("key"), Some(b"value".to_vec()));
    }

    #[test]
    fn test_last_write_wins() {
        let store = Store::new();
        store.set("key".to_string(), b"v1".to_vec());
        store.set("key".to_string(), b"v2".to_vec());

        assert_eq!(store.get("key"), Some(b"v2".to_vec()));
    }

    #[test]
    fn test_empty_and_binary_values() {
        let store = Store::new();
        store.set("empty".to_string(), Vec::new());
        store.set("binary".to_string(), vec![0, 159, 146, 150, 255]);

        assert_eq!(store.get("empty"), Some(Vec::new()));
        assert_eq!(store.get("binary"), Some(vec![0, 159, 146, 150, 255]));
    }

    #[test]
    fn test_concurrent_disjoint_keys() {
        let store = Arc::new(Store::new());
        let threads = 8;
        let per_thread = 250;

        std::thread::scope(|s| {
            for t in 0..threads {
                let store = Arc::clone(&store);
                s.spawn(move || {
                    for i in 0..per_thread {
                        let key = format!("t{}_k{}", t, i);
                        store.set(key.clone(), key.clone().into_bytes());
                        assert_eq!(store.get(&key), Some(key.into_bytes()));
                    }
                });
            }
        });

        assert_eq!(store.len(), threads * per_thread);
        for t in 0..threads {
            for i in 0..per_thread {
                let key = format!("t{}_k{}", t, i);
                assert_eq!(store.get(&key), Some(key.clone().into_bytes()));
            }
        }
    }

    #[test]
    fn test_concurrent_writes_same_key_no_torn_values() {
        let store = Arc::new(Store::new());

        std::thread::scope(|s| {
            for t in 0..4u8 {
                let store = Arc::clone(&store);
                s.spawn(move || {
                    for _ in 0..500 {
                        store.set("shared".to_string(), vec![t; 64]);
                    }
                });
            }
        });

        let value = store.get("shared").unwrap();
        assert_eq!(value.len(), 64);
        assert!(value.iter().all(|b| *b == value[0]));
    }
}
