//! Session storage interface for per-user form state.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Key-value session storage.
///
/// The registry persists every per-user state slice through this trait; the
/// hosting HTTP layer supplies the real store and serializes requests per
/// session. An in-memory implementation is provided for tests and
/// single-process use.
pub trait SessionStore {
    /// Gets a raw value from the session.
    fn get(&self, key: &str) -> Option<Value>;

    /// Sets a raw value in the session.
    fn set(&mut self, key: &str, value: Value);

    /// Removes a value from the session.
    fn remove(&mut self, key: &str);
}

/// Typed accessors over any [`SessionStore`].
pub trait SessionStoreExt: SessionStore {
    /// Gets a value, falling back to the type's default on absence or shape
    /// mismatch.
    fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Sets a serializable value.
    fn set_value<T: Serialize>(&mut self, key: &str, value: &T) {
        if let Ok(value) = serde_json::to_value(value) {
            self.set(key, value);
        }
    }
}

impl<S: SessionStore + ?Sized> SessionStoreExt for S {}

/// In-memory session store.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    data: HashMap<String, Value>,
}

impl MemorySession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the session holds no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.data.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_set_get_remove() {
        let mut session = MemorySession::new();
        assert!(session.is_empty());

        session.set("test_key", json!("test_value"));
        assert_eq!(session.get("test_key"), Some(json!("test_value")));
        assert_eq!(session.len(), 1);

        session.remove("test_key");
        assert_eq!(session.get("test_key"), None);
    }

    #[test]
    fn test_typed_accessors() {
        let mut session = MemorySession::new();
        let store: &mut dyn SessionStore = &mut session;

        store.set_value("step", &3usize);
        assert_eq!(store.get_or_default::<usize>("step"), 3);
        assert_eq!(store.get_or_default::<usize>("missing"), 0);
    }

    #[test]
    fn test_shape_mismatch_falls_back_to_default() {
        let mut session = MemorySession::new();
        session.set("step", json!("not a number"));

        let store: &dyn SessionStore = &session;
        assert_eq!(store.get_or_default::<usize>("step"), 0);
    }
}
