//! The `KeyValueStore` trait and an in-memory implementation.
//!
//! Every entity collection is stored as one JSON document under a fixed key.
//! Backends only move strings; (de)serialisation happens in
//! [`crate::repo`].

use std::{
  collections::BTreeMap,
  convert::Infallible,
  future::Future,
  sync::{Arc, RwLock},
};

/// Abstraction over a durable string-keyed document store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the document stored under `key`, or `None` if the key is unset.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous document.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove `key`. Removing an unset key is not an error.
  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A process-local store — useful for testing.
///
/// Cloning is cheap and clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  inner: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
    Ok(map.get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<(), Infallible> {
    let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
    map.insert(key.to_owned(), value);
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<(), Infallible> {
    let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
    map.remove(key);
    Ok(())
  }
}
