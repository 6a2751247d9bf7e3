use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::loader::{self, PreloadHandle};
use crate::{Query, Transport, Variables};

/// Identifies a query by its type, operation name and serialized variables.
type CacheKey = (TypeId, &'static str, String);

/// Shares preloaded queries between everything that reads them.
///
/// Identical queries, whether still in flight or already finished, are only sent once. Entries are
/// never invalidated.
pub struct QueryCache<T> {
    /// The transport used for new queries.
    transport: Arc<T>,
    /// Type-erased `PreloadHandle`s keyed by query.
    entries: Mutex<HashMap<CacheKey, Box<dyn Any + Send + Sync>>>,
}

impl<T: Transport + Send + Sync + 'static> QueryCache<T> {
    /// Create an empty cache.
    #[must_use]
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get the handle for a query, issuing it if it hasn't been seen before.
    ///
    /// # Panics
    ///
    /// Panics if the query has to be issued outside of a Tokio runtime.
    pub fn preload<Q: Query + 'static>(&self, variables: Variables) -> PreloadHandle<Q::Response> {
        let key = cache_key::<Q>(&variables);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = entries
            .get(&key)
            .and_then(|entry| entry.downcast_ref::<PreloadHandle<Q::Response>>())
        {
            tracing::debug!("Reusing preloaded {}", Q::OPERATION_NAME);
            return handle.clone();
        }

        let handle = loader::preload::<Q, T>(Arc::clone(&self.transport), variables);
        entries.insert(key, Box::new(handle.clone()));
        handle
    }

    /// Get the handle for a query without issuing it.
    #[must_use]
    pub fn get<Q: Query + 'static>(&self, variables: &Variables) -> Option<PreloadHandle<Q::Response>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&cache_key::<Q>(variables))
            .and_then(|entry| entry.downcast_ref::<PreloadHandle<Q::Response>>())
            .cloned()
    }

    /// The number of distinct queries issued through this cache.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no queries have been issued through this cache.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key<Q: Query + 'static>(variables: &Variables) -> CacheKey {
    // `serde_json::Map` is ordered by key so equal variables serialize identically.
    let variables = serde_json::Value::Object(variables.clone()).to_string();
    (TypeId::of::<Q>(), Q::OPERATION_NAME, variables)
}
