//! Key-value stores for candidates, jobs and challenges

use crate::models::Identified;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Lookup by id. Implementations may be backed by a real database; the
/// engines only ever need `get` and `put`.
pub trait Repository<T>: Send + Sync {
    fn get(&self, id: &str) -> Option<T>;

    fn put(&self, item: T);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

impl<T, R: Repository<T> + ?Sized> Repository<T> for Arc<R> {
    fn get(&self, id: &str) -> Option<T> {
        (**self).get(id)
    }

    fn put(&self, item: T) {
        (**self).put(item)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

pub struct InMemoryRepository<T> {
    items: RwLock<HashMap<String, T>>,
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&self, id: &str) -> Option<T> {
        self.items.write().unwrap_or_else(|e| e.into_inner()).remove(id)
    }
}

impl<T: Identified + Clone + Send + Sync> InMemoryRepository<T> {
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        let repo = Self::new();
        for item in items {
            repo.put(item);
        }
        repo
    }
}

impl<T: Identified + Clone + Send + Sync> Repository<T> for InMemoryRepository<T> {
    fn get(&self, id: &str) -> Option<T> {
        // a poisoned map still holds consistent entries: every write is a single insert
        self.items.read().unwrap_or_else(|e| e.into_inner()).get(id).cloned()
    }

    fn put(&self, item: T) {
        self.items
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(item.id().to_string(), item);
    }

    fn len(&self) -> usize {
        self.items.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
