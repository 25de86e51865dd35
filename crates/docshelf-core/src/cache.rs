//! Read-through document cache
//!
//! The navigator consults a [`DocumentCache`] before reading from the store
//! and invalidates the entry for a key synchronously, before reporting
//! success, whenever that key is replaced or deleted.

use std::collections::HashMap;

use crate::models::{DocumentKey, Payload};

/// Key-value cache of document payloads
pub trait DocumentCache {
    fn get(&self, key: &DocumentKey) -> Option<Payload>;

    fn put(&mut self, key: DocumentKey, payload: Payload);

    /// Drop the entry for one key
    fn invalidate(&mut self, key: &DocumentKey);

    /// Drop everything
    fn clear(&mut self);
}

/// Unbounded in-process cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: HashMap<DocumentKey, Payload>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DocumentCache for MemoryCache {
    fn get(&self, key: &DocumentKey) -> Option<Payload> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: DocumentKey, payload: Payload) {
        self.entries.insert(key, payload);
    }

    fn invalidate(&mut self, key: &DocumentKey) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Cache that never holds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl DocumentCache for NoCache {
    fn get(&self, _key: &DocumentKey) -> Option<Payload> {
        None
    }

    fn put(&mut self, _key: DocumentKey, _payload: Payload) {}

    fn invalidate(&mut self, _key: &DocumentKey) {}

    fn clear(&mut self) {}
}
