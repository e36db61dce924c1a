//! Existence lookups consulted by handler logic.
//!
//! The engine never calls these. Handlers do, after binding, and turn a
//! `false` into a [`DomainError`](crate::DomainError). Every call is a fresh
//! read; nothing is cached between requests.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Answers whether an entity with the given id exists.
pub trait ExistenceLookup: Send + Sync + 'static {
    fn exists(&self, id: i64) -> bool;
}

/// An in-memory id set that may change while the server runs.
#[derive(Debug, Default)]
pub struct KnownIds {
    ids: RwLock<HashSet<i64>>,
}

impl KnownIds {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self { ids: RwLock::new(ids.into_iter().collect()) }
    }

    pub fn insert(&self, id: i64) -> bool {
        self.ids.write().insert(id)
    }

    pub fn remove(&self, id: i64) -> bool {
        self.ids.write().remove(&id)
    }
}

impl ExistenceLookup for KnownIds {
    fn exists(&self, id: i64) -> bool {
        self.ids.read().contains(&id)
    }
}
