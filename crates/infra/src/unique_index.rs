//! Uniqueness oracle + constraint backstop.
//!
//! Slugs and order numbers are "practically unique" at generation time; the
//! real guarantee is a reservation here. `contains` is the oracle the slug
//! probing loop consults; `reserve` is the atomic claim that turns a lost
//! race into a retryable conflict instead of a silent duplicate.

use std::collections::HashSet;
use std::sync::RwLock;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("duplicate key: {0}")]
    Duplicate(String),
}

/// Thread-safe set of reserved keys for one namespace (one index per
/// namespace: slugs, order numbers).
#[derive(Debug, Default)]
pub struct UniqueIndex {
    keys: RwLock<HashSet<String>>,
}

impl UniqueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is currently reserved. Advisory only: the answer can be
    /// stale by the time the caller acts on it, which is why writers must go
    /// through [`UniqueIndex::reserve`].
    pub fn contains(&self, key: &str) -> bool {
        self.keys
            .read()
            .expect("unique index lock poisoned")
            .contains(key)
    }

    /// Atomically claim `key`. Exactly one of two racing callers wins; the
    /// loser gets `IndexError::Duplicate` and must re-probe.
    pub fn reserve(&self, key: &str) -> Result<(), IndexError> {
        let mut keys = self.keys.write().expect("unique index lock poisoned");
        if !keys.insert(key.to_string()) {
            return Err(IndexError::Duplicate(key.to_string()));
        }
        Ok(())
    }

    /// Release a reservation (e.g. when the write it protected failed).
    pub fn release(&self, key: &str) {
        self.keys
            .write()
            .expect("unique index lock poisoned")
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_claims_exactly_once() {
        let index = UniqueIndex::new();

        assert!(!index.contains("essay-writing"));
        index.reserve("essay-writing").unwrap();
        assert!(index.contains("essay-writing"));

        let err = index.reserve("essay-writing").unwrap_err();
        assert_eq!(err, IndexError::Duplicate("essay-writing".to_string()));
    }

    #[test]
    fn release_frees_the_key() {
        let index = UniqueIndex::new();
        index.reserve("sa-123").unwrap();
        index.release("sa-123");
        assert!(index.reserve("sa-123").is_ok());
    }

    #[test]
    fn contended_reservation_has_one_winner() {
        use std::sync::Arc;
        use std::thread;

        let index = Arc::new(UniqueIndex::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let index = Arc::clone(&index);
            handles.push(thread::spawn(move || index.reserve("contended").is_ok()));
        }

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap_or(false))
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }
}
