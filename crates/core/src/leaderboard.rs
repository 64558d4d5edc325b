//! Leaderboard - the single persisted "best score" value
//!
//! Storage is an injected key/value collaborator. The update is a plain
//! read-compare-write; sessions are single-threaded so nothing races it.

use std::collections::HashMap;

use crate::error::StoreError;

/// Integer key/value store
pub trait ScoreStore {
    fn get(&self, key: &str) -> Option<u64>;
    fn set(&mut self, key: &str, value: u64) -> Result<(), StoreError>;
}

/// In-memory store (tests, headless runs)
#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    values: HashMap<String, u64>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: u64) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value);
        Self { values }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

impl<S: ScoreStore + ?Sized> ScoreStore for Box<S> {
    fn get(&self, key: &str) -> Option<u64> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: u64) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Best-score tracker over a [`ScoreStore`]
#[derive(Debug)]
pub struct Leaderboard<S> {
    store: S,
    key: String,
}

impl<S: ScoreStore> Leaderboard<S> {
    /// Attach to a store; the best score is read on demand
    pub fn load(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Best score seen so far (0 when nothing is stored)
    pub fn best(&self) -> u64 {
        self.store.get(&self.key).unwrap_or(0)
    }

    /// Offer a score; writes it when it beats the stored best.
    ///
    /// Returns the best score after the update.
    pub fn record(&mut self, score: u64) -> Result<u64, StoreError> {
        let best = self.best();
        if score > best {
            self.store.set(&self.key, score)?;
            return Ok(score);
        }
        Ok(best)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
