use std::sync::Mutex;

use crate::e2e::IdentityKeypair;
use crate::error::{AcmpError, Result};

/// Source of the local account's identity keys, keyed by ledger time.
pub trait IdentityStore: Send + Sync {
    /// The identity valid at `timestamp`, or the newest one when `None`.
    fn identity_at(&self, timestamp: Option<u64>) -> Result<IdentityKeypair>;
}

struct Generation {
    valid_from: u64,
    identity: IdentityKeypair,
}

/// Identity history kept in memory, ordered by `valid_from`.
pub struct MemoryIdentityStore {
    generations: Mutex<Vec<Generation>>,
}

impl MemoryIdentityStore {
    pub fn new(identity: IdentityKeypair) -> Self {
        Self {
            generations: Mutex::new(vec![Generation {
                valid_from: 0,
                identity,
            }]),
        }
    }

    /// Makes `identity` current from `valid_from` on. Older generations stay
    /// available for historical lookups.
    pub fn rotate(&self, valid_from: u64, identity: IdentityKeypair) -> Result<()> {
        let mut generations = self
            .generations
            .lock()
            .map_err(|_| AcmpError::Runtime("identity store locked".to_string()))?;
        let position = generations.partition_point(|g| g.valid_from <= valid_from);
        generations.insert(
            position,
            Generation {
                valid_from,
                identity,
            },
        );
        Ok(())
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn identity_at(&self, timestamp: Option<u64>) -> Result<IdentityKeypair> {
        let generations = self
            .generations
            .lock()
            .map_err(|_| AcmpError::Runtime("identity store locked".to_string()))?;
        let found = match timestamp {
            None => generations.last(),
            Some(ts) => generations.iter().rev().find(|g| g.valid_from <= ts),
        };
        found
            .map(|g| g.identity.clone())
            .ok_or_else(|| AcmpError::Encryption(format!("no identity valid at {timestamp:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn historical_lookup_follows_rotation() {
        let first = IdentityKeypair::generate();
        let second = IdentityKeypair::generate();
        let store = MemoryIdentityStore::new(first.clone());
        store.rotate(100, second.clone()).unwrap();

        let at = |ts| store.identity_at(ts).unwrap().public.to_bytes();
        assert_eq!(at(Some(0)), first.public.to_bytes());
        assert_eq!(at(Some(99)), first.public.to_bytes());
        assert_eq!(at(Some(100)), second.public.to_bytes());
        assert_eq!(at(None), second.public.to_bytes());
    }
}
