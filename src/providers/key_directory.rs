use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domains::address::AccountAddress;
use crate::domains::keys::PublicKey;
use crate::error::{AcmpError, Result};
use crate::interfaces::key_directory::KeyDirectory;

#[derive(Debug, Clone, Copy)]
struct PublishedKey {
    valid_from: u64,
    key: PublicKey,
}

/// Key directory holding each account's key history in memory.
#[derive(Default)]
pub struct MemoryKeyDirectory {
    keys: RwLock<HashMap<AccountAddress, Vec<PublishedKey>>>,
}

impl MemoryKeyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` as the account's key from `valid_from` on.
    pub async fn publish_key(&self, whose: AccountAddress, key: PublicKey, valid_from: u64) {
        let mut guard = self.keys.write().await;
        let history = guard.entry(whose).or_default();
        let position = history.partition_point(|k| k.valid_from <= valid_from);
        history.insert(position, PublishedKey { valid_from, key });
    }
}

#[async_trait]
impl KeyDirectory for MemoryKeyDirectory {
    async fn fetch_key(&self, whose: &AccountAddress, timestamp: Option<u64>) -> Result<PublicKey> {
        let guard = self.keys.read().await;
        let history = guard
            .get(whose)
            .ok_or_else(|| AcmpError::KeyDirectory(format!("no key published for {whose}")))?;
        let found = match timestamp {
            None => history.last(),
            Some(ts) => history.iter().rev().find(|k| k.valid_from <= ts),
        };
        found.map(|k| k.key).ok_or_else(|| {
            AcmpError::KeyDirectory(format!("no key for {whose} valid at {timestamp:?}"))
        })
    }
}
