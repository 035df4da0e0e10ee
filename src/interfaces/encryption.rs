use std::sync::Arc;

use async_trait::async_trait;

use crate::domains::keys::PublicKey;
use crate::error::Result;

/// Authenticated encryption between the local private key and a peer key.
#[async_trait]
pub trait EncryptionCapability: Send + Sync {
    async fn encrypt(&self, plaintext: &[u8], peer: &PublicKey) -> Result<Vec<u8>>;

    async fn decrypt(&self, ciphertext: &[u8], peer: &PublicKey) -> Result<Vec<u8>>;
}

/// Hands out the local account's encryption capability, optionally as of a
/// ledger timestamp so rotated keys stay usable for older messages.
#[async_trait]
pub trait Encryptor: Send + Sync {
    async fn capability(&self, timestamp: Option<u64>) -> Result<Arc<dyn EncryptionCapability>>;
}
