use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domains::keys::PublicKey;
use crate::e2e::identity_store::IdentityStore;
use crate::e2e::{establish_session, E2eEnvelope, IdentityKeypair};
use crate::error::Result;
use crate::interfaces::encryption::{EncryptionCapability, Encryptor};

/// X25519 + HKDF-SHA256 + ChaCha20-Poly1305 capability for one identity.
pub struct E2eCapability {
    identity: IdentityKeypair,
}

impl E2eCapability {
    pub fn new(identity: IdentityKeypair) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl EncryptionCapability for E2eCapability {
    async fn encrypt(&self, plaintext: &[u8], peer: &PublicKey) -> Result<Vec<u8>> {
        let session = establish_session(&self.identity, &x25519_dalek::PublicKey::from(*peer))?;
        Ok(session.encrypt(plaintext)?.to_bytes())
    }

    async fn decrypt(&self, ciphertext: &[u8], peer: &PublicKey) -> Result<Vec<u8>> {
        let envelope = E2eEnvelope::from_bytes(ciphertext)?;
        let session = establish_session(&self.identity, &x25519_dalek::PublicKey::from(*peer))?;
        session.decrypt(&envelope)
    }
}

/// Encryptor backed by an [`IdentityStore`].
pub struct LocalEncryptor {
    store: Arc<dyn IdentityStore>,
}

impl LocalEncryptor {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    pub fn public_key(&self, timestamp: Option<u64>) -> Result<PublicKey> {
        Ok(self.store.identity_at(timestamp)?.public.into())
    }
}

#[async_trait]
impl Encryptor for LocalEncryptor {
    async fn capability(&self, timestamp: Option<u64>) -> Result<Arc<dyn EncryptionCapability>> {
        let identity = self.store.identity_at(timestamp)?;
        debug!(?timestamp, "resolved local encryption identity");
        Ok(Arc::new(E2eCapability::new(identity)))
    }
}
