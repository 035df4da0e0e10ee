use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use hkdf::Hkdf;
use rand_core::OsRng;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::{AcmpError, Result};

pub mod identity_store;
pub mod manager;

const E2E_VERSION: u8 = 1;
const NONCE_LEN: usize = 12;
const SESSION_CONTEXT: &[u8] = b"acmp-e2e-v1";

#[derive(Clone)]
pub struct IdentityKeypair {
    pub private: StaticSecret,
    pub public: PublicKey,
}

impl IdentityKeypair {
    pub fn generate() -> Self {
        let private = StaticSecret::random_from_rng(OsRng);
        Self::from_secret(private)
    }

    pub fn from_secret(private: StaticSecret) -> Self {
        let public = PublicKey::from(&private);
        Self { private, public }
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| AcmpError::Encryption(e.to_string()))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AcmpError::Encryption("invalid identity key length".to_string()))?;
        Ok(Self::from_secret(StaticSecret::from(key)))
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.private.to_bytes())
    }
}

/// Ciphertext framing: version byte, 12-byte nonce, AEAD output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2eEnvelope {
    pub version: u8,
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl E2eEnvelope {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + NONCE_LEN + self.ciphertext.len());
        bytes.push(self.version);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 1 + NONCE_LEN {
            return Err(AcmpError::Encryption("ciphertext too short".to_string()));
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[1..1 + NONCE_LEN]);
        Ok(Self {
            version: bytes[0],
            nonce,
            ciphertext: bytes[1 + NONCE_LEN..].to_vec(),
        })
    }
}

pub struct E2eSession {
    key: Key,
}

impl E2eSession {
    pub fn from_shared_secret(shared_secret: [u8; 32], context: &[u8]) -> Result<Self> {
        let hk = Hkdf::<Sha256>::new(None, &shared_secret);
        let mut okm = [0u8; 32];
        hk.expand(context, &mut okm)
            .map_err(|_| AcmpError::Encryption("HKDF expand failed".to_string()))?;
        Ok(Self {
            key: Key::from_slice(&okm).to_owned(),
        })
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<E2eEnvelope> {
        let cipher = ChaCha20Poly1305::new(&self.key);
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| AcmpError::Encryption("encrypt failed".to_string()))?;
        Ok(E2eEnvelope {
            version: E2E_VERSION,
            nonce: nonce.into(),
            ciphertext,
        })
    }

    pub fn decrypt(&self, envelope: &E2eEnvelope) -> Result<Vec<u8>> {
        if envelope.version != E2E_VERSION {
            return Err(AcmpError::Encryption("unsupported e2e version".to_string()));
        }
        let cipher = ChaCha20Poly1305::new(&self.key);
        let nonce = Nonce::from_slice(&envelope.nonce);
        cipher
            .decrypt(nonce, envelope.ciphertext.as_ref())
            .map_err(|_| AcmpError::Encryption("decrypt failed".to_string()))
    }
}

/// Both directions of a pair derive the same session key.
pub fn establish_session(
    our_identity: &IdentityKeypair,
    their_public_key: &PublicKey,
) -> Result<E2eSession> {
    let shared = our_identity.private.diffie_hellman(their_public_key);
    E2eSession::from_shared_secret(shared.to_bytes(), SESSION_CONTEXT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_roundtrip() {
        let alice = IdentityKeypair::generate();
        let bob = IdentityKeypair::generate();

        let alice_session = establish_session(&alice, &bob.public).unwrap();
        let bob_session = establish_session(&bob, &alice.public).unwrap();

        let envelope = alice_session.encrypt(b"hello-e2e").unwrap();
        let parsed = E2eEnvelope::from_bytes(&envelope.to_bytes()).unwrap();
        assert_eq!(parsed, envelope);
        assert_eq!(bob_session.decrypt(&parsed).unwrap(), b"hello-e2e");
    }

    #[test]
    fn wrong_peer_fails() {
        let alice = IdentityKeypair::generate();
        let bob = IdentityKeypair::generate();
        let mallory = IdentityKeypair::generate();

        let envelope = establish_session(&alice, &bob.public)
            .unwrap()
            .encrypt(b"secret")
            .unwrap();
        let result = establish_session(&bob, &mallory.public).unwrap().decrypt(&envelope);
        assert!(matches!(result, Err(AcmpError::Encryption(_))));
    }

    #[test]
    fn base64_secret_roundtrip() {
        let identity = IdentityKeypair::generate();
        let restored = IdentityKeypair::from_base64(&identity.to_base64()).unwrap();
        assert_eq!(restored.public.to_bytes(), identity.public.to_bytes());
        assert!(IdentityKeypair::from_base64("AAAA").is_err());
    }

    #[test]
    fn short_envelope_rejected() {
        assert!(E2eEnvelope::from_bytes(&[1; 12]).is_err());
    }
}
