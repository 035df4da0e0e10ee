use std::fmt;

pub const PUBLIC_KEY_LEN: usize = 32;

/// A peer's public encryption key as published in the key directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    pub const fn new(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<x25519_dalek::PublicKey> for PublicKey {
    fn from(key: x25519_dalek::PublicKey) -> Self {
        Self(key.to_bytes())
    }
}

impl From<PublicKey> for x25519_dalek::PublicKey {
    fn from(key: PublicKey) -> Self {
        x25519_dalek::PublicKey::from(key.0)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_prefixed_hex() {
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let shown = PublicKey::new(bytes).to_string();
        assert_eq!(shown.len(), 2 + 2 * PUBLIC_KEY_LEN);
        assert!(shown.starts_with("0xab00"));
        assert!(shown.ends_with("01"));
    }

    #[test]
    fn converts_to_and_from_x25519() {
        let secret = x25519_dalek::StaticSecret::from([9u8; 32]);
        let dalek = x25519_dalek::PublicKey::from(&secret);
        let key = PublicKey::from(dalek);
        assert_eq!(x25519_dalek::PublicKey::from(key).to_bytes(), dalek.to_bytes());
    }
}
