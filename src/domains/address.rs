use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AcmpError, Result};

pub const ADDRESS_LEN: usize = 32;

/// A 32-byte ledger account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountAddress([u8; ADDRESS_LEN]);

impl AccountAddress {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; ADDRESS_LEN] {
        self.0
    }

    /// Parses `0x`-prefixed or bare hex. Short forms such as `0x1` are
    /// left-padded with zeros.
    pub fn from_hex(value: &str) -> Result<Self> {
        let digits = value.strip_prefix("0x").unwrap_or(value);
        if digits.is_empty() || digits.len() > ADDRESS_LEN * 2 {
            return Err(AcmpError::Serialization(format!(
                "invalid account address: {value}"
            )));
        }
        let padded = format!("{digits:0>width$}", width = ADDRESS_LEN * 2);
        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|e| {
                AcmpError::Serialization(format!("invalid account address {value}: {e}"))
            })?;
        Ok(Self(bytes))
    }
}

impl From<[u8; ADDRESS_LEN]> for AccountAddress {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for AccountAddress {
    type Err = AcmpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::from_hex(&value).map_err(serde::de::Error::custom)
    }
}
