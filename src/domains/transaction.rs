use std::fmt;

use serde::{Serialize, Serializer};

use crate::domains::address::AccountAddress;
use crate::error::{AcmpError, Result};

const SIGNING_DOMAIN: &[u8] = b"ACMP::RawTransaction";

/// Fully qualified contract function, `address::module::name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionId {
    pub address: AccountAddress,
    pub module: String,
    pub name: String,
}

impl FunctionId {
    pub fn new(
        address: AccountAddress,
        module: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            address,
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)
    }
}

impl Serialize for FunctionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A contract call argument in its JSON wire form: addresses as strings,
/// `u64` as a decimal string, bytes as `0x` hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionArgument {
    Address(AccountAddress),
    U64(u64),
    Bytes(Vec<u8>),
}

impl FunctionArgument {
    pub fn as_address(&self) -> Result<AccountAddress> {
        match self {
            FunctionArgument::Address(address) => Ok(*address),
            other => Err(AcmpError::Ledger(format!("expected address argument, got {other:?}"))),
        }
    }

    pub fn as_u64(&self) -> Result<u64> {
        match self {
            FunctionArgument::U64(value) => Ok(*value),
            other => Err(AcmpError::Ledger(format!("expected u64 argument, got {other:?}"))),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            FunctionArgument::Bytes(bytes) => Ok(bytes),
            other => Err(AcmpError::Ledger(format!("expected bytes argument, got {other:?}"))),
        }
    }
}

impl Serialize for FunctionArgument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FunctionArgument::Address(address) => serializer.collect_str(address),
            FunctionArgument::U64(value) => serializer.collect_str(value),
            FunctionArgument::Bytes(bytes) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFunctionPayload {
    pub function: FunctionId,
    pub arguments: Vec<FunctionArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRequest {
    pub function: FunctionId,
    pub arguments: Vec<FunctionArgument>,
}

/// An unsigned transaction as built by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: EntryFunctionPayload,
}

impl RawTransaction {
    /// Bytes covered by the sender's signature.
    pub fn signing_message(&self) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(self).map_err(|e| AcmpError::Serialization(e.to_string()))?;
        let mut message = Vec::with_capacity(SIGNING_DOMAIN.len() + body.len());
        message.extend_from_slice(SIGNING_DOMAIN);
        message.extend_from_slice(&body);
        Ok(message)
    }
}

/// Ed25519 public key and signature over [`RawTransaction::signing_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountAuthenticator {
    pub public_key: [u8; 32],
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionHash(pub String);

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TransactionHash,
    pub sender: AccountAddress,
    pub sequence_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTransaction {
    pub hash: TransactionHash,
    pub version: u64,
    pub timestamp: u64,
}
