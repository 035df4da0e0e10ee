use serde::{Deserialize, Deserializer, Serialize};

use crate::domains::address::AccountAddress;
use crate::domains::message::{Message, RawMessage};
use crate::error::{AcmpError, Result};

/// One ciphertext as returned by the mailbox `get_messages` view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxEntry {
    pub from: String,
    pub payload: String,
    #[serde(deserialize_with = "u64_from_number_or_string")]
    pub timestamp: u64,
}

impl MailboxEntry {
    pub fn sender(&self) -> Result<AccountAddress> {
        self.from.parse()
    }

    pub fn ciphertext(&self) -> Result<Vec<u8>> {
        let digits = self.payload.strip_prefix("0x").unwrap_or(&self.payload);
        hex::decode(digits)
            .map_err(|e| AcmpError::Serialization(format!("invalid mailbox payload: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    pub from: AccountAddress,
    pub timestamp: u64,
    pub message: RawMessage,
}

impl DecryptedMessage {
    pub fn decode(&self) -> Result<Message> {
        Message::decode(&self.message)
    }
}

fn u64_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::String(value) => value.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamp_accepts_number_and_string() {
        let entries: Vec<MailboxEntry> = serde_json::from_value(json!([
            {"from": "0x1", "payload": "0x0a0b", "timestamp": 7},
            {"from": "0x2", "payload": "0c", "timestamp": "18446744073709551615"}
        ]))
        .unwrap();
        assert_eq!(entries[0].timestamp, 7);
        assert_eq!(entries[1].timestamp, u64::MAX);
        assert_eq!(entries[0].ciphertext().unwrap(), vec![0x0a, 0x0b]);
        assert_eq!(entries[1].ciphertext().unwrap(), vec![0x0c]);
        assert_eq!(
            entries[1].sender().unwrap(),
            "0x2".parse::<AccountAddress>().unwrap()
        );
    }

    #[test]
    fn bad_hex_payload_is_rejected() {
        let entry = MailboxEntry {
            from: "0x1".to_string(),
            payload: "0xzz".to_string(),
            timestamp: 0,
        };
        assert!(matches!(entry.ciphertext(), Err(AcmpError::Serialization(_))));
    }
}
