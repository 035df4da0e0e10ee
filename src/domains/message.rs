use crate::domains::header::{Header, MessageType, HEADER_LEN};
use crate::domains::simple_message::SimpleMessage;
use crate::error::Result;

/// A header plus an opaque payload: the plaintext that gets encrypted.
///
/// The payload carries no length of its own, so the encoded bytes must always
/// travel inside an externally framed buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub header: Header,
    pub payload: Vec<u8>,
}

impl RawMessage {
    pub fn new(header: Header, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            header,
            payload: payload.into(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.payload.len());
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let split = bytes.len().min(HEADER_LEN);
        let (header, payload) = bytes.split_at(split);
        Ok(Self {
            header: Header::from_bytes(header)?,
            payload: payload.to_vec(),
        })
    }
}

/// A typed payload codec bound to one message type code and version.
pub trait MessageCodec: Sized {
    const MESSAGE_TYPE: MessageType;
    const VERSION: u8;

    fn to_raw_message(&self) -> Result<RawMessage>;

    fn from_raw_message(message: &RawMessage) -> Result<Self>;

    fn header() -> Header {
        Header::with_type(Self::VERSION, Self::MESSAGE_TYPE)
    }
}

/// A raw message dispatched to its typed codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Simple(SimpleMessage),
    Unknown(RawMessage),
}

impl Message {
    /// Picks the codec by type code; codes without a registered codec are kept
    /// as raw messages.
    pub fn decode(raw: &RawMessage) -> Result<Self> {
        match raw.header.msg_type() {
            code if code == SimpleMessage::MESSAGE_TYPE => {
                Ok(Message::Simple(SimpleMessage::from_raw_message(raw)?))
            }
            _ => Ok(Message::Unknown(raw.clone())),
        }
    }

    pub fn to_raw_message(&self) -> Result<RawMessage> {
        match self {
            Message::Simple(message) => message.to_raw_message(),
            Message::Unknown(raw) => Ok(raw.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcmpError;

    #[test]
    fn encodes_header_then_payload() {
        let message = RawMessage::new(
            Header::with_type(1, MessageType::SIMPLE_MESSAGE),
            b"hello world".to_vec(),
        );
        let bytes = message.to_bytes();
        assert_eq!(&bytes[..3], &[0x00, 0x00, 0x11]);
        assert_eq!(&bytes[3..], b"hello world");
    }

    #[test]
    fn decodes_header_and_payload() {
        let message = RawMessage::from_bytes(&[0x00, 0x00, 0x11, 0x41, 0x41]).unwrap();
        assert_eq!(message.header.version(), 1);
        assert_eq!(message.header.msg_type(), MessageType::SIMPLE_MESSAGE);
        assert_eq!(message.payload, b"AA");
    }

    #[test]
    fn empty_payload_is_valid() {
        let message = RawMessage::from_bytes(&[0x00, 0x00, 0x11]).unwrap();
        assert!(message.payload.is_empty());
    }

    #[test]
    fn short_input_fails_in_header() {
        assert!(matches!(
            RawMessage::from_bytes(&[0x00, 0x11]),
            Err(AcmpError::InvalidInput)
        ));
        assert!(matches!(RawMessage::from_bytes(&[]), Err(AcmpError::InvalidInput)));
    }

    #[test]
    fn unregistered_type_stays_raw() {
        let raw = RawMessage::new(Header::new(3, 0x4242), vec![9, 9]);
        assert_eq!(Message::decode(&raw).unwrap(), Message::Unknown(raw.clone()));
        assert_eq!(Message::Unknown(raw.clone()).to_raw_message().unwrap(), raw);
    }
}
