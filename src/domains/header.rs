use tracing::warn;

use crate::error::{AcmpError, Result};

pub const HEADER_LEN: usize = 3;
pub const VERSION_BITS: u32 = 4;
pub const MSG_TYPE_BITS: u32 = 20;

const VERSION_MASK: u32 = (1 << VERSION_BITS) - 1;
const MSG_TYPE_MASK: u32 = (1 << MSG_TYPE_BITS) - 1;

/// Code identifying the payload codec of a message.
///
/// The set of codes is open: any 20-bit value is a valid code and new message
/// kinds are introduced by picking a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageType(u32);

impl MessageType {
    pub const SIMPLE_MESSAGE: MessageType = MessageType(1);

    /// Builds a code, reducing it modulo 2^20.
    pub const fn new(code: u32) -> Self {
        Self(code & MSG_TYPE_MASK)
    }

    pub const fn code(self) -> u32 {
        self.0
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            MessageType::SIMPLE_MESSAGE => Some("SimpleMessage"),
            _ => None,
        }
    }
}

/// The 3-byte message descriptor.
///
/// Bits 23..4 of the big-endian 24-bit value hold the message type, bits 3..0
/// the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    version: u8,
    msg_type: MessageType,
}

impl Header {
    /// Out-of-range values wrap modulo their bit width.
    pub fn new(version: u8, msg_type: u32) -> Self {
        let wrapped_version = (u32::from(version) & VERSION_MASK) as u8;
        let wrapped_type = MessageType::new(msg_type);
        if wrapped_version != version || wrapped_type.code() != msg_type {
            warn!(
                version,
                msg_type,
                wrapped_version,
                wrapped_type = wrapped_type.code(),
                "header fields truncated to their bit width"
            );
        }
        Self {
            version: wrapped_version,
            msg_type: wrapped_type,
        }
    }

    pub fn with_type(version: u8, msg_type: MessageType) -> Self {
        Self::new(version, msg_type.code())
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn msg_type(&self) -> MessageType {
        self.msg_type
    }

    fn packed(&self) -> u32 {
        (self.msg_type.code() << VERSION_BITS) | u32::from(self.version)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let [_, hi, mid, lo] = self.packed().to_be_bytes();
        [hi, mid, lo]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let [hi, mid, lo]: [u8; HEADER_LEN] =
            bytes.try_into().map_err(|_| AcmpError::InvalidInput)?;
        let packed = u32::from_be_bytes([0, hi, mid, lo]);
        Ok(Self {
            version: (packed & VERSION_MASK) as u8,
            msg_type: MessageType::new(packed >> VERSION_BITS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_message_header_bytes() {
        let header = Header::with_type(1, MessageType::SIMPLE_MESSAGE);
        assert_eq!(header.to_bytes(), [0x00, 0x00, 0x11]);
    }

    #[test]
    fn decodes_simple_message_header() {
        let header = Header::from_bytes(&[0x00, 0x00, 0x11]).unwrap();
        assert_eq!(header.version(), 1);
        assert_eq!(header.msg_type(), MessageType::SIMPLE_MESSAGE);
        assert_eq!(header.msg_type().name(), Some("SimpleMessage"));
    }

    #[test]
    fn rejects_wrong_length() {
        for len in [0usize, 1, 2, 4, 10] {
            let bytes = vec![0u8; len];
            assert!(matches!(
                Header::from_bytes(&bytes),
                Err(AcmpError::InvalidInput)
            ));
        }
    }

    #[test]
    fn extremes_fill_all_bits() {
        let header = Header::new(15, MSG_TYPE_MASK);
        assert_eq!(header.to_bytes(), [0xff, 0xff, 0xff]);
        assert_eq!(Header::new(0, 0).to_bytes(), [0, 0, 0]);
        assert_eq!(Header::new(2, 1).to_bytes(), [0x00, 0x00, 0x12]);
    }

    #[test]
    fn out_of_range_fields_wrap() {
        let header = Header::new(17, (1 << MSG_TYPE_BITS) + 5);
        assert_eq!(header.version(), 1);
        assert_eq!(header.msg_type().code(), 5);
    }

    #[test]
    fn any_three_bytes_reencode_identically() {
        for bytes in [[0x12, 0x34, 0x56], [0xab, 0xcd, 0xef], [0x00, 0x01, 0x00]] {
            assert_eq!(Header::from_bytes(&bytes).unwrap().to_bytes(), bytes);
        }
    }
}
