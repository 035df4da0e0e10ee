use std::fmt;

use once_cell::sync::OnceCell;

use crate::domains::header::MessageType;
use crate::domains::message::{MessageCodec, RawMessage};
use crate::error::{AcmpError, Result};

const LENGTH_PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub attachment_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(attachment_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            attachment_type: attachment_type.into(),
            data: data.into(),
        }
    }
}

/// Free text plus an ordered list of typed attachments.
///
/// The payload is a run of length-prefixed blocks: the text, then one
/// `(type, data)` pair per attachment until the buffer ends.
#[derive(Clone)]
pub struct SimpleMessage {
    text: String,
    attachments: Vec<Attachment>,
    raw: OnceCell<RawMessage>,
}

impl SimpleMessage {
    pub fn new(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            text: text.into(),
            attachments,
            raw: OnceCell::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Encoded form, computed on first access and reused afterwards.
    pub fn raw_message(&self) -> Result<&RawMessage> {
        self.raw.get_or_try_init(|| {
            let mut payload = Vec::new();
            write_block(&mut payload, self.text.as_bytes())?;
            for attachment in &self.attachments {
                write_block(&mut payload, attachment.attachment_type.as_bytes())?;
                write_block(&mut payload, &attachment.data)?;
            }
            Ok(RawMessage::new(Self::header(), payload))
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.raw_message()?.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_raw_message(&RawMessage::from_bytes(bytes)?)
    }
}

impl MessageCodec for SimpleMessage {
    const MESSAGE_TYPE: MessageType = MessageType::SIMPLE_MESSAGE;
    const VERSION: u8 = 1;

    fn to_raw_message(&self) -> Result<RawMessage> {
        self.raw_message().cloned()
    }

    fn from_raw_message(message: &RawMessage) -> Result<Self> {
        if message.header.msg_type() != Self::MESSAGE_TYPE
            || message.header.version() != Self::VERSION
        {
            return Err(AcmpError::InvalidMessageHeader);
        }

        let mut reader = BlockReader::new(&message.payload);
        let text = reader.read_string()?;
        let mut attachments = Vec::new();
        while !reader.is_empty() {
            let attachment_type = reader.read_string()?;
            let data = reader.read_block()?.to_vec();
            attachments.push(Attachment {
                attachment_type,
                data,
            });
        }

        Ok(Self {
            text,
            attachments,
            raw: OnceCell::with_value(message.clone()),
        })
    }
}

impl PartialEq for SimpleMessage {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.attachments == other.attachments
    }
}

impl Eq for SimpleMessage {}

impl fmt::Debug for SimpleMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleMessage")
            .field("text", &self.text)
            .field("attachments", &self.attachments)
            .finish()
    }
}

fn write_block(out: &mut Vec<u8>, block: &[u8]) -> Result<()> {
    let len = u32::try_from(block.len()).map_err(|_| AcmpError::InvalidPayload)?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(block);
    Ok(())
}

struct BlockReader<'a> {
    rest: &'a [u8],
}

impl<'a> BlockReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { rest: bytes }
    }

    fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    fn read_block(&mut self) -> Result<&'a [u8]> {
        if self.rest.len() < LENGTH_PREFIX_LEN {
            return Err(AcmpError::InvalidPayload);
        }
        let (prefix, rest) = self.rest.split_at(LENGTH_PREFIX_LEN);
        let mut len_bytes = [0u8; LENGTH_PREFIX_LEN];
        len_bytes.copy_from_slice(prefix);
        let len = usize::try_from(u32::from_be_bytes(len_bytes))
            .map_err(|_| AcmpError::InvalidPayload)?;
        if rest.len() < len {
            return Err(AcmpError::InvalidPayload);
        }
        let (block, rest) = rest.split_at(len);
        self.rest = rest;
        Ok(block)
    }

    fn read_string(&mut self) -> Result<String> {
        Ok(String::from_utf8_lossy(self.read_block()?).into_owned())
    }
}
