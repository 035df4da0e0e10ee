pub mod address;
pub mod header;
pub mod keys;
pub mod mailbox;
pub mod message;
pub mod simple_message;
pub mod transaction;

pub use address::AccountAddress;
pub use header::{Header, MessageType};
pub use keys::PublicKey;
pub use mailbox::{DecryptedMessage, MailboxEntry};
pub use message::{Message, MessageCodec, RawMessage};
pub use simple_message::{Attachment, SimpleMessage};
