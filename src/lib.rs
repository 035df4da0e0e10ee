pub mod client;
pub mod config;
pub mod domains;
pub mod e2e;
pub mod error;
pub mod interfaces;
pub mod providers;

pub use crate::client::{Collaborators, MessagingClient};
pub use crate::config::Config;
pub use crate::domains::{
    AccountAddress, Attachment, DecryptedMessage, Header, MailboxEntry, Message, MessageCodec,
    MessageType, PublicKey, RawMessage, SimpleMessage,
};
pub use crate::error::{AcmpError, Result};
