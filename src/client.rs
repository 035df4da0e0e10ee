use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::config::Config;
use crate::domains::address::AccountAddress;
use crate::domains::mailbox::{DecryptedMessage, MailboxEntry};
use crate::domains::message::{MessageCodec, RawMessage};
use crate::domains::transaction::{
    CommittedTransaction, EntryFunctionPayload, FunctionArgument, FunctionId, ViewRequest,
};
use crate::error::{AcmpError, Result};
use crate::interfaces::encryption::Encryptor;
use crate::interfaces::key_directory::KeyDirectory;
use crate::interfaces::ledger::Ledger;
use crate::interfaces::signer::Signer;

const CREATE_STORE: &str = "create_store";
const SEND_MESSAGE: &str = "send_message";
const GET_MESSAGES: &str = "get_messages";

/// Contract-level encoding of an open upper bound.
const UNBOUNDED_END: u64 = 0;

pub struct Collaborators {
    pub ledger: Arc<dyn Ledger>,
    pub key_directory: Arc<dyn KeyDirectory>,
    pub encryptor: Arc<dyn Encryptor>,
    pub signer: Arc<dyn Signer>,
}

/// Sends to and reads from ledger mailboxes on behalf of the signer's account.
///
/// Holds no protocol state between calls: keys and encryption capabilities
/// are resolved again for every operation.
pub struct MessagingClient {
    ledger: Arc<dyn Ledger>,
    key_directory: Arc<dyn KeyDirectory>,
    encryptor: Arc<dyn Encryptor>,
    signer: Arc<dyn Signer>,
    contract: AccountAddress,
    module: String,
    receive_concurrency: usize,
}

impl MessagingClient {
    pub fn new(config: &Config, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger: collaborators.ledger,
            key_directory: collaborators.key_directory,
            encryptor: collaborators.encryptor,
            signer: collaborators.signer,
            contract: config.contract_address()?,
            module: config.module().to_string(),
            receive_concurrency: config.receive_concurrency(),
        })
    }

    pub fn account_address(&self) -> AccountAddress {
        self.signer.account_address()
    }

    fn function(&self, name: &str) -> FunctionId {
        FunctionId::new(self.contract, self.module.clone(), name)
    }

    async fn submit(
        &self,
        name: &str,
        arguments: Vec<FunctionArgument>,
    ) -> Result<CommittedTransaction> {
        let payload = EntryFunctionPayload {
            function: self.function(name),
            arguments,
        };
        let transaction = self
            .ledger
            .build_transaction(self.signer.account_address(), payload)
            .await?;
        let authenticator = self.signer.sign_transaction(&transaction).await?;
        let pending = self
            .ledger
            .submit_transaction(&transaction, &authenticator)
            .await?;
        debug!(hash = %pending.hash, function = name, "transaction submitted");
        let committed = self.ledger.wait_for_transaction(&pending.hash).await?;
        info!(
            hash = %committed.hash,
            version = committed.version,
            function = name,
            "transaction final"
        );
        Ok(committed)
    }

    pub async fn create_store(&self) -> Result<CommittedTransaction> {
        self.submit(CREATE_STORE, Vec::new()).await
    }

    pub async fn send_message(
        &self,
        recipient: &AccountAddress,
        message: &RawMessage,
    ) -> Result<CommittedTransaction> {
        self.send_message_at(recipient, message, None).await
    }

    /// Like [`MessagingClient::send_message`], resolving both parties' keys as
    /// of `timestamp`. `None` means the current ledger time, so keys published
    /// ahead of their `valid_from` are not used yet.
    pub async fn send_message_at(
        &self,
        recipient: &AccountAddress,
        message: &RawMessage,
        timestamp: Option<u64>,
    ) -> Result<CommittedTransaction> {
        let at = match timestamp {
            Some(at) => at,
            None => self.ledger.ledger_timestamp().await?,
        };
        let their_key = self.key_directory.fetch_key(recipient, Some(at)).await?;
        let plaintext = message.to_bytes();
        let capability = self.encryptor.capability(Some(at)).await?;
        let ciphertext = capability.encrypt(&plaintext, &their_key).await?;
        debug!(
            %recipient,
            plaintext_len = plaintext.len(),
            ciphertext_len = ciphertext.len(),
            "message encrypted"
        );
        self.send_message_raw(recipient, ciphertext).await
    }

    pub async fn send<M: MessageCodec>(
        &self,
        recipient: &AccountAddress,
        message: &M,
    ) -> Result<CommittedTransaction> {
        self.send_message(recipient, &message.to_raw_message()?).await
    }

    /// Submits bytes that are already encrypted for `recipient`.
    pub async fn send_message_raw(
        &self,
        recipient: &AccountAddress,
        ciphertext: Vec<u8>,
    ) -> Result<CommittedTransaction> {
        self.submit(
            SEND_MESSAGE,
            vec![
                FunctionArgument::Address(*recipient),
                FunctionArgument::Bytes(ciphertext),
            ],
        )
        .await
    }

    /// Mailbox entries in `[start, end)` without decrypting them. `None` reads
    /// to the end of the mailbox.
    pub async fn fetch_entries(&self, start: u64, end: Option<u64>) -> Result<Vec<MailboxEntry>> {
        if let Some(end) = end {
            if end <= start {
                debug!(start, end, "empty mailbox range");
                return Ok(Vec::new());
            }
        }
        let request = ViewRequest {
            function: self.function(GET_MESSAGES),
            arguments: vec![
                FunctionArgument::Address(self.signer.account_address()),
                FunctionArgument::U64(start),
                FunctionArgument::U64(end.unwrap_or(UNBOUNDED_END)),
            ],
        };
        let value = self
            .ledger
            .view(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AcmpError::Ledger("get_messages returned no value".to_string()))?;
        serde_json::from_value(value).map_err(|e| AcmpError::Serialization(e.to_string()))
    }

    /// Decrypts every entry in `[start, end)`, preserving mailbox order.
    ///
    /// Entries are processed concurrently; the first failing entry fails the
    /// whole call.
    pub async fn get_messages(
        &self,
        start: u64,
        end: Option<u64>,
    ) -> Result<Vec<DecryptedMessage>> {
        let entries = self.fetch_entries(start, end).await?;
        debug!(start, ?end, count = entries.len(), "fetched mailbox entries");
        stream::iter(entries.into_iter().map(|entry| self.open_entry(entry)))
            .buffered(self.receive_concurrency)
            .try_collect()
            .await
    }

    async fn open_entry(&self, entry: MailboxEntry) -> Result<DecryptedMessage> {
        let from = entry.sender()?;
        let ciphertext = entry.ciphertext()?;
        let their_key = self
            .key_directory
            .fetch_key(&from, Some(entry.timestamp))
            .await?;
        let capability = self.encryptor.capability(Some(entry.timestamp)).await?;
        let plaintext = capability.decrypt(&ciphertext, &their_key).await?;
        let message = RawMessage::from_bytes(&plaintext)?;
        debug!(
            %from,
            timestamp = entry.timestamp,
            msg_type = message.header.msg_type().code(),
            "entry opened"
        );
        Ok(DecryptedMessage {
            from,
            timestamp: entry.timestamp,
            message,
        })
    }
}
