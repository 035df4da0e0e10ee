use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domains::address::AccountAddress;
use crate::domains::transaction::{
    AccountAuthenticator, CommittedTransaction, EntryFunctionPayload, FunctionArgument,
    FunctionId, PendingTransaction, RawTransaction, TransactionHash, ViewRequest,
};
use crate::error::{AcmpError, Result};
use crate::interfaces::ledger::Ledger;
use crate::providers::signer::verify_authenticator;

pub const E_STORE_EXISTS: &str = "E_STORE_EXISTS";
pub const E_STORE_NOT_FOUND: &str = "E_STORE_NOT_FOUND";
pub const E_FUNCTION_NOT_FOUND: &str = "E_FUNCTION_NOT_FOUND";

#[derive(Debug, Clone)]
struct StoredMessage {
    from: AccountAddress,
    payload: Vec<u8>,
    timestamp: u64,
}

#[derive(Debug, Clone)]
enum Outcome {
    Committed(CommittedTransaction),
    Aborted(String),
}

#[derive(Default)]
struct LedgerState {
    clock: u64,
    version: u64,
    sequence_numbers: HashMap<AccountAddress, u64>,
    mailboxes: HashMap<AccountAddress, Vec<StoredMessage>>,
    outcomes: HashMap<TransactionHash, Outcome>,
}

/// In-process ledger running the mailbox contract.
///
/// Ledger time is a logical clock that ticks once per executed transaction;
/// [`MemoryLedger::advance_clock`] moves it forward explicitly.
pub struct MemoryLedger {
    contract: AccountAddress,
    module: String,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new(contract: AccountAddress, module: impl Into<String>) -> Self {
        Self {
            contract,
            module: module.into(),
            state: Mutex::new(LedgerState::default()),
        }
    }

    pub async fn now(&self) -> u64 {
        self.state.lock().await.clock
    }

    pub async fn advance_clock(&self, by: u64) -> u64 {
        let mut state = self.state.lock().await;
        state.clock = state.clock.saturating_add(by);
        state.clock
    }

    pub async fn mailbox_len(&self, owner: &AccountAddress) -> Option<usize> {
        self.state.lock().await.mailboxes.get(owner).map(Vec::len)
    }

    fn contract_function<'a>(&self, function: &'a FunctionId) -> Option<&'a str> {
        if function.address == self.contract && function.module == self.module {
            Some(function.name.as_str())
        } else {
            None
        }
    }

    fn execute(
        &self,
        state: &mut LedgerState,
        sender: AccountAddress,
        payload: &EntryFunctionPayload,
    ) -> std::result::Result<(), String> {
        let timestamp = state.clock;
        match (self.contract_function(&payload.function), payload.arguments.as_slice()) {
            (Some("create_store"), []) => {
                if state.mailboxes.contains_key(&sender) {
                    return Err(E_STORE_EXISTS.to_string());
                }
                state.mailboxes.insert(sender, Vec::new());
                Ok(())
            }
            (Some("send_message"), [recipient, message]) => {
                let recipient = recipient.as_address().map_err(|e| e.to_string())?;
                let message = message.as_bytes().map_err(|e| e.to_string())?;
                let mailbox = state
                    .mailboxes
                    .get_mut(&recipient)
                    .ok_or_else(|| E_STORE_NOT_FOUND.to_string())?;
                mailbox.push(StoredMessage {
                    from: sender,
                    payload: message.to_vec(),
                    timestamp,
                });
                Ok(())
            }
            _ => Err(format!("{E_FUNCTION_NOT_FOUND}: {}", payload.function)),
        }
    }

    fn get_messages(
        &self,
        state: &LedgerState,
        arguments: &[FunctionArgument],
    ) -> Result<serde_json::Value> {
        let [owner, start, end] = arguments else {
            return Err(AcmpError::Ledger(format!(
                "get_messages expects 3 arguments, got {}",
                arguments.len()
            )));
        };
        let owner = owner.as_address()?;
        let start = start.as_u64()?;
        let end = end.as_u64()?;
        let mailbox = state
            .mailboxes
            .get(&owner)
            .ok_or_else(|| AcmpError::Ledger(format!("{E_STORE_NOT_FOUND}: {owner}")))?;

        let len = mailbox.len() as u64;
        // 0 marks an open upper bound at the contract boundary
        let end = if end == 0 { len } else { end.min(len) };
        let start = start.min(end);
        let entries: Vec<serde_json::Value> = mailbox[start as usize..end as usize]
            .iter()
            .map(|m| {
                json!({
                    "from": m.from.to_string(),
                    "payload": format!("0x{}", hex::encode(&m.payload)),
                    "timestamp": m.timestamp.to_string(),
                })
            })
            .collect();
        Ok(serde_json::Value::Array(entries))
    }
}

fn transaction_hash(
    signing_message: &[u8],
    authenticator: &AccountAuthenticator,
) -> TransactionHash {
    let mut hasher = Sha256::new();
    hasher.update(signing_message);
    hasher.update(&authenticator.signature);
    TransactionHash(format!("0x{}", hex::encode(hasher.finalize())))
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn build_transaction(
        &self,
        sender: AccountAddress,
        payload: EntryFunctionPayload,
    ) -> Result<RawTransaction> {
        let state = self.state.lock().await;
        let sequence_number = state.sequence_numbers.get(&sender).copied().unwrap_or(0);
        Ok(RawTransaction {
            sender,
            sequence_number,
            payload,
        })
    }

    async fn submit_transaction(
        &self,
        transaction: &RawTransaction,
        authenticator: &AccountAuthenticator,
    ) -> Result<PendingTransaction> {
        verify_authenticator(transaction, authenticator)?;
        let signing_message = transaction.signing_message()?;

        let mut state = self.state.lock().await;
        let expected = state
            .sequence_numbers
            .get(&transaction.sender)
            .copied()
            .unwrap_or(0);
        if transaction.sequence_number != expected {
            return Err(AcmpError::Ledger(format!(
                "sequence number {} rejected, expected {expected}",
                transaction.sequence_number
            )));
        }
        state.sequence_numbers.insert(transaction.sender, expected + 1);
        state.clock += 1;
        state.version += 1;

        let hash = transaction_hash(&signing_message, authenticator);
        let outcome = match self.execute(&mut state, transaction.sender, &transaction.payload) {
            Ok(()) => Outcome::Committed(CommittedTransaction {
                hash: hash.clone(),
                version: state.version,
                timestamp: state.clock,
            }),
            Err(reason) => Outcome::Aborted(reason),
        };
        debug!(
            %hash,
            function = %transaction.payload.function,
            sender = %transaction.sender,
            "executed transaction"
        );
        state.outcomes.insert(hash.clone(), outcome);

        Ok(PendingTransaction {
            hash,
            sender: transaction.sender,
            sequence_number: transaction.sequence_number,
        })
    }

    async fn wait_for_transaction(&self, hash: &TransactionHash) -> Result<CommittedTransaction> {
        let state = self.state.lock().await;
        match state.outcomes.get(hash) {
            Some(Outcome::Committed(committed)) => {
                info!(%hash, version = committed.version, "transaction committed");
                Ok(committed.clone())
            }
            Some(Outcome::Aborted(reason)) => Err(AcmpError::Ledger(format!(
                "transaction {hash} aborted: {reason}"
            ))),
            None => Err(AcmpError::Ledger(format!("transaction {hash} not found"))),
        }
    }

    async fn view(&self, request: ViewRequest) -> Result<Vec<serde_json::Value>> {
        let state = self.state.lock().await;
        match self.contract_function(&request.function) {
            Some("get_messages") => Ok(vec![self.get_messages(&state, &request.arguments)?]),
            _ => Err(AcmpError::Ledger(format!(
                "{E_FUNCTION_NOT_FOUND}: {}",
                request.function
            ))),
        }
    }

    async fn ledger_timestamp(&self) -> Result<u64> {
        Ok(self.now().await)
    }
}
