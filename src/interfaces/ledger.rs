use async_trait::async_trait;

use crate::domains::address::AccountAddress;
use crate::domains::transaction::{
    AccountAuthenticator, CommittedTransaction, EntryFunctionPayload, PendingTransaction,
    RawTransaction, TransactionHash, ViewRequest,
};
use crate::error::Result;

/// Transaction building, submission and read-only view access to the ledger
/// hosting the mailbox contract.
///
/// Timeouts and retries, if any, live in implementations.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn build_transaction(
        &self,
        sender: AccountAddress,
        payload: EntryFunctionPayload,
    ) -> Result<RawTransaction>;

    async fn submit_transaction(
        &self,
        transaction: &RawTransaction,
        authenticator: &AccountAuthenticator,
    ) -> Result<PendingTransaction>;

    /// Resolves once the transaction is final. A transaction that executed but
    /// aborted is reported as an error.
    async fn wait_for_transaction(&self, hash: &TransactionHash) -> Result<CommittedTransaction>;

    async fn view(&self, request: ViewRequest) -> Result<Vec<serde_json::Value>>;

    /// Timestamp of the latest committed ledger state.
    async fn ledger_timestamp(&self) -> Result<u64>;
}
