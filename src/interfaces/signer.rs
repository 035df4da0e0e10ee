use async_trait::async_trait;

use crate::domains::address::AccountAddress;
use crate::domains::transaction::{AccountAuthenticator, RawTransaction};
use crate::error::Result;

#[async_trait]
pub trait Signer: Send + Sync {
    fn account_address(&self) -> AccountAddress;

    async fn sign_transaction(&self, transaction: &RawTransaction) -> Result<AccountAuthenticator>;
}
