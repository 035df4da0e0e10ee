use async_trait::async_trait;

use crate::domains::address::AccountAddress;
use crate::domains::keys::PublicKey;
use crate::error::Result;

#[async_trait]
pub trait KeyDirectory: Send + Sync {
    /// With a timestamp, returns the key that was valid at that point in
    /// ledger time; without one, the most recently published key.
    async fn fetch_key(&self, whose: &AccountAddress, timestamp: Option<u64>) -> Result<PublicKey>;
}
