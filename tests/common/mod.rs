#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use acmp::e2e::identity_store::MemoryIdentityStore;
use acmp::e2e::manager::LocalEncryptor;
use acmp::e2e::IdentityKeypair;
use acmp::error::Result;
use acmp::interfaces::key_directory::KeyDirectory;
use acmp::interfaces::signer::Signer;
use acmp::providers::{LocalSigner, MemoryKeyDirectory, MemoryLedger};
use acmp::{AccountAddress, Collaborators, Config, MessagingClient, PublicKey};

pub const CONTRACT: &str = "0xb60fd39de7a42e40bc1393a72f5212334c178e318248bc85138fc82fc34c8ef6";

pub fn config() -> Config {
    Config::new(CONTRACT.parse().unwrap())
}

/// A shared in-memory ledger and key directory.
pub struct Network {
    pub ledger: Arc<MemoryLedger>,
    pub directory: Arc<MemoryKeyDirectory>,
    pub config: Config,
}

impl Network {
    pub fn new() -> Self {
        let config = config();
        Self {
            ledger: Arc::new(MemoryLedger::new(
                config.contract_address().unwrap(),
                config.module(),
            )),
            directory: Arc::new(MemoryKeyDirectory::new()),
            config,
        }
    }

    pub async fn party(&self) -> Party {
        self.party_with_directory(self.directory.clone()).await
    }

    /// A party whose client resolves keys through `key_directory` while its
    /// key is still published to the shared directory.
    pub async fn party_with_directory(&self, key_directory: Arc<dyn KeyDirectory>) -> Party {
        let signer = Arc::new(LocalSigner::generate());
        let address = signer.account_address();
        let identities = Arc::new(MemoryIdentityStore::new(IdentityKeypair::generate()));
        let encryptor = Arc::new(LocalEncryptor::new(identities.clone()));
        self.directory
            .publish_key(address, encryptor.public_key(None).unwrap(), 0)
            .await;
        let client = MessagingClient::new(
            &self.config,
            Collaborators {
                ledger: self.ledger.clone(),
                key_directory,
                encryptor: encryptor.clone(),
                signer,
            },
        )
        .unwrap();
        Party {
            client,
            address,
            identities,
            encryptor,
        }
    }
}

pub struct Party {
    pub client: MessagingClient,
    pub address: AccountAddress,
    pub identities: Arc<MemoryIdentityStore>,
    pub encryptor: Arc<LocalEncryptor>,
}

impl Party {
    /// Rotates the encryption identity and publishes the new key, both valid
    /// from `valid_from`.
    pub async fn rotate(&self, network: &Network, valid_from: u64) -> PublicKey {
        let identity = IdentityKeypair::generate();
        let key: PublicKey = identity.public.into();
        self.identities.rotate(valid_from, identity).unwrap();
        network.directory.publish_key(self.address, key, valid_from).await;
        key
    }
}

/// Counts lookups and delays them so that later timestamps finish first.
pub struct SlowKeyDirectory {
    inner: Arc<MemoryKeyDirectory>,
    pub lookups: AtomicUsize,
}

impl SlowKeyDirectory {
    pub fn new(inner: Arc<MemoryKeyDirectory>) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl KeyDirectory for SlowKeyDirectory {
    async fn fetch_key(&self, whose: &AccountAddress, timestamp: Option<u64>) -> Result<PublicKey> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(ts) = timestamp {
            let delay = 50u64.saturating_sub(ts.min(50));
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.inner.fetch_key(whose, timestamp).await
    }
}
