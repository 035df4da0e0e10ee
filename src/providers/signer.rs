use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use rand_core::OsRng;
use sha2::{Digest, Sha256};

use crate::domains::address::AccountAddress;
use crate::domains::transaction::{AccountAuthenticator, RawTransaction};
use crate::error::{AcmpError, Result};
use crate::interfaces::signer::Signer;

const SINGLE_KEY_SCHEME: u8 = 0x00;

/// Account address derived from an Ed25519 public key.
pub fn derive_address(public_key: &VerifyingKey) -> AccountAddress {
    let mut hasher = Sha256::new();
    hasher.update(public_key.as_bytes());
    hasher.update([SINGLE_KEY_SCHEME]);
    let digest: [u8; 32] = hasher.finalize().into();
    AccountAddress::new(digest)
}

/// Signs transactions with a locally held Ed25519 key.
pub struct LocalSigner {
    key: SigningKey,
    address: AccountAddress,
}

impl LocalSigner {
    pub fn new(key: SigningKey) -> Self {
        let address = derive_address(&key.verifying_key());
        Self { key, address }
    }

    pub fn generate() -> Self {
        Self::new(SigningKey::generate(&mut OsRng))
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.key.to_bytes()
    }
}

#[async_trait]
impl Signer for LocalSigner {
    fn account_address(&self) -> AccountAddress {
        self.address
    }

    async fn sign_transaction(&self, transaction: &RawTransaction) -> Result<AccountAuthenticator> {
        if transaction.sender != self.address {
            return Err(AcmpError::Signer(format!(
                "transaction sender {} does not match signer {}",
                transaction.sender, self.address
            )));
        }
        let signature = self.key.sign(&transaction.signing_message()?);
        Ok(AccountAuthenticator {
            public_key: self.key.verifying_key().to_bytes(),
            signature: signature.to_bytes().to_vec(),
        })
    }
}

/// Checks the signature and that the key owns the sending account.
pub fn verify_authenticator(
    transaction: &RawTransaction,
    authenticator: &AccountAuthenticator,
) -> Result<()> {
    let public_key = VerifyingKey::from_bytes(&authenticator.public_key)
        .map_err(|e| AcmpError::Ledger(format!("invalid authenticator key: {e}")))?;
    if derive_address(&public_key) != transaction.sender {
        return Err(AcmpError::Ledger(
            "authenticator key does not own the sender account".to_string(),
        ));
    }
    let signature = ed25519_dalek::Signature::from_slice(&authenticator.signature)
        .map_err(|e| AcmpError::Ledger(format!("invalid signature: {e}")))?;
    public_key
        .verify_strict(&transaction.signing_message()?, &signature)
        .map_err(|e| AcmpError::Ledger(format!("signature verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::transaction::{EntryFunctionPayload, FunctionId};

    fn transaction(sender: AccountAddress) -> RawTransaction {
        RawTransaction {
            sender,
            sequence_number: 0,
            payload: EntryFunctionPayload {
                function: FunctionId::new(AccountAddress::new([1; 32]), "acmp", "create_store"),
                arguments: Vec::new(),
            },
        }
    }

    #[tokio::test]
    async fn signature_verifies() {
        let signer = LocalSigner::generate();
        let txn = transaction(signer.account_address());
        let auth = signer.sign_transaction(&txn).await.unwrap();
        verify_authenticator(&txn, &auth).unwrap();

        let mut tampered = txn.clone();
        tampered.sequence_number = 1;
        assert!(verify_authenticator(&tampered, &auth).is_err());
    }

    #[tokio::test]
    async fn refuses_foreign_sender() {
        let signer = LocalSigner::generate();
        let other = LocalSigner::generate();
        let txn = transaction(other.account_address());
        assert!(matches!(
            signer.sign_transaction(&txn).await,
            Err(AcmpError::Signer(_))
        ));
    }
}
