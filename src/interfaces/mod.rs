pub mod encryption;
pub mod key_directory;
pub mod ledger;
pub mod signer;
