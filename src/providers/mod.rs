pub mod key_directory;
pub mod ledger;
pub mod signer;

pub use key_directory::MemoryKeyDirectory;
pub use ledger::MemoryLedger;
pub use signer::LocalSigner;
