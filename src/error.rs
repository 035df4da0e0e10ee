use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcmpError {
    #[error("invalid input")]
    InvalidInput,
    #[error("invalid payload")]
    InvalidPayload,
    #[error("invalid header")]
    InvalidMessageHeader,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("ledger error: {0}")]
    Ledger(String),
    #[error("key directory error: {0}")]
    KeyDirectory(String),
    #[error("encryption error: {0}")]
    Encryption(String),
    #[error("signer error: {0}")]
    Signer(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, AcmpError>;
