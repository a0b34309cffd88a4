use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebitError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Encryption failed: {0}")]
    Encryption(String),
    #[error("Decryption failed: {0}")]
    Decryption(String),
    #[error("Mandate reference {0} is already taken")]
    DuplicateReference(String),
    #[error("Order {0} already has a mandate")]
    MandateExists(u64),
    #[error("No mandate recorded for order {0}")]
    MandateNotFound(u64),
    #[error("Mandate {0} has already been generated")]
    AlreadyGenerated(String),
    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, DebitError>;

impl From<toml::de::Error> for DebitError {
    fn from(e: toml::de::Error) -> Self {
        DebitError::ConfigError(e.to_string())
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for DebitError {
    fn from(e: rocksdb::Error) -> Self {
        DebitError::InternalError(Box::new(e))
    }
}
