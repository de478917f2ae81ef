// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The persisted enabled-type configuration could not be read. Fatal.
    #[error("configuration read failed: {0}")]
    ConfigurationRead(String),
    /// The batched write of the enabled-type configuration failed.
    #[error("configuration write failed: {0}")]
    PersistenceWrite(String),
    #[error("cache type not found: {0}")]
    CacheTypeNotFound(String),
    #[error("duplicate cache type: {0}")]
    DuplicateCacheType(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("{name} cleaner failed: {message}")]
    Cleaner { name: String, message: String },
    #[error("usage: {0}")]
    Usage(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    /// Fatal errors abort the command before any output is produced.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ConfigurationRead(_))
    }
}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(format!("serialization: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
