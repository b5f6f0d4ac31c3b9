use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt store file: {0}")]
    Corrupt(String),

    #[error("Unknown storage area: {0}")]
    UnknownArea(String),
}

impl From<StoreError> for taskclock_common::Error {
    fn from(err: StoreError) -> Self {
        taskclock_common::Error::Store(err.to_string())
    }
}
