use std::time::Duration;

use roster_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid match group config: {0}")]
    InvalidConfig(String),
    #[error("cannot resolve owner: {0}")]
    OwnerResolution(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("match group assembly did not finish within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
}
