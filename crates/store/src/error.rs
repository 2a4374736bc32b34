use detailhq_core::error::CoreError;

/// Failure talking to the remote tier.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The remote could not be reached (network down, pool exhausted).
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    /// The remote refused the operation.
    #[error("Remote store rejected the request: {0}")]
    Rejected(String),

    /// A stored row could not be decoded.
    #[error("Remote row could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
