use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Natural key {key} unresolved after lookup flush")]
    UnresolvedKey { key: String },
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl ImportError {
    //Connection-level failures abort the run; anything row- or data-shaped
    //fails only the current batch.
    pub fn is_fatal(&self) -> bool {
        match self {
            ImportError::Store(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::Protocol(_)
                    | sqlx::Error::Configuration(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            ImportError::UnresolvedKey { .. } => false,
        }
    }
}
