use thiserror::Error;

use crate::board::LocalItemId;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline session is not ready (state: {0})")]
    SessionNotReady(&'static str),
    #[error("item {0} is not on the board")]
    UnknownItem(LocalItemId),
    #[error("item {0} has no remote artwork id")]
    MissingRemoteId(LocalItemId),
    #[error("status update failed ({sync_error}) and the board could not be refetched: {source:#}")]
    Reconcile {
        sync_error: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
