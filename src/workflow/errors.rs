use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("unknown entity type {0:?}")]
    UnknownEntity(String),

    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: Uuid },

    #[error("{actor} may not move {collection} from {from} to {to}")]
    Unauthorized {
        actor: String,
        collection: String,
        from: String,
        to: String,
    },

    #[error("invalid status {status:?} for {collection}")]
    InvalidStatus { collection: String, status: String },

    #[error("cannot move {collection} from {from} to {to}")]
    InvalidTransition {
        collection: String,
        from: String,
        to: String,
    },

    #[error("{collection}/{id} was modified by another request")]
    Conflict { collection: String, id: Uuid },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// Short label returned to callers, matched by the UI to localized text
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowError::UnknownEntity(_) | WorkflowError::NotFound { .. } => "not found",
            WorkflowError::Unauthorized { .. } => "unauthorized",
            WorkflowError::InvalidStatus { .. } => "invalid status",
            WorkflowError::InvalidTransition { .. } => "invalid transition",
            WorkflowError::Conflict { .. } => "conflict",
            WorkflowError::InvalidPayload(_) => "invalid payload",
            WorkflowError::Store(_) => "error",
        }
    }

    /// Guard rejections are expected traffic; only store failures are operational errors
    pub fn is_rejection(&self) -> bool {
        !matches!(self, WorkflowError::Store(_))
    }
}
