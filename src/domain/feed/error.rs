use crate::error::AppError;
use crate::infrastructure::repositories::{StorageError, StorageFailureKind};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no feed data for {0}")]
    NotFound(String),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("unrecognised backend error: {0}")]
    Unclassified(String),
}

impl ResolveError {
    /// Translate a storage failure while reading the collection for `ident`.
    pub fn from_storage(ident: &str, err: StorageError) -> Self {
        if err.is_missing_relation() {
            return ResolveError::NotFound(ident.to_string());
        }

        match err.kind() {
            StorageFailureKind::Unavailable => ResolveError::BackendUnavailable(err.to_string()),
            StorageFailureKind::Query => ResolveError::QueryFailed(err.to_string()),
            StorageFailureKind::MissingRelation | StorageFailureKind::Unrecognized => {
                ResolveError::Unclassified(err.to_string())
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to write feed xml: {0}")]
    Xml(String),
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(ident) => {
                AppError::NotFound(format!("Could not find RSS data for {}", ident))
            }
            ResolveError::BackendUnavailable(msg) => AppError::BackendUnavailable(msg),
            ResolveError::QueryFailed(msg) => AppError::Database(msg),
            err @ ResolveError::Unclassified(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<EncodeError> for AppError {
    fn from(err: EncodeError) -> Self {
        AppError::Internal(err.to_string())
    }
}
