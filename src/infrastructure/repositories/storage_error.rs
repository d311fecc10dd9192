/// Postgres SQLSTATE for `undefined_table`
const UNDEFINED_TABLE: &str = "42P01";

/// What went wrong at the storage backend, independent of the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFailureKind {
    /// The requested relation does not exist
    MissingRelation,
    /// No connection to the backend could be obtained
    Unavailable,
    /// The backend rejected the query, or a row could not be decoded
    Query,
    /// The driver reported an error we have no mapping for
    Unrecognized,
}

/// Driver-agnostic storage failure.
///
/// Built from `sqlx::Error` at the repository boundary so nothing above the
/// repositories depends on the driver's error type.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct StorageError {
    kind: StorageFailureKind,
    message: String,
}

impl StorageError {
    pub fn new(kind: StorageFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Wrap a failure to acquire a connection.
    pub fn unavailable(err: sqlx::Error) -> Self {
        Self::new(StorageFailureKind::Unavailable, err.to_string())
    }

    pub fn kind(&self) -> StorageFailureKind {
        self.kind
    }

    /// Does this failure mean the target collection does not exist?
    pub fn is_missing_relation(&self) -> bool {
        self.kind == StorageFailureKind::MissingRelation
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) if code == UNDEFINED_TABLE => StorageFailureKind::MissingRelation,
                Some(_) => StorageFailureKind::Query,
                None => StorageFailureKind::Unrecognized,
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => StorageFailureKind::Unavailable,
            sqlx::Error::RowNotFound
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::Protocol(_) => StorageFailureKind::Query,
            _ => StorageFailureKind::Unrecognized,
        };

        Self::new(kind, err.to_string())
    }
}
