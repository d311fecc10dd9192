pub mod item_repository;
pub mod storage_error;

pub use item_repository::{ItemRepository, PgItemRepository, PROCESSED_STATUS};
pub use storage_error::{StorageError, StorageFailureKind};
