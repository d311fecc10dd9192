use crate::domain::feed::{FeedIdent, StoredItem};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::repositories::StorageError;
use async_trait::async_trait;
use std::sync::Arc;

/// `queue` value marking rows that are ready to be published
pub const PROCESSED_STATUS: &str = "PROCESSED";

/// Read access to the per-source item collections.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Newest processed items of the collection named by `ident`, at most
    /// `limit` of them.
    ///
    /// # Errors
    /// Returns a [`StorageError`] whose kind tells a missing collection apart
    /// from connectivity and query failures.
    async fn find_processed(
        &self,
        ident: &FeedIdent,
        limit: u32,
    ) -> Result<Vec<StoredItem>, StorageError>;
}

pub struct PgItemRepository {
    pool: Arc<DbPool>,
}

impl PgItemRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

/// The relation name is the only part not bound as a parameter; it comes
/// pre-quoted from a validated [`FeedIdent`].
fn processed_items_query(ident: &FeedIdent) -> String {
    format!(
        r#"
        SELECT url, title, added
        FROM {}
        WHERE queue = $1
        ORDER BY id DESC
        LIMIT $2
        "#,
        ident.quoted()
    )
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn find_processed(
        &self,
        ident: &FeedIdent,
        limit: u32,
    ) -> Result<Vec<StoredItem>, StorageError> {
        // Returned to the pool when dropped, on every path out of here
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StorageError::unavailable)?;

        let query = processed_items_query(ident);
        let items = sqlx::query_as::<_, StoredItem>(&query)
            .bind(PROCESSED_STATUS)
            .bind(i64::from(limit))
            .fetch_all(&mut *conn)
            .await?;

        Ok(items)
    }
}
