use super::error::ResolveError;
use super::ident::FeedIdent;
use super::model::{FeedDocument, FeedRequest, StoredItem};
use crate::infrastructure::repositories::ItemRepository;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

pub struct FeedService {
    item_repo: Arc<dyn ItemRepository>,
    source_label: String,
    allowed_idents: Option<HashSet<String>>,
}

impl FeedService {
    pub fn new(
        item_repo: Arc<dyn ItemRepository>,
        source_label: String,
        allowed_idents: Option<HashSet<String>>,
    ) -> Self {
        Self {
            item_repo,
            source_label,
            allowed_idents,
        }
    }
}

#[async_trait]
pub trait FeedServiceApi: Send + Sync {
    /// Newest processed rows of the collection named by `ident`.
    async fn resolve(&self, ident: &str, limit: u32) -> Result<Vec<StoredItem>, ResolveError>;

    /// Resolve the request and shape the rows into a feed document.
    async fn get_feed(&self, request: &FeedRequest) -> Result<FeedDocument, ResolveError>;
}

#[async_trait]
impl FeedServiceApi for FeedService {
    async fn resolve(&self, ident: &str, limit: u32) -> Result<Vec<StoredItem>, ResolveError> {
        let feed_ident = self.lookup_ident(ident)?;

        let items = self
            .item_repo
            .find_processed(&feed_ident, limit)
            .await
            .map_err(|e| ResolveError::from_storage(ident, e))?;

        tracing::debug!(ident = %feed_ident, limit, items = items.len(), "Resolved feed items");

        Ok(items)
    }

    async fn get_feed(&self, request: &FeedRequest) -> Result<FeedDocument, ResolveError> {
        let rows = self.resolve(&request.ident, request.limit).await?;
        Ok(FeedDocument::build(&request.ident, rows, &self.source_label))
    }
}

impl FeedService {
    /// Map a caller-supplied identifier to a relation we are willing to read.
    fn lookup_ident(&self, ident: &str) -> Result<FeedIdent, ResolveError> {
        let feed_ident =
            FeedIdent::parse(ident).ok_or_else(|| ResolveError::NotFound(ident.to_string()))?;

        if let Some(allowed) = &self.allowed_idents {
            if !allowed.contains(feed_ident.as_str()) {
                return Err(ResolveError::NotFound(ident.to_string()));
            }
        }

        Ok(feed_ident)
    }
}
