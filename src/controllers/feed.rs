use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::domain::feed::{encode, FeedQuery, FeedRequest, FeedService, FeedServiceApi};
use crate::error::{AppError, AppResult};

const FEED_SUFFIX: &str = ".rss";

pub struct FeedController {
    feed_service: Arc<FeedService>,
}

impl FeedController {
    pub fn new(feed_service: Arc<FeedService>) -> Self {
        Self { feed_service }
    }

    /// GET /{ident}.rss - RSS feed of a source's processed items
    pub async fn get_rss(
        State(controller): State<Arc<FeedController>>,
        Path(file_name): Path<String>,
        query: Option<Query<FeedQuery>>,
    ) -> AppResult<Response> {
        let ident = file_name
            .strip_suffix(FEED_SUFFIX)
            .filter(|ident| !ident.is_empty())
            .ok_or_else(|| AppError::NotFound(format!("No feed at /{}", file_name)))?;

        let Query(params) = query.unwrap_or_default();
        let request = FeedRequest::new(ident, params.limit());

        let document = controller.feed_service.get_feed(&request).await?;
        let feed = encode(&document)?;

        Ok((
            [
                (header::CONTENT_TYPE, feed.content_type.to_string()),
                (header::LAST_MODIFIED, feed.last_modified),
            ],
            feed.body,
        )
            .into_response())
    }
}
