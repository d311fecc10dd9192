use chrono::{DateTime, SubsecRound, Utc};
use serde::Deserialize;
use sqlx::FromRow;

/// Row cap applied when the caller gives no usable `limit`
pub const DEFAULT_LIMIT: u32 = 50;

/// Attribution written into every item's `<source>` element
pub const DEFAULT_SOURCE_LABEL: &str = "Ocular8 Spider";

/// Query string accepted on `/{ident}.rss`, kept as raw pairs so repeated
/// keys don't reject the request
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct FeedQuery(Vec<(String, String)>);

impl FeedQuery {
    /// First `limit` value, if any
    pub fn limit(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == "limit")
            .map(|(_, value)| value.as_str())
    }
}

/// A single feed lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub ident: String,
    pub limit: u32,
}

impl FeedRequest {
    pub fn new(ident: impl Into<String>, raw_limit: Option<&str>) -> Self {
        Self {
            ident: ident.into(),
            limit: parse_limit(raw_limit),
        }
    }
}

/// Parse a `limit` query value, falling back to [`DEFAULT_LIMIT`] for
/// missing, empty, zero, negative or non-numeric input.
pub fn parse_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_LIMIT)
}

/// A processed row as stored by the crawler
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StoredItem {
    pub url: String,
    pub title: String,
    pub added: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub guid: String,
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub source: String,
    pub title: String,
}

impl FeedItem {
    pub fn from_stored(item: StoredItem, source: &str) -> Self {
        Self {
            guid: item.url.clone(),
            link: item.url,
            // Knock down to whole seconds
            pub_date: item.added.trunc_subsecs(0),
            source: source.to_string(),
            title: item.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedDocument {
    pub title: String,
    pub items: Vec<FeedItem>,
}

impl FeedDocument {
    /// Build the document for `ident`, keeping the rows in the order given.
    pub fn build(ident: &str, rows: Vec<StoredItem>, source: &str) -> Self {
        Self {
            title: format!("RSS Feed for {}", ident),
            items: rows
                .into_iter()
                .map(|row| FeedItem::from_stored(row, source))
                .collect(),
        }
    }

    /// Publication date of the newest item, if there is one
    pub fn freshness(&self) -> Option<DateTime<Utc>> {
        self.items.first().map(|item| item.pub_date)
    }
}
