pub mod encoder;
pub mod error;
pub mod ident;
pub mod model;
pub mod service;

pub use encoder::{encode, EncodedFeed, RSS_CONTENT_TYPE};
pub use error::{EncodeError, ResolveError};
pub use ident::FeedIdent;
pub use model::{FeedDocument, FeedItem, FeedQuery, FeedRequest, StoredItem};
pub use service::{FeedService, FeedServiceApi};
