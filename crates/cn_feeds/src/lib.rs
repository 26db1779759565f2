pub mod client;
pub mod sources;

pub use client::{time_ago, FeedClient};
pub use sources::{defi_sources, FeedSource, FEED_SOURCES};

pub mod prelude {
    pub use crate::client::FeedClient;
    pub use crate::sources::FeedSource;
    pub use cn_core::{Article, Error, Result};
}
