use std::sync::Arc;

use cn_archive::ArchiveStore;
use cn_feeds::FeedClient;

pub struct AppState {
    pub feeds: FeedClient,
    pub archive: Arc<dyn ArchiveStore>,
}
