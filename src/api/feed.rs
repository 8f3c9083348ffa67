use std::sync::Arc;
use tokio::sync::watch;

/// Wakes live catalogue subscriptions after a product write. Subscribers
/// re-query on every tick instead of reading a payload off the channel, so
/// rapid writes coalesce into a single refresh for a slow subscriber.
#[derive(Clone)]
pub struct ProductFeed {
    revision: Arc<watch::Sender<u64>>,
}

impl ProductFeed {
    pub fn new() -> ProductFeed {
        let (revision, _) = watch::channel(0);
        ProductFeed {
            revision: Arc::new(revision),
        }
    }

    pub fn publish(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

impl Default for ProductFeed {
    fn default() -> ProductFeed {
        ProductFeed::new()
    }
}
