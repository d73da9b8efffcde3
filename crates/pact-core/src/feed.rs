//! Owner-facing live activity feed.
//!
//! The owner capability is the only thing protecting this stream; it
//! is compared verbatim against the stored key. (A hardened deployment
//! would verify a signed token at a trusted boundary instead of
//! trusting a client-supplied value.) Subscribers get a bounded recent
//! backlog for initial render plus a live channel; the two are kept
//! separate so attach-time replay is never surfaced as new activity.
//! How long a displayed event lingers is the UI's business.

use crate::store::{EventSubscription, Store, StoreError};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("pact not found: {0}")]
    NotFound(String),

    /// Presented key does not match the owner capability.
    #[error("status not available")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ActivityFeed {
    store: Arc<dyn Store>,
    backlog: usize,
}

impl ActivityFeed {
    pub fn new(store: Arc<dyn Store>, backlog: usize) -> Self {
        Self { store, backlog }
    }

    /// Attach the owner's dashboard to the pact's event log.
    pub async fn subscribe(
        &self,
        slug: &str,
        presented_key: &str,
    ) -> Result<EventSubscription, FeedError> {
        let pact = self
            .store
            .get_pact(slug)
            .await?
            .ok_or_else(|| FeedError::NotFound(slug.to_string()))?;
        if presented_key != pact.owner_key {
            debug!(slug, "feed subscription refused: bad owner key");
            return Err(FeedError::Unauthorized);
        }
        Ok(self.store.subscribe_events(slug, self.backlog).await?)
    }
}
