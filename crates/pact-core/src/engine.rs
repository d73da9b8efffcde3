//! Engine facade.
//!
//! Wires the components over shared `Store` and `Notifier` seams. The
//! engine holds no state of its own beyond the advisory signed cache;
//! all correctness comes from the store's conditional writes, so any
//! number of independent engine instances can act on the same pact.

use crate::completion::{CompletionError, CompletionGate};
use crate::config::EngineConfig;
use crate::feed::{ActivityFeed, FeedError};
use crate::invites::{InviteError, Inviter};
use crate::ledger::{SignatureLedger, SignatureReceipt, SubmitError};
use crate::models::{CompletionStatus, Pact, PactDraft, Signature};
use crate::notify::Notifier;
use crate::signed_cache::SignedCache;
use crate::slug::{AllocationError, SlugAllocator};
use crate::store::{EventSubscription, Store, StoreError};
use std::sync::Arc;

pub struct PactEngine {
    store: Arc<dyn Store>,
    allocator: SlugAllocator,
    ledger: SignatureLedger,
    gate: CompletionGate,
    feed: ActivityFeed,
    inviter: Inviter,
}

impl PactEngine {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(store, notifier, EngineConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        let cache = Arc::new(SignedCache::new());
        Self {
            allocator: SlugAllocator::new(store.clone(), config.clone()),
            ledger: SignatureLedger::new(store.clone(), notifier.clone(), cache),
            gate: CompletionGate::new(store.clone(), notifier.clone()),
            feed: ActivityFeed::new(store.clone(), config.feed_backlog),
            inviter: Inviter::new(store.clone(), notifier),
            store,
        }
    }

    /// Create a pact under a freshly allocated slug. The returned
    /// record carries the owner key; hand it to the creator's session
    /// and nowhere else.
    pub async fn create_pact(&self, draft: &PactDraft) -> Result<Pact, AllocationError> {
        self.allocator.allocate(draft).await
    }

    pub async fn get_pact(&self, slug: &str) -> Result<Option<Pact>, StoreError> {
        self.store.get_pact(slug).await
    }

    /// Signer list in creation order, for the public "who's in" view.
    pub async fn list_signatures(&self, slug: &str) -> Result<Vec<Signature>, StoreError> {
        self.store.list_signatures(slug).await
    }

    pub async fn submit_signature(
        &self,
        slug: &str,
        text: &str,
        email: Option<&str>,
    ) -> Result<SignatureReceipt, SubmitError> {
        self.ledger.submit(slug, text, email).await
    }

    pub async fn send_invites(
        &self,
        slug: &str,
        raw_emails: &str,
        inviter_name: Option<&str>,
    ) -> Result<Vec<String>, InviteError> {
        self.inviter.send_invites(slug, raw_emails, inviter_name).await
    }

    pub async fn evaluate_completion(
        &self,
        slug: &str,
    ) -> Result<CompletionStatus, CompletionError> {
        self.gate.evaluate(slug).await
    }

    pub async fn subscribe_feed(
        &self,
        slug: &str,
        presented_key: &str,
    ) -> Result<EventSubscription, FeedError> {
        self.feed.subscribe(slug, presented_key).await
    }
}
