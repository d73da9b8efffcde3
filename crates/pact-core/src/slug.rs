//! Public identifier allocation.
//!
//! Slugs are random, not derived from the title, so a shared URL leaks
//! nothing about the pact's content. Uniqueness comes from the store's
//! put-if-absent primitive rather than any lock: allocation just keeps
//! proposing fresh candidates until one lands, bounded to a handful of
//! attempts so a pathological store cannot spin the loop forever.

use crate::config::EngineConfig;
use crate::constants::{RANDOM_ALPHABET, SLUG_PREFIX};
use crate::models::{Pact, PactDraft};
use crate::store::{PutOutcome, Store, StoreError};
use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Random token over the low-ambiguity alphabet.
pub fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| RANDOM_ALPHABET[rng.gen_range(0..RANDOM_ALPHABET.len())] as char)
        .collect()
}

/// A fresh slug candidate, e.g. `pact-7fk2m9qa`.
pub fn random_slug(token_len: usize) -> String {
    format!("{SLUG_PREFIX}{}", random_token(token_len))
}

#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("please add a title")]
    EmptyTitle,

    #[error("please describe the pact")]
    EmptyBody,

    /// Every candidate collided. Retryable by the caller.
    #[error("unable to generate a unique link after {0} attempts; please try again")]
    Exhausted(usize),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Assemble the pact record for a chosen slug. Creation is the only
/// place a slug or owner key is chosen; both are immutable afterwards.
pub fn build_pact(draft: &PactDraft, slug: String, owner_key: String) -> Pact {
    let created_at = Utc::now();
    let expires_at = (draft.duration_days > 0)
        .then(|| created_at + Duration::days(i64::from(draft.duration_days)));
    Pact {
        slug,
        title: draft.title.trim().to_string(),
        body: draft.body.trim().to_string(),
        owner_key,
        invited_emails: Vec::new(),
        all_signed_notified: false,
        duration_days: draft.duration_days,
        created_at,
        expires_at,
        completed_at: None,
    }
}

/// Allocates unique pact identifiers against the store.
pub struct SlugAllocator {
    store: Arc<dyn Store>,
    config: EngineConfig,
}

impl SlugAllocator {
    pub fn new(store: Arc<dyn Store>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Validate the draft and create the pact under a freshly
    /// allocated slug. Returns the created record, owner key included.
    pub async fn allocate(&self, draft: &PactDraft) -> Result<Pact, AllocationError> {
        if draft.title.trim().is_empty() {
            return Err(AllocationError::EmptyTitle);
        }
        if draft.body.trim().is_empty() {
            return Err(AllocationError::EmptyBody);
        }

        let owner_key = random_token(self.config.owner_key_len);
        for attempt in 1..=self.config.allocation_attempts {
            let candidate = random_slug(self.config.slug_token_len);
            let pact = build_pact(draft, candidate.clone(), owner_key.clone());
            match self.store.put_pact_if_absent(pact.clone()).await? {
                PutOutcome::Created => return Ok(pact),
                PutOutcome::Exists => {
                    debug!(slug = %candidate, attempt, "slug candidate taken, retrying");
                }
            }
        }
        Err(AllocationError::Exhausted(self.config.allocation_attempts))
    }
}
