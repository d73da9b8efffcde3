//! Advisory per-process "I already signed" cache.
//!
//! Spares a returning client the resubmission round trip and keeps the
//! UI honest across a reload. Never authoritative: the store's dedup
//! precondition is the sole source of truth, and other clients never
//! see this cache.

use parking_lot::Mutex;
use std::collections::HashMap;

/// What this session submitted when its signature was accepted.
#[derive(Debug, Clone)]
pub struct SignedMarker {
    pub text: String,
    pub email: Option<String>,
}

#[derive(Debug, Default)]
pub struct SignedCache {
    inner: Mutex<HashMap<String, SignedMarker>>,
}

impl SignedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, slug: &str, marker: SignedMarker) {
        self.inner.lock().insert(slug.to_string(), marker);
    }

    pub fn get(&self, slug: &str) -> Option<SignedMarker> {
        self.inner.lock().get(slug).cloned()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.inner.lock().contains_key(slug)
    }
}
