//! Persistence seam.
//!
//! The engine runs once per call, in each client session; there is no
//! resident process to hold locks. Every state change is therefore a
//! precondition-guarded store write: slug allocation is put-if-absent,
//! signature acceptance re-checks dedup inside the append, and the
//! completion flip is a compare-and-set. A `Store` implementation that
//! weakens any of these guards reintroduces duplicate slugs, duplicate
//! signatures, or duplicate completion notifications.

pub mod memory;

pub use memory::MemoryStore;

use crate::models::{NewSignature, Pact, PactEvent, Signature};
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("pact not found: {0}")]
    NotFound(String),

    /// The backend could not be reached. Callers fail closed: this is
    /// never treated as an accepted write.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of a put-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    Exists,
}

/// Result of a dedup-guarded signature append.
#[derive(Debug)]
pub enum AppendOutcome {
    Appended(Signature),
    /// A concurrent writer already recorded the same normalized text
    /// or email; nothing was written.
    Duplicate,
}

/// Result of the completion compare-and-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// This caller flipped the flag and owns the one-time
    /// completion dispatch.
    Won,
    /// Another caller got there first; perform no user-visible action.
    AlreadyDone,
}

/// A feed attachment: the recent committed backlog, separated from the
/// live channel so replayed events are never mistaken for new ones.
#[derive(Debug)]
pub struct EventSubscription {
    /// At most the N most recent committed events, ascending by
    /// creation time.
    pub backlog: Vec<PactEvent>,
    /// Events committed after attach, in non-decreasing creation-time
    /// order, each delivered exactly once.
    pub live: UnboundedReceiver<PactEvent>,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_pact(&self, slug: &str) -> Result<Option<Pact>, StoreError>;

    /// Insert the pact iff no record holds its slug.
    async fn put_pact_if_absent(&self, pact: Pact) -> Result<PutOutcome, StoreError>;

    /// All signatures on the pact, ascending by creation time.
    async fn list_signatures(&self, slug: &str) -> Result<Vec<Signature>, StoreError>;

    /// Append a signature iff no existing signature matches its
    /// normalized text or non-empty normalized email. The matching
    /// `agree` event is written in the same atomic batch, and the
    /// store assigns the timestamp.
    async fn append_signature(
        &self,
        slug: &str,
        signature: NewSignature,
    ) -> Result<AppendOutcome, StoreError>;

    /// Union the normalized addresses into the invite set (the set
    /// never shrinks) and append one `invite` event per submitted
    /// address in the same batch. Returns the merged set.
    async fn merge_invites(
        &self,
        slug: &str,
        emails: &[String],
    ) -> Result<Vec<String>, StoreError>;

    /// Compare-and-set `all_signed_notified` false -> true, recording
    /// `completed_at`. Exactly one concurrent caller observes `Won`.
    async fn complete_if_unnotified(&self, slug: &str) -> Result<CasOutcome, StoreError>;

    /// Attach to the pact's event log with a bounded recent backlog.
    async fn subscribe_events(
        &self,
        slug: &str,
        backlog: usize,
    ) -> Result<EventSubscription, StoreError>;
}
