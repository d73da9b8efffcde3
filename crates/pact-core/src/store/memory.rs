//! In-memory reference store.
//!
//! Single source of truth for the store semantics the engine relies
//! on: every conditional write runs under one lock, so put-if-absent,
//! the dedup-guarded append, and the completion compare-and-set are
//! linearizable. Timestamps are assigned here and are strictly
//! increasing, which is what makes event and signature ordering
//! deterministic for subscribers.

use super::{AppendOutcome, CasOutcome, EventSubscription, PutOutcome, Store, StoreError};
use crate::models::{EventKind, NewSignature, Pact, PactEvent, Signature};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, UnboundedSender};
use uuid::Uuid;

struct PactState {
    pact: Pact,
    signatures: Vec<Signature>,
    events: Vec<PactEvent>,
    watchers: Vec<UnboundedSender<PactEvent>>,
}

struct Inner {
    pacts: HashMap<String, PactState>,
    /// Last timestamp handed out; the next one is always later, even
    /// if the wall clock stalls or steps back.
    last_ts: DateTime<Utc>,
    offline: bool,
}

/// Reference [`Store`] backed by process memory. Used by the test
/// suites and as the model any production backend must match.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                pacts: HashMap::new(),
                last_ts: Utc::now(),
                offline: false,
            }),
        }
    }

    /// Simulate backend unreachability; every operation fails with
    /// [`StoreError::Unavailable`] until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }
}

impl Inner {
    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Unavailable("memory store offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = if now > self.last_ts {
            now
        } else {
            self.last_ts + Duration::microseconds(1)
        };
        self.last_ts = ts;
        ts
    }

    fn state_mut(&mut self, slug: &str) -> Result<&mut PactState, StoreError> {
        self.pacts
            .get_mut(slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }
}

/// Push an event to the log and to every live watcher, dropping
/// watchers whose receiver is gone.
fn commit_event(state: &mut PactState, event: PactEvent) {
    state
        .watchers
        .retain(|watcher| watcher.send(event.clone()).is_ok());
    state.events.push(event);
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_pact(&self, slug: &str) -> Result<Option<Pact>, StoreError> {
        let inner = self.inner.lock();
        inner.check_online()?;
        Ok(inner.pacts.get(slug).map(|state| state.pact.clone()))
    }

    async fn put_pact_if_absent(&self, pact: Pact) -> Result<PutOutcome, StoreError> {
        let mut inner = self.inner.lock();
        inner.check_online()?;
        if inner.pacts.contains_key(&pact.slug) {
            return Ok(PutOutcome::Exists);
        }
        let slug = pact.slug.clone();
        inner.pacts.insert(
            slug,
            PactState {
                pact,
                signatures: Vec::new(),
                events: Vec::new(),
                watchers: Vec::new(),
            },
        );
        Ok(PutOutcome::Created)
    }

    async fn list_signatures(&self, slug: &str) -> Result<Vec<Signature>, StoreError> {
        let inner = self.inner.lock();
        inner.check_online()?;
        let state = inner
            .pacts
            .get(slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;
        Ok(state.signatures.clone())
    }

    async fn append_signature(
        &self,
        slug: &str,
        signature: NewSignature,
    ) -> Result<AppendOutcome, StoreError> {
        let mut inner = self.inner.lock();
        inner.check_online()?;
        let ts = inner.next_timestamp();
        let state = inner.state_mut(slug)?;

        // Dedup precondition re-checked inside the write: two clients
        // that both passed validation cannot both land.
        let normalized = crate::models::normalize_signature_text(&signature.text);
        let duplicate = state.signatures.iter().any(|existing| {
            existing.normalized_text() == normalized
                || matches!((&existing.email, &signature.email),
                    (Some(a), Some(b)) if a == b)
        });
        if duplicate {
            return Ok(AppendOutcome::Duplicate);
        }

        let recorded = Signature {
            id: Uuid::new_v4().to_string(),
            text: signature.text,
            email: signature.email,
            created_at: ts,
        };
        state.signatures.push(recorded.clone());

        // The agree event lands in the same batch as the signature, so
        // no reader ever sees one without the other.
        let event = PactEvent {
            id: Uuid::new_v4().to_string(),
            kind: EventKind::Agree {
                name: recorded.text.clone(),
            },
            created_at: ts,
        };
        commit_event(state, event);

        Ok(AppendOutcome::Appended(recorded))
    }

    async fn merge_invites(
        &self,
        slug: &str,
        emails: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.lock();
        inner.check_online()?;
        let ts = inner.next_timestamp();
        let state = inner.state_mut(slug)?;

        for email in emails {
            if !state.pact.invited_emails.contains(email) {
                state.pact.invited_emails.push(email.clone());
            }
            let event = PactEvent {
                id: Uuid::new_v4().to_string(),
                kind: EventKind::Invite {
                    email: email.clone(),
                },
                created_at: ts,
            };
            commit_event(state, event);
        }
        Ok(state.pact.invited_emails.clone())
    }

    async fn complete_if_unnotified(&self, slug: &str) -> Result<CasOutcome, StoreError> {
        let mut inner = self.inner.lock();
        inner.check_online()?;
        let ts = inner.next_timestamp();
        let state = inner.state_mut(slug)?;
        if state.pact.all_signed_notified {
            return Ok(CasOutcome::AlreadyDone);
        }
        state.pact.all_signed_notified = true;
        state.pact.completed_at = Some(ts);
        Ok(CasOutcome::Won)
    }

    async fn subscribe_events(
        &self,
        slug: &str,
        backlog: usize,
    ) -> Result<EventSubscription, StoreError> {
        let mut inner = self.inner.lock();
        inner.check_online()?;
        let state = inner.state_mut(slug)?;
        let skip = state.events.len().saturating_sub(backlog);
        let backlog = state.events[skip..].to_vec();
        let (tx, rx) = mpsc::unbounded_channel();
        state.watchers.push(tx);
        Ok(EventSubscription { backlog, live: rx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PactDraft;
    use crate::slug;

    fn new_pact(slug_value: &str, invited: &[&str]) -> Pact {
        let draft = PactDraft {
            title: "Weekend trip".to_string(),
            body: "Photos stay in the group chat.".to_string(),
            duration_days: 0,
        };
        let mut pact = slug::build_pact(&draft, slug_value.to_string(), "owner-key".to_string());
        pact.invited_emails = invited.iter().map(|s| s.to_string()).collect();
        pact
    }

    fn sig(text: &str, email: Option<&str>) -> NewSignature {
        NewSignature {
            text: text.to_string(),
            email: email.map(|e| e.to_string()),
        }
    }

    #[tokio::test]
    async fn test_put_if_absent_rejects_taken_slug() {
        let store = MemoryStore::new();
        let outcome = store.put_pact_if_absent(new_pact("pact-a", &[])).await.unwrap();
        assert_eq!(outcome, PutOutcome::Created);
        let outcome = store.put_pact_if_absent(new_pact("pact-a", &[])).await.unwrap();
        assert_eq!(outcome, PutOutcome::Exists);
    }

    #[tokio::test]
    async fn test_append_rejects_duplicate_text_and_email() {
        let store = MemoryStore::new();
        store.put_pact_if_absent(new_pact("pact-a", &[])).await.unwrap();

        let first = store.append_signature("pact-a", sig("Jane Doe", None)).await.unwrap();
        assert!(matches!(first, AppendOutcome::Appended(_)));

        let dup_text = store.append_signature("pact-a", sig("Jane Doe", None)).await.unwrap();
        assert!(matches!(dup_text, AppendOutcome::Duplicate));

        store
            .append_signature("pact-a", sig("Sam", Some("sam@x.com")))
            .await
            .unwrap();
        let dup_email = store
            .append_signature("pact-a", sig("Other Sam", Some("sam@x.com")))
            .await
            .unwrap();
        assert!(matches!(dup_email, AppendOutcome::Duplicate));
    }

    #[tokio::test]
    async fn test_signatures_listed_in_creation_order() {
        let store = MemoryStore::new();
        store.put_pact_if_absent(new_pact("pact-a", &[])).await.unwrap();
        for name in ["One", "Two", "Three"] {
            store.append_signature("pact-a", sig(name, None)).await.unwrap();
        }
        let listed = store.list_signatures("pact-a").await.unwrap();
        let names: Vec<_> = listed.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(names, vec!["One", "Two", "Three"]);
        assert!(listed.windows(2).all(|w| w[0].created_at < w[1].created_at));
    }

    #[tokio::test]
    async fn test_completion_cas_won_once() {
        let store = MemoryStore::new();
        store
            .put_pact_if_absent(new_pact("pact-a", &["a@x.com"]))
            .await
            .unwrap();
        assert_eq!(
            store.complete_if_unnotified("pact-a").await.unwrap(),
            CasOutcome::Won
        );
        assert_eq!(
            store.complete_if_unnotified("pact-a").await.unwrap(),
            CasOutcome::AlreadyDone
        );
        let pact = store.get_pact("pact-a").await.unwrap().unwrap();
        assert!(pact.all_signed_notified);
        assert!(pact.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_merge_invites_is_monotonic_union() {
        let store = MemoryStore::new();
        store
            .put_pact_if_absent(new_pact("pact-a", &["a@x.com"]))
            .await
            .unwrap();
        let merged = store
            .merge_invites("pact-a", &["b@x.com".to_string(), "a@x.com".to_string()])
            .await
            .unwrap();
        assert_eq!(merged, vec!["a@x.com", "b@x.com"]);
    }

    #[tokio::test]
    async fn test_subscription_backlog_and_live_split() {
        let store = MemoryStore::new();
        store.put_pact_if_absent(new_pact("pact-a", &[])).await.unwrap();
        for name in ["One", "Two", "Three", "Four"] {
            store.append_signature("pact-a", sig(name, None)).await.unwrap();
        }

        let mut sub = store.subscribe_events("pact-a", 3).await.unwrap();
        assert_eq!(sub.backlog.len(), 3);
        assert!(sub
            .backlog
            .windows(2)
            .all(|w| w[0].created_at <= w[1].created_at));
        // Nothing committed since attach, so the live side is empty.
        assert!(sub.live.try_recv().is_err());

        store.append_signature("pact-a", sig("Five", None)).await.unwrap();
        let live = sub.live.try_recv().unwrap();
        assert!(matches!(live.kind, EventKind::Agree { ref name } if name == "Five"));
        assert!(sub.live.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_offline_store_fails_closed() {
        let store = MemoryStore::new();
        store.put_pact_if_absent(new_pact("pact-a", &[])).await.unwrap();
        store.set_offline(true);
        let err = store.append_signature("pact-a", sig("Jane", None)).await;
        assert!(matches!(err, Err(StoreError::Unavailable(_))));
        store.set_offline(false);
        assert!(store.get_pact("pact-a").await.unwrap().is_some());
    }
}
