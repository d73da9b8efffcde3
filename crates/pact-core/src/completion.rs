//! "Everyone is in" detection and exactly-once completion signaling.
//!
//! Re-evaluated after every accepted signature on an invite-only pact.
//! Two final signatures can arrive nearly simultaneously, and both
//! observers may read the notified flag as false; the compare-and-set
//! on the store is what guarantees only one of them dispatches the
//! completion mail. The loser treats the gate as already satisfied and
//! stays silent.

use crate::models::{CompletionStatus, Pact};
use crate::notify::{NotificationKind, Notifier, NotifyError, PactSummary};
use crate::store::{CasOutcome, Store, StoreError};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The completion flag is set but the mail did not go out. The
    /// one-time promise to users is broken until this is retried, so
    /// it is surfaced distinctly rather than folded into acceptance.
    #[error("completion notification failed for {slug}: {source}")]
    NotifyFailed {
        slug: String,
        source: NotifyError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct CompletionGate {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
}

impl CompletionGate {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Current completion status, flipping the flag and dispatching the
    /// one-time notification when coverage is first reached.
    pub async fn evaluate(&self, slug: &str) -> Result<CompletionStatus, CompletionError> {
        let pact = self
            .store
            .get_pact(slug)
            .await?
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;
        self.evaluate_pact(&pact).await
    }

    async fn evaluate_pact(&self, pact: &Pact) -> Result<CompletionStatus, CompletionError> {
        // Open pacts accumulate signatures indefinitely and never
        // complete.
        if !pact.is_invite_only() {
            return Ok(CompletionStatus::Open);
        }
        if pact.all_signed_notified {
            return Ok(CompletionStatus::Complete);
        }

        let signatures = self.store.list_signatures(&pact.slug).await?;
        let signed: HashSet<&str> = signatures
            .iter()
            .filter_map(|signature| signature.email.as_deref())
            .collect();
        let covered = pact
            .invited_emails
            .iter()
            .all(|invited| signed.contains(invited.as_str()));
        if !covered {
            return Ok(CompletionStatus::Open);
        }

        match self.store.complete_if_unnotified(&pact.slug).await? {
            CasOutcome::AlreadyDone => {
                debug!(slug = %pact.slug, "completion already signaled by another writer");
                Ok(CompletionStatus::Complete)
            }
            CasOutcome::Won => {
                let summary = PactSummary::from_pact(pact);
                match self
                    .notifier
                    .send(NotificationKind::Completion, &pact.invited_emails, &summary)
                    .await
                {
                    Ok(()) => Ok(CompletionStatus::Complete),
                    Err(source) => {
                        error!(slug = %pact.slug, %source, "completion mail dropped after flag flip");
                        Err(CompletionError::NotifyFailed {
                            slug: pact.slug.clone(),
                            source,
                        })
                    }
                }
            }
        }
    }
}
