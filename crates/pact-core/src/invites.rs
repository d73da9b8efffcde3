//! Bulk invite flow.
//!
//! The address list is normalized and deduplicated before the engine
//! touches any state. The invite mail goes out first and the invite
//! set is merged only after a successful dispatch, so a mail failure
//! never leaves an address locked into an invite-only pact that was
//! never actually told about it. The merge is a monotonic union; the
//! invite set never shrinks.

use crate::email::{parse_invite_list, InvalidInviteEntry};
use crate::notify::{NotificationKind, Notifier, NotifyError, PactSummary};
use crate::store::{Store, StoreError};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    #[error(transparent)]
    InvalidEntry(#[from] InvalidInviteEntry),

    #[error("add at least one email to invite")]
    NoRecipients,

    #[error("pact not found: {0}")]
    PactNotFound(String),

    #[error("unable to send invites: {0}")]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Inviter {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
}

impl Inviter {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Invite a pasted list of addresses to the pact. Returns the full
    /// invite set after the merge.
    pub async fn send_invites(
        &self,
        slug: &str,
        raw_emails: &str,
        inviter_name: Option<&str>,
    ) -> Result<Vec<String>, InviteError> {
        let pact = self
            .store
            .get_pact(slug)
            .await?
            .ok_or_else(|| InviteError::PactNotFound(slug.to_string()))?;

        let emails = parse_invite_list(raw_emails)?;
        if emails.is_empty() {
            return Err(InviteError::NoRecipients);
        }

        let mut summary = PactSummary::from_pact(&pact);
        summary.inviter_name = inviter_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        // Dispatch before merging: a failed send must leave the
        // invite set untouched.
        self.notifier
            .send(NotificationKind::Invite, &emails, &summary)
            .await?;

        let merged = self.store.merge_invites(slug, &emails).await?;
        info!(slug, invited = emails.len(), total = merged.len(), "invites sent");
        Ok(merged)
    }
}
