//! Notification seam.
//!
//! The engine calls out through [`Notifier`] for the three mail kinds
//! the flow produces. The notifier is not assumed idempotent: the
//! engine's conditional writes are what prevent duplicate sends.

use crate::constants::INVITE_DESCRIPTION_MAX;
use crate::models::Pact;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// "You're invited" mail to newly invited addresses.
    Invite,
    /// One-time "everyone is in" mail to all invited addresses.
    Completion,
    /// Courtesy copy to a signer who left an email.
    Copy,
}

/// What a notifier needs to render any of the mails.
#[derive(Debug, Clone)]
pub struct PactSummary {
    pub title: String,
    pub slug: String,
    /// One-line teaser derived from the pact body; invite mails only.
    pub description: Option<String>,
    pub inviter_name: Option<String>,
}

impl PactSummary {
    pub fn from_pact(pact: &Pact) -> Self {
        Self {
            title: pact.title.clone(),
            slug: pact.slug.clone(),
            description: invite_description(&pact.body),
            inviter_name: None,
        }
    }
}

/// Collapse whitespace in the pact body and truncate it to a single
/// invite-mail line.
fn invite_description(body: &str) -> Option<String> {
    let cleaned = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.chars().count() <= INVITE_DESCRIPTION_MAX {
        return Some(cleaned);
    }
    let cut: String = cleaned.chars().take(INVITE_DESCRIPTION_MAX - 3).collect();
    Some(format!("{cut}..."))
}

#[derive(Debug, thiserror::Error)]
#[error("notification dispatch failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        kind: NotificationKind,
        recipients: &[String],
        pact: &PactSummary,
    ) -> Result<(), NotifyError>;
}
