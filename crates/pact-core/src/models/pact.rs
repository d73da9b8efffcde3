use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion state of a pact.
///
/// Every pact starts `Open`. Only an invite-only pact can move to
/// `Complete`, the transition happens at most once (guarded by a
/// conditional store write), and `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Open,
    Complete,
}

/// Creator-supplied fields for a new pact.
#[derive(Debug, Clone, Default)]
pub struct PactDraft {
    pub title: String,
    pub body: String,
    /// Zero means the pact never expires.
    pub duration_days: u32,
}

/// The shared agreement record participants sign.
///
/// `slug` is chosen exactly once at creation and is immutable, as are
/// `title` and `body`. `invited_emails` holds normalized addresses and
/// only ever grows. `all_signed_notified` flips false -> true at most
/// once and never reverts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pact {
    pub slug: String,
    pub title: String,
    pub body: String,
    /// Opaque capability known only to the creator; grants access to
    /// the private status feed. Never derivable from shared pact data.
    pub owner_key: String,
    pub invited_emails: Vec<String>,
    pub all_signed_notified: bool,
    pub duration_days: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Pact {
    /// A pact with invited emails restricts who may sign; one without
    /// is open and has no completion state.
    pub fn is_invite_only(&self) -> bool {
        !self.invited_emails.is_empty()
    }

    pub fn completion(&self) -> CompletionStatus {
        if self.all_signed_notified {
            CompletionStatus::Complete
        } else {
            CompletionStatus::Open
        }
    }
}
