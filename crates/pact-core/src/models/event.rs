use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened, with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EventKind {
    /// An invitation went out to this address.
    Invite { email: String },
    /// Someone signed under this name.
    Agree { name: String },
}

/// Append-only activity record for the owner-facing live feed.
/// Never authoritative for pact state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PactEvent {
    pub id: String,
    #[serde(flatten)]
    pub kind: EventKind,
    pub created_at: DateTime<Utc>,
}
