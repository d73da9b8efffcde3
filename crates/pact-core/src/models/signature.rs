use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical form of a signature's display text, used for dedup.
/// Two signatures with case/whitespace-equal text are the same signer.
pub fn normalize_signature_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// One participant's recorded signature on a pact.
///
/// Within a pact no two signatures share a normalized `text`, and no
/// two share the same non-empty normalized `email`. `created_at` is
/// assigned by the store and orders the signer list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub id: String,
    /// The name as entered (trimmed), shown in the signer list.
    pub text: String,
    /// Normalized address, or `None` when the signer gave no email.
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Signature {
    pub fn normalized_text(&self) -> String {
        normalize_signature_text(&self.text)
    }
}

/// A validated signature waiting for the store to record it.
/// `text` is already trimmed and `email` already normalized.
#[derive(Debug, Clone)]
pub struct NewSignature {
    pub text: String,
    pub email: Option<String>,
}
