//! Signature intake: validation, dedup, invite authorization.
//!
//! Rules are checked in a fixed order and the first failure wins, so a
//! submission with several problems always reports the same one.
//! Validation reads current state, but the write itself re-checks the
//! dedup precondition inside the store; two clients submitting the
//! same name or email at once cannot both land. Rejections are
//! terminal outcomes, never retried by the engine.

use crate::completion::{CompletionError, CompletionGate};
use crate::email::normalize_email;
use crate::models::{
    normalize_signature_text, CompletionStatus, NewSignature, Pact, Signature,
};
use crate::notify::{NotificationKind, Notifier, PactSummary};
use crate::signed_cache::{SignedCache, SignedMarker};
use crate::store::{AppendOutcome, Store, StoreError};
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("please add your signature")]
    EmptySignature,

    #[error("that email doesn't look right")]
    InvalidEmail,

    #[error("looks like you're already in")]
    AlreadySigned,

    #[error("please use the email you were invited with")]
    EmailRequired,

    #[error("this pact is invite-only; use the email you were invited with")]
    NotInvited,

    #[error("pact not found: {0}")]
    PactNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the caller gets back for an accepted signature.
#[derive(Debug)]
pub struct SignatureReceipt {
    pub signature: Signature,
    /// Completion status observed after this acceptance.
    pub completion: CompletionStatus,
    /// Whether the courtesy copy went out.
    pub copy_sent: bool,
}

pub struct SignatureLedger {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<SignedCache>,
    gate: CompletionGate,
}

impl SignatureLedger {
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        cache: Arc<SignedCache>,
    ) -> Self {
        let gate = CompletionGate::new(store.clone(), notifier.clone());
        Self {
            store,
            notifier,
            cache,
            gate,
        }
    }

    /// Record one participant's signature on the pact.
    pub async fn submit(
        &self,
        slug: &str,
        text: &str,
        email: Option<&str>,
    ) -> Result<SignatureReceipt, SubmitError> {
        let pact = self
            .store
            .get_pact(slug)
            .await?
            .ok_or_else(|| SubmitError::PactNotFound(slug.to_string()))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitError::EmptySignature);
        }

        // Advisory short-circuit for this session only; other clients
        // are caught by the store's dedup precondition below.
        if self.cache.contains(slug) {
            return Err(SubmitError::AlreadySigned);
        }

        let provided = email.map(str::trim).filter(|value| !value.is_empty());
        let normalized_email = match provided {
            Some(value) => Some(normalize_email(value).ok_or(SubmitError::InvalidEmail)?),
            None => None,
        };

        let existing = self.store.list_signatures(slug).await?;
        let normalized_text = normalize_signature_text(text);
        if existing
            .iter()
            .any(|signature| signature.normalized_text() == normalized_text)
        {
            return Err(SubmitError::AlreadySigned);
        }
        if let Some(candidate) = &normalized_email {
            if existing
                .iter()
                .any(|signature| signature.email.as_deref() == Some(candidate.as_str()))
            {
                return Err(SubmitError::AlreadySigned);
            }
        }

        if pact.is_invite_only() {
            match &normalized_email {
                None => return Err(SubmitError::EmailRequired),
                Some(candidate) if !pact.invited_emails.contains(candidate) => {
                    return Err(SubmitError::NotInvited);
                }
                Some(_) => {}
            }
        }

        let outcome = self
            .store
            .append_signature(
                slug,
                NewSignature {
                    text: text.to_string(),
                    email: normalized_email.clone(),
                },
            )
            .await?;
        let signature = match outcome {
            AppendOutcome::Appended(signature) => signature,
            // A concurrent writer beat us between validation and write.
            AppendOutcome::Duplicate => return Err(SubmitError::AlreadySigned),
        };

        self.cache.record(
            slug,
            SignedMarker {
                text: signature.text.clone(),
                email: signature.email.clone(),
            },
        );

        let copy_sent = self.send_copy(&pact, normalized_email.as_deref()).await;
        let completion = self.evaluate_completion(&pact).await;

        Ok(SignatureReceipt {
            signature,
            completion,
            copy_sent,
        })
    }

    /// Courtesy copy to the signer. Failure never rolls back the
    /// accepted signature.
    async fn send_copy(&self, pact: &Pact, email: Option<&str>) -> bool {
        let Some(email) = email else {
            return false;
        };
        let summary = PactSummary::from_pact(pact);
        match self
            .notifier
            .send(NotificationKind::Copy, &[email.to_string()], &summary)
            .await
        {
            Ok(()) => true,
            Err(source) => {
                warn!(slug = %pact.slug, %source, "copy mail failed; signature stands");
                false
            }
        }
    }

    /// Gate re-evaluation after acceptance. The signature is already
    /// committed, so gate failures are reported out-of-band rather
    /// than failing the submission.
    async fn evaluate_completion(&self, pact: &Pact) -> CompletionStatus {
        if !pact.is_invite_only() {
            return CompletionStatus::Open;
        }
        match self.gate.evaluate(&pact.slug).await {
            Ok(status) => status,
            Err(CompletionError::NotifyFailed { .. }) => {
                // Already logged distinctly by the gate; the flag is
                // flipped, so the pact is complete.
                CompletionStatus::Complete
            }
            Err(CompletionError::Store(source)) => {
                error!(slug = %pact.slug, %source, "completion check failed after acceptance");
                CompletionStatus::Open
            }
        }
    }
}
