pub mod event;
pub mod pact;
pub mod signature;

pub use event::{EventKind, PactEvent};
pub use pact::{CompletionStatus, Pact, PactDraft};
pub use signature::{normalize_signature_text, NewSignature, Signature};
