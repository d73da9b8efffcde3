//! Pact consistency engine.
//!
//! A pact is a shared agreement: one person creates it, invites others
//! (optionally restricting signing to named addresses), and each
//! participant records a signature from an unrelated client session.
//! This crate is the consistency core behind that flow: unique slug
//! allocation, signature dedup and invite authorization, exactly-once
//! "everyone is in" signaling, and the owner's live activity feed.
//!
//! There is no resident server process; the engine runs once per call
//! in each client, so every state change goes through a precondition-
//! guarded write on the [`store::Store`] seam (put-if-absent, dedup-
//! checked append, compare-and-set). Presentation, transport, and the
//! concrete database live behind the [`store::Store`] and
//! [`notify::Notifier`] traits.

pub mod completion;
pub mod config;
pub mod constants;
pub mod email;
pub mod engine;
pub mod feed;
pub mod invites;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod signed_cache;
pub mod slug;
pub mod store;

pub use completion::{CompletionError, CompletionGate};
pub use config::EngineConfig;
pub use email::{normalize_email, parse_invite_list};
pub use engine::PactEngine;
pub use feed::{ActivityFeed, FeedError};
pub use invites::{InviteError, Inviter};
pub use ledger::{SignatureLedger, SignatureReceipt, SubmitError};
pub use models::{CompletionStatus, EventKind, Pact, PactDraft, PactEvent, Signature};
pub use notify::{NotificationKind, Notifier, NotifyError, PactSummary};
pub use slug::{AllocationError, SlugAllocator};
pub use store::{MemoryStore, Store, StoreError};
