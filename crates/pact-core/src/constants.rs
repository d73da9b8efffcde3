//! Engine-wide constants
//!
//! Centralized location for magic values that are used across
//! multiple modules.

/// Alphabet for random public identifiers and owner keys.
/// Lowercase plus digits, with `l` removed so a slug read aloud or
/// retyped from a screenshot is unambiguous.
pub const RANDOM_ALPHABET: &[u8] = b"abcdefghijkmnopqrstuvwxyz0123456789";

/// Namespace prefix for every pact slug.
pub const SLUG_PREFIX: &str = "pact-";

/// Random characters appended after [`SLUG_PREFIX`].
pub const SLUG_TOKEN_LEN: usize = 8;

/// How many fresh candidates allocation tries before giving up.
/// Collisions are vanishingly rare at 8 chars over a 35-char alphabet,
/// so a small bound keeps the loop from spinning on a pathological store.
pub const SLUG_ALLOCATION_ATTEMPTS: usize = 5;

/// Length of the owner capability handed to the creator's session.
pub const OWNER_KEY_LEN: usize = 24;

/// Most recent committed events handed to a feed subscriber on attach.
pub const FEED_BACKLOG: usize = 3;

/// Invite emails carry a one-line description derived from the pact
/// body, truncated to this many characters.
pub const INVITE_DESCRIPTION_MAX: usize = 160;
