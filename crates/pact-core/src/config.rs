use crate::constants::{
    FEED_BACKLOG, OWNER_KEY_LEN, SLUG_ALLOCATION_ATTEMPTS, SLUG_TOKEN_LEN,
};

/// Tunables for the engine. The defaults match the deployed values;
/// tests shrink them where a smaller bound makes a property observable.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Put-if-absent attempts before allocation reports exhaustion.
    pub allocation_attempts: usize,
    /// Random characters in a slug after the namespace prefix.
    pub slug_token_len: usize,
    /// Length of the generated owner capability.
    pub owner_key_len: usize,
    /// Recent events replayed to a feed subscriber on attach.
    pub feed_backlog: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allocation_attempts: SLUG_ALLOCATION_ATTEMPTS,
            slug_token_len: SLUG_TOKEN_LEN,
            owner_key_len: OWNER_KEY_LEN,
            feed_backlog: FEED_BACKLOG,
        }
    }
}
