use parking_lot::RwLock;
use std::sync::Arc;

/// Shared holder for the bearer token.
///
/// Cloning shares the same slot, so the client and the login handler that
/// refreshes it see one token.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Stores a token; blank tokens clear the slot instead.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut slot = self.token.write();
        *slot = if token.trim().is_empty() { None } else { Some(token) };
    }

    pub fn is_present(&self) -> bool {
        self.token.read().is_some()
    }
}
