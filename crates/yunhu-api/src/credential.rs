//! Bot token storage.
//!
//! The platform authenticates every outbound call with one bearer token.
//! [`TokenStore`] holds it for the lifetime of the bot: set once, read
//! many. The store is an owned value injected into the [`ApiClient`] at
//! construction, so initialization order is an explicit part of wiring a
//! bot rather than hidden process-global state.
//!
//! [`ApiClient`]: crate::ApiClient

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Notify;

use crate::error::{CredentialError, CredentialResult};

/// Single-assignment store for the bot token.
///
/// `init` succeeds exactly once; later calls observe
/// [`CredentialError::AlreadyInitialized`] no matter how they race. Reads
/// either fail fast ([`get`](Self::get)) or suspend until a token arrives
/// ([`wait`](Self::wait)).
#[derive(Debug, Default)]
pub struct TokenStore {
    slot: RwLock<Option<Arc<str>>>,
    ready: Notify,
}

impl TokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the token. The value is trimmed before storage.
    ///
    /// # Errors
    ///
    /// [`CredentialError::AlreadyInitialized`] if a token is already set,
    /// no matter what was passed; otherwise [`CredentialError::InvalidToken`]
    /// if the token is empty after trimming. Concurrent callers are
    /// serialized: exactly one wins.
    pub fn init(&self, token: &str) -> CredentialResult<()> {
        {
            let mut slot = self.slot.write();
            if slot.is_some() {
                return Err(CredentialError::AlreadyInitialized);
            }
            let token = token.trim();
            if token.is_empty() {
                return Err(CredentialError::InvalidToken);
            }
            *slot = Some(Arc::from(token));
        }
        self.ready.notify_waiters();
        Ok(())
    }

    /// Returns the token, failing fast when none is set.
    pub fn get(&self) -> CredentialResult<Arc<str>> {
        self.slot
            .read()
            .clone()
            .ok_or(CredentialError::NotInitialized)
    }

    /// Returns the token if one is set.
    pub fn try_get(&self) -> Option<Arc<str>> {
        self.slot.read().clone()
    }

    /// Returns `true` once a token is set.
    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Returns the token, suspending until a concurrent [`init`](Self::init)
    /// provides one.
    pub async fn wait(&self) -> Arc<str> {
        loop {
            // Register interest before checking the slot so an init landing
            // in between cannot be missed.
            let ready = self.ready.notified();
            if let Some(token) = self.try_get() {
                return token;
            }
            ready.await;
        }
    }

    /// Clears the token. Test and teardown use only; live clients hold the
    /// store and would start failing their credential gate.
    pub fn reset(&self) {
        *self.slot.write() = None;
    }
}
