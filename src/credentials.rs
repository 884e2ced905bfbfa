//! Credential resolution.
//!
//! The messaging API authenticates each send with a username/secret pair.
//! Resolution happens through the host's credential store; the core only
//! sees the trait boundary.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Resolved API credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Sender identity (`from` form field).
    pub username: String,
    /// API secret (`secret` form field). Never logged.
    pub secret: String,
}

/// Lookup of credentials by id, implemented by the embedding host.
pub trait CredentialStore: Send + Sync {
    fn find(&self, credentials_id: &str) -> Option<Credentials>;
}

/// In-memory credential store for embedding hosts without their own backend
/// and for tests.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    entries: RwLock<HashMap<String, Credentials>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, credentials_id: impl Into<String>, credentials: Credentials) {
        self.entries.write().insert(credentials_id.into(), credentials);
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find(&self, credentials_id: &str) -> Option<Credentials> {
        self.entries.read().get(credentials_id).cloned()
    }
}
