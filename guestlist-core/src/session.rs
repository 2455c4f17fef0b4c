use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the client persists between launches. The token is opaque; the
/// `fresh_login` marker suppresses the biometric gate on the launch
/// immediately following a login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    #[serde(default)]
    pub fresh_login: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not access session storage: {0}")]
    Inaccessible(String),
    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),
}

/// Represents the device's key-value storage for the persisted session.
/// There is a single writer path (login/logout), so no locking is required
/// beyond what an implementation needs internally.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<StoredSession>, StoreError>;
    async fn save(&self, session: StoredSession) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}
