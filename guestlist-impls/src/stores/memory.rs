use async_trait::async_trait;
use parking_lot::Mutex;

use guestlist_client::{NotificationPreferences, PrefsCache};
use guestlist_core::{SessionStore, StoreError, StoredSession};

/// Implements [SessionStore] in memory, for tests and ephemeral sessions
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<StoredSession>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<StoredSession>, StoreError> {
        Ok(self.session.lock().clone())
    }

    async fn save(&self, session: StoredSession) -> Result<(), StoreError> {
        *self.session.lock() = Some(session);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.session.lock() = None;
        Ok(())
    }
}

/// Implements [PrefsCache] in memory
#[derive(Default)]
pub struct MemoryPrefsCache {
    prefs: Mutex<Option<NotificationPreferences>>,
}

#[async_trait]
impl PrefsCache for MemoryPrefsCache {
    async fn load(&self) -> Option<NotificationPreferences> {
        self.prefs.lock().clone()
    }

    async fn save(&self, prefs: &NotificationPreferences) {
        *self.prefs.lock() = Some(prefs.clone());
    }
}
