use std::path::PathBuf;

use async_trait::async_trait;
use log::warn;
use tokio::fs;

use guestlist_client::{NotificationPreferences, PrefsCache};

/// Implements [PrefsCache] as a JSON file next to the session file. Cache
/// writes are best-effort; a failure is logged and the server copy stays
/// authoritative.
pub struct FilePrefsCache {
    path: PathBuf,
}

impl FilePrefsCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PrefsCache for FilePrefsCache {
    async fn load(&self) -> Option<NotificationPreferences> {
        let contents = fs::read_to_string(&self.path).await.ok()?;
        serde_json::from_str(&contents).ok()
    }

    async fn save(&self, prefs: &NotificationPreferences) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                warn!("Could not create preference cache directory: {e}");
                return;
            }
        }

        let contents =
            serde_json::to_string(prefs).expect("preferences serialize to json");

        if let Err(e) = fs::write(&self.path, contents).await {
            warn!("Could not write preference cache: {e}");
        }
    }
}
