use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use guestlist_core::{SessionStore, StoreError, StoredSession};

/// Implements [SessionStore] by keeping the session as a JSON file on disk
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<StoredSession>, StoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Inaccessible(e.to_string())),
        };

        let session =
            serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        Ok(Some(session))
    }

    async fn save(&self, session: StoredSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Inaccessible(e.to_string()))?;
        }

        let contents = serde_json::to_string(&session)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        fs::write(&self.path, contents)
            .await
            .map_err(|e| StoreError::Inaccessible(e.to_string()))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Inaccessible(e.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock is sane")
            .subsec_nanos();

        std::env::temp_dir().join(format!("guestlist-test-{name}-{nanos}/session.json"))
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = FileSessionStore::new(scratch_path("round-trip"));

        assert_eq!(store.load().await.expect("load succeeds"), None);

        let session = StoredSession {
            token: "tok".to_string(),
            fresh_login: true,
        };

        store.save(session.clone()).await.expect("save succeeds");
        assert_eq!(store.load().await.expect("load succeeds"), Some(session));

        store.clear().await.expect("clear succeeds");
        assert_eq!(store.load().await.expect("load succeeds"), None);
    }

    #[tokio::test]
    async fn test_clearing_an_absent_session_is_fine() {
        let store = FileSessionStore::new(scratch_path("clear-absent"));
        store.clear().await.expect("clear succeeds");
    }

    #[tokio::test]
    async fn test_garbage_on_disk_is_reported_as_corrupt() {
        let path = scratch_path("garbage");
        let store = FileSessionStore::new(path.clone());

        fs::create_dir_all(path.parent().expect("path has a parent"))
            .await
            .expect("dir creation succeeds");
        fs::write(&path, "not json").await.expect("write succeeds");

        assert!(matches!(
            store.load().await,
            Err(StoreError::Corrupt(_))
        ));
    }
}
