use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use guestlist_core::ApiClient;

use crate::{util::decode, ClientError, ClientResult, NotificationPreferences};

/// A local backup of the notification preferences. Never the source of
/// truth; only consulted when the server cannot be reached.
#[async_trait]
pub trait PrefsCache: Send + Sync {
    async fn load(&self) -> Option<NotificationPreferences>;
    async fn save(&self, prefs: &NotificationPreferences);
}

pub struct Preferences<A, C> {
    api: Arc<A>,
    cache: Arc<C>,
}

impl<A, C> Preferences<A, C>
where
    A: ApiClient,
    C: PrefsCache,
{
    pub fn new(api: &Arc<A>, cache: &Arc<C>) -> Self {
        Self {
            api: api.clone(),
            cache: cache.clone(),
        }
    }

    /// The current preferences. A fetch failure falls back to the cached
    /// copy, and to the defaults when no cache exists; either way the
    /// screen always has a fully initialized set of toggles.
    pub async fn fetch(&self) -> NotificationPreferences {
        let fetched = match self.api.get("/user/notification-preferences").await {
            Ok(value) => decode::<NotificationPreferences>(value).ok(),
            Err(e) => {
                warn!("Could not fetch notification preferences: {e}");
                None
            }
        };

        match fetched {
            Some(prefs) => {
                self.cache.save(&prefs).await;
                prefs
            }
            None => self.cache.load().await.unwrap_or_default(),
        }
    }

    pub async fn save(&self, prefs: &NotificationPreferences) -> ClientResult<()> {
        let body = serde_json::to_value(prefs)
            .map_err(|e| ClientError::Api(guestlist_core::ApiError::Parse(e.to_string())))?;

        self.api.put("/user/notification-preferences", body).await?;
        self.cache.save(prefs).await;

        Ok(())
    }

    /// Flips a single toggle and persists the whole set
    pub async fn toggle_push(&self, enabled: bool) -> ClientResult<NotificationPreferences> {
        let mut prefs = self.fetch().await;
        prefs.push_enabled = enabled;
        self.save(&prefs).await?;

        Ok(prefs)
    }
}
