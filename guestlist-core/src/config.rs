use std::{env, time::Duration};

/// The environment variable that overrides the backend host.
pub const BASE_URL_ENV: &str = "GUESTLIST_API_URL";

/// The host used when neither the environment nor the config provides one.
pub const DEFAULT_BASE_URL: &str = "https://api.guestlist.club";

/// The fixed ceiling applied uniformly to every request.
/// A timeout fails exactly like any other network error.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The configuration of the API gateway
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    /// The backend host, without the `/api` suffix
    pub base_url: Option<String>,
}

impl ApiConfig {
    /// Resolves the backend host, checking the environment first,
    /// then the config itself, then the hardcoded fallback.
    pub fn resolve_base_url(&self) -> String {
        env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }
}

/// Serializes tests that touch [BASE_URL_ENV], since env mutation is process-wide.
#[cfg(test)]
pub(crate) static ENV_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());
