use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use guestlist_core::{ApiClient, ApiError, SessionStore, StoreError, StoredSession};

use crate::{util::decode, ClientError, UserData};

/// Represents the platform's biometric re-entry prompt
#[async_trait]
pub trait BiometricGate: Send + Sync {
    /// Whether the device has biometric hardware with an enrolled credential
    fn available(&self) -> bool;

    /// Shows the prompt. Returns false only on explicit user cancellation.
    async fn prompt(&self) -> bool;
}

/// The session, as a tagged state. `Locked` means a valid token exists but
/// the user has not yet passed the biometric gate.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    Locked {
        user: UserData,
    },
    LoggedIn {
        user: UserData,
    },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ApiError> for AuthError {
    fn from(value: ApiError) -> Self {
        Self::Client(value.into())
    }
}

/// Owns the current identity and token lifecycle. Screens receive this by
/// reference; there is no ambient global session.
pub struct AuthSession<A, S, G> {
    api: Arc<A>,
    store: Arc<S>,
    gate: G,
    state: Mutex<SessionState>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(flatten)]
    user: UserData,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub accept_marketing: bool,
}

impl<A, S, G> AuthSession<A, S, G>
where
    A: ApiClient,
    S: SessionStore,
    G: BiometricGate,
{
    pub fn new(api: &Arc<A>, store: &Arc<S>, gate: G) -> Self {
        Self {
            api: api.clone(),
            store: store.clone(),
            gate,
            state: Default::default(),
        }
    }

    /// Submits credentials. On success the token is persisted with the
    /// fresh-login marker set, so the next launch skips the biometric gate.
    /// An invalid-credentials rejection carries the server's message.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserData, AuthError> {
        let value = self
            .api
            .post("/auth/login", json!({ "email": email, "password": password }))
            .await?;

        let response: LoginResponse = decode(value)?;
        self.establish(response.access_token, response.user.clone())
            .await?;

        info!("User {} logged in", response.user.email);
        Ok(response.user)
    }

    /// Creates an account and starts a session for it
    pub async fn register(&self, new_account: NewAccount) -> Result<UserData, AuthError> {
        let value = self
            .api
            .post(
                "/auth/register",
                json!({
                    "name": new_account.name,
                    "email": new_account.email,
                    "password": new_account.password,
                    "phone": new_account.phone.unwrap_or_default(),
                    "accept_marketing": new_account.accept_marketing,
                    "role": "user",
                }),
            )
            .await?;

        let response: RegisterResponse = decode(value)?;
        self.api.set_token(Some(response.access_token.clone()));

        // The register response only carries the token
        let user: UserData = decode(self.api.get("/auth/me").await?)?;
        self.establish(response.access_token, user.clone()).await?;

        info!("User {} registered", user.email);
        Ok(user)
    }

    /// Restores the session at process start. A missing token stays logged
    /// out; a token the server no longer accepts silently demotes the
    /// session instead of surfacing an error. When biometric hardware is
    /// present and this is not the launch right after a login, the session
    /// comes back locked.
    pub async fn load_user(&self) -> Result<SessionState, AuthError> {
        let Some(stored) = self.store.load().await? else {
            *self.state.lock() = SessionState::LoggedOut;
            return Ok(SessionState::LoggedOut);
        };

        self.api.set_token(Some(stored.token.clone()));

        let user = match self.api.get("/auth/me").await {
            Ok(value) => decode::<UserData>(value)?,
            Err(ApiError::Status { .. }) => {
                warn!("Stored token was rejected, demoting session");
                self.forget().await?;
                return Ok(SessionState::LoggedOut);
            }
            // Transport failures leave the stored session alone so the
            // user can retry once connectivity returns
            Err(e) => return Err(e.into()),
        };

        // The marker is one launch only
        if stored.fresh_login {
            self.store
                .save(StoredSession {
                    fresh_login: false,
                    ..stored.clone()
                })
                .await?;
        }

        let next = if self.gate.available() && !stored.fresh_login {
            SessionState::Locked { user }
        } else {
            SessionState::LoggedIn { user }
        };

        *self.state.lock() = next.clone();
        Ok(next)
    }

    /// Shows the biometric prompt. Absence of hardware unlocks immediately;
    /// explicit cancellation keeps the session locked and returns false.
    pub async fn unlock_with_biometrics(&self) -> bool {
        if !self.gate.available() || self.gate.prompt().await {
            self.unlock();
            return true;
        }

        false
    }

    /// Ends the session, clearing the stored token and all in-memory identity
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.forget().await?;
        info!("Logged out");
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// The identity attached to the session, if any
    pub fn current_user(&self) -> Option<UserData> {
        match &*self.state.lock() {
            SessionState::LoggedIn { user } | SessionState::Locked { user } => Some(user.clone()),
            SessionState::LoggedOut => None,
        }
    }

    async fn establish(&self, token: String, user: UserData) -> Result<(), AuthError> {
        self.api.set_token(Some(token.clone()));
        self.store
            .save(StoredSession {
                token,
                fresh_login: true,
            })
            .await?;

        *self.state.lock() = SessionState::LoggedIn { user };
        Ok(())
    }

    async fn forget(&self) -> Result<(), AuthError> {
        self.store.clear().await?;
        self.api.set_token(None);
        *self.state.lock() = SessionState::LoggedOut;
        Ok(())
    }

    fn unlock(&self) {
        let mut state = self.state.lock();

        if let SessionState::Locked { user } = &*state {
            *state = SessionState::LoggedIn { user: user.clone() };
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{FixedGate, MemoryStore, RecordingApi};
    use crate::Role;
    use serde_json::json;

    fn me_response() -> serde_json::Value {
        json!({
            "id": "u1",
            "email": "ana@example.com",
            "name": "Ana",
            "role": "user",
            "loyalty_points": 20
        })
    }

    fn session(
        api: &Arc<RecordingApi>,
        store: &Arc<MemoryStore>,
        gate: FixedGate,
    ) -> AuthSession<RecordingApi, MemoryStore, FixedGate> {
        AuthSession::new(api, store, gate)
    }

    #[tokio::test]
    async fn test_login_stores_token_and_logs_in() {
        let api = RecordingApi::new();
        let store = MemoryStore::new();

        api.respond_with(Ok(json!({
            "access_token": "tok-1",
            "id": "u1",
            "email": "ana@example.com",
            "name": "Ana",
            "role": "user",
            "loyalty_points": 20
        })));

        let auth = session(&api, &store, FixedGate { available: true, accept: false });
        let user = auth.login("ana@example.com", "hunter2").await.expect("login succeeds");

        assert_eq!(user.role, Role::User);
        assert_eq!(api.token(), Some("tok-1".to_string()));

        let stored = store.stored().expect("session is persisted");
        assert_eq!(stored.token, "tok-1");
        assert!(stored.fresh_login);

        assert!(matches!(auth.state(), SessionState::LoggedIn { .. }));
    }

    #[tokio::test]
    async fn test_login_surfaces_server_detail() {
        let api = RecordingApi::new();
        let store = MemoryStore::new();

        api.respond_with(Err(ApiError::Status {
            status: 401,
            detail: Some("Email ou mot de passe incorrect".to_string()),
        }));

        let auth = session(&api, &store, FixedGate { available: false, accept: false });
        let error = auth.login("ana@example.com", "wrong").await.expect_err("login fails");

        match error {
            AuthError::Client(ClientError::Rejected(detail)) => {
                assert_eq!(detail, "Email ou mot de passe incorrect")
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(auth.state(), SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn test_load_user_without_token_stays_logged_out() {
        let api = RecordingApi::new();
        let store = MemoryStore::new();

        let auth = session(&api, &store, FixedGate { available: true, accept: true });
        let state = auth.load_user().await.expect("load completes");

        assert_eq!(state, SessionState::LoggedOut);
        // No "who am I" request was made
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_user_locks_behind_available_gate() {
        let api = RecordingApi::new();
        let store = MemoryStore::new();

        store
            .save(StoredSession { token: "tok-1".to_string(), fresh_login: false })
            .await
            .expect("seed session");
        api.respond_with(Ok(me_response()));

        let auth = session(&api, &store, FixedGate { available: true, accept: true });
        let state = auth.load_user().await.expect("load completes");

        assert!(matches!(state, SessionState::Locked { .. }));
        assert!(auth.current_user().is_some());

        assert!(auth.unlock_with_biometrics().await);
        assert!(matches!(auth.state(), SessionState::LoggedIn { .. }));
    }

    #[tokio::test]
    async fn test_fresh_login_skips_gate_once() {
        let api = RecordingApi::new();
        let store = MemoryStore::new();

        store
            .save(StoredSession { token: "tok-1".to_string(), fresh_login: true })
            .await
            .expect("seed session");
        api.respond_with(Ok(me_response()));

        let auth = session(&api, &store, FixedGate { available: true, accept: false });
        let state = auth.load_user().await.expect("load completes");

        assert!(matches!(state, SessionState::LoggedIn { .. }));

        // The marker is consumed, so the next launch locks
        let stored = store.stored().expect("session remains");
        assert!(!stored.fresh_login);
    }

    #[tokio::test]
    async fn test_declined_prompt_stays_locked() {
        let api = RecordingApi::new();
        let store = MemoryStore::new();

        store
            .save(StoredSession { token: "tok-1".to_string(), fresh_login: false })
            .await
            .expect("seed session");
        api.respond_with(Ok(me_response()));

        let auth = session(&api, &store, FixedGate { available: true, accept: false });
        auth.load_user().await.expect("load completes");

        assert!(!auth.unlock_with_biometrics().await);
        assert!(matches!(auth.state(), SessionState::Locked { .. }));
    }

    #[tokio::test]
    async fn test_rejected_token_silently_demotes() {
        let api = RecordingApi::new();
        let store = MemoryStore::new();

        store
            .save(StoredSession { token: "expired".to_string(), fresh_login: false })
            .await
            .expect("seed session");
        api.respond_with(Err(ApiError::Status { status: 401, detail: None }));

        let auth = session(&api, &store, FixedGate { available: true, accept: true });
        let state = auth.load_user().await.expect("demotion is not an error");

        assert_eq!(state, SessionState::LoggedOut);
        assert!(store.stored().is_none());
        assert_eq!(api.token(), None);
    }

    #[tokio::test]
    async fn test_network_failure_keeps_stored_session() {
        let api = RecordingApi::new();
        let store = MemoryStore::new();

        store
            .save(StoredSession { token: "tok-1".to_string(), fresh_login: false })
            .await
            .expect("seed session");
        api.respond_with(Err(ApiError::Network("connection refused".to_string())));

        let auth = session(&api, &store, FixedGate { available: false, accept: true });
        auth.load_user().await.expect_err("transport failure surfaces");

        assert!(store.stored().is_some());
    }

    #[tokio::test]
    async fn test_logout_then_load_yields_clean_logged_out() {
        let api = RecordingApi::new();
        let store = MemoryStore::new();

        api.respond_with(Ok(json!({
            "access_token": "tok-1",
            "id": "u1",
            "email": "ana@example.com",
            "name": "Ana",
            "role": "user",
            "loyalty_points": 20
        })));

        let auth = session(&api, &store, FixedGate { available: false, accept: true });
        auth.login("ana@example.com", "hunter2").await.expect("login succeeds");

        auth.logout().await.expect("logout succeeds");
        let state = auth.load_user().await.expect("load completes");

        assert_eq!(state, SessionState::LoggedOut);
        assert_eq!(auth.current_user(), None);
        assert_eq!(api.token(), None);
    }
}
