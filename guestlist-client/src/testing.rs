use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use guestlist_core::{ApiClient, ApiError};

/// A scripted gateway that records every request it receives.
/// Responses are handed out in the order they were queued; an unscripted
/// request fails as a network error.
pub struct RecordingApi {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<Result<Value, ApiError>>>,
    token: Mutex<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

impl RecordingApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Default::default(),
            responses: Default::default(),
            token: Default::default(),
        })
    }

    pub fn respond_with(&self, response: Result<Value, ApiError>) {
        self.responses.lock().push_back(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn record(&self, method: &'static str, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.calls.lock().push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });

        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted response".to_string())))
    }
}

#[async_trait]
impl ApiClient for RecordingApi {
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.record("GET", path, None)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.record("POST", path, Some(body))
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.record("PUT", path, Some(body))
    }

    async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.record("DELETE", path, None)
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.lock() = token;
    }
}

/// An in-memory [guestlist_core::SessionStore] for tests
pub struct MemoryStore {
    session: Mutex<Option<guestlist_core::StoredSession>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            session: Default::default(),
        })
    }

    pub fn stored(&self) -> Option<guestlist_core::StoredSession> {
        self.session.lock().clone()
    }
}

#[async_trait]
impl guestlist_core::SessionStore for MemoryStore {
    async fn load(&self) -> Result<Option<guestlist_core::StoredSession>, guestlist_core::StoreError> {
        Ok(self.session.lock().clone())
    }

    async fn save(
        &self,
        session: guestlist_core::StoredSession,
    ) -> Result<(), guestlist_core::StoreError> {
        *self.session.lock() = Some(session);
        Ok(())
    }

    async fn clear(&self) -> Result<(), guestlist_core::StoreError> {
        *self.session.lock() = None;
        Ok(())
    }
}

/// A biometric gate with scripted availability and answer
pub struct FixedGate {
    pub available: bool,
    pub accept: bool,
}

#[async_trait]
impl crate::BiometricGate for FixedGate {
    fn available(&self) -> bool {
        self.available
    }

    async fn prompt(&self) -> bool {
        self.accept
    }
}
