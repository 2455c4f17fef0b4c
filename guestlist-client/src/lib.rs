mod auth;
mod data;
mod dj;
mod events;
mod loyalty;
mod polling;
mod prefs;
mod scan;
mod util;
mod vip;
mod voucher;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use thiserror::Error;

pub use auth::*;
pub use data::*;
pub use dj::*;
pub use events::*;
pub use loyalty::*;
pub use polling::*;
pub use prefs::*;
pub use scan::*;
pub use vip::*;
pub use voucher::*;

use guestlist_core::{ApiClient, ApiError, SessionStore};

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the operation for a business reason. The message
    /// is the server's own and is shown to the user verbatim; the client
    /// never re-derives these rules locally.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for ClientError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => Self::Rejected(detail),
            other => Self::Api(other),
        }
    }
}

/// The guestlist client system, tying every backend-facing service together.
pub struct Guestlist<A, S, G, C> {
    pub auth: AuthSession<A, S, G>,
    pub loyalty: LoyaltyLedger<A>,
    pub scanner: Scanner<A>,
    pub dj: SongRequests<A>,
    pub vip: VipBookings<A>,
    pub events: Events<A>,
    pub content: EventAdmin<A>,
    pub prefs: Preferences<A, C>,
}

impl<A, S, G, C> Guestlist<A, S, G, C>
where
    A: ApiClient,
    S: SessionStore,
    G: BiometricGate,
    C: PrefsCache,
{
    pub fn new(api: A, store: S, gate: G, cache: C) -> Self {
        let api = Arc::new(api);
        let store = Arc::new(store);
        let cache = Arc::new(cache);

        Self {
            auth: AuthSession::new(&api, &store, gate),
            loyalty: LoyaltyLedger::new(&api),
            scanner: Scanner::new(&api),
            dj: SongRequests::new(&api),
            vip: VipBookings::new(&api),
            events: Events::new(&api),
            content: EventAdmin::new(&api),
            prefs: Preferences::new(&api, &cache),
        }
    }
}
