use std::sync::Arc;

use lazy_static::lazy_static;
use log::info;
use parking_lot::Mutex;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use guestlist_core::{ApiClient, ApiError, QrPayload};

use crate::{ClientError, Points};

lazy_static! {
    /// Accepted shape for manually typed voucher codes, checked before any
    /// network call is made
    static ref MANUAL_CODE_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9-]{6,64}$").expect("manual code pattern compiles");
}

/// The staff-facing scan flow. One submission in flight at a time; a second
/// capture while submitting is ignored, and every result leaves the scanner
/// re-armable.
pub struct Scanner<A> {
    api: Arc<A>,
    state: Mutex<ScanState>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScanState {
    #[default]
    Idle,
    /// Ready to accept a capture
    Armed,
    /// A capture is being validated by the server
    Submitting,
    Done(ScanOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// A loyalty check-in was accepted
    CheckedIn {
        user_name: String,
        points_earned: Points,
        total_points: Points,
    },
    /// The guest was already checked in for this event; not an error
    AlreadyCheckedIn { user_name: String },
    /// A free-entry voucher was accepted at the door
    EntryValidated {
        user_name: Option<String>,
        message: String,
    },
    Rejected { reason: String },
}

impl ScanOutcome {
    /// The line shown to the operator
    pub fn summary(&self) -> String {
        match self {
            Self::CheckedIn {
                user_name,
                points_earned,
                ..
            } => format!("+{points_earned} points earned for {user_name}"),
            Self::AlreadyCheckedIn { user_name } => {
                format!("{user_name} is already checked in for this event")
            }
            Self::EntryValidated { message, .. } => message.clone(),
            Self::Rejected { reason } => reason.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CheckinResponse {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    points_earned: Points,
    #[serde(default)]
    total_points: Points,
    #[serde(default)]
    already_checked_in: bool,
}

#[derive(Debug, Deserialize)]
struct ValidationResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    user_name: Option<String>,
}

impl<A> Scanner<A>
where
    A: ApiClient,
{
    pub fn new(api: &Arc<A>) -> Self {
        Self {
            api: api.clone(),
            state: Default::default(),
        }
    }

    /// Readies the scanner for a capture. Also the explicit "scan again"
    /// after a result. No effect while a submission is in flight.
    pub fn arm(&self) -> bool {
        let mut state = self.state.lock();

        if *state == ScanState::Submitting {
            return false;
        }

        *state = ScanState::Armed;
        true
    }

    pub fn state(&self) -> ScanState {
        self.state.lock().clone()
    }

    /// Handles a captured payload. Captures arriving while the scanner is
    /// not armed are dropped, which is what debounces double reads.
    /// Payloads that fail to parse are rejected without a network call.
    pub async fn handle_scan(&self, raw: &str) -> ScanState {
        {
            let mut state = self.state.lock();

            if *state != ScanState::Armed {
                return state.clone();
            }

            *state = ScanState::Submitting;
        }

        let outcome = match QrPayload::parse(raw) {
            Err(e) => ScanOutcome::Rejected {
                reason: e.to_string(),
            },
            Ok(QrPayload::LoyaltyCheckin { .. }) => self.submit_checkin(raw).await,
            Ok(QrPayload::FreeEntry { voucher_id, .. }) => {
                self.submit_validation(&voucher_id).await
            }
        };

        self.finish(outcome)
    }

    /// The manual-entry fallback for degraded camera conditions. The code's
    /// format is checked locally; validation itself is the server's.
    /// Like a capture, a manual code is ignored while a submission is in
    /// flight, even when it would be rejected locally.
    pub async fn submit_manual(&self, code: &str) -> ScanState {
        let code = code.trim();

        {
            let mut state = self.state.lock();

            if *state == ScanState::Submitting {
                return state.clone();
            }

            if !MANUAL_CODE_REGEX.is_match(code) {
                let done = ScanState::Done(ScanOutcome::Rejected {
                    reason: "Invalid code format".to_string(),
                });

                *state = done.clone();
                return done;
            }

            *state = ScanState::Submitting;
        }

        let outcome = self.submit_validation(code).await;
        self.finish(outcome)
    }

    async fn submit_checkin(&self, raw: &str) -> ScanOutcome {
        let result = self
            .api
            .post(
                "/loyalty/admin/scan-checkin",
                json!({ "qr_code_data": raw, "event_id": "current" }),
            )
            .await;

        let value = match result {
            Ok(value) => value,
            Err(e) => return rejection(e),
        };

        match serde_json::from_value::<CheckinResponse>(value) {
            Ok(response) if response.success => {
                info!(
                    "Checked in {} (+{} points)",
                    response.user_name, response.points_earned
                );

                ScanOutcome::CheckedIn {
                    user_name: response.user_name,
                    points_earned: response.points_earned,
                    total_points: response.total_points,
                }
            }
            Ok(response) if response.already_checked_in => ScanOutcome::AlreadyCheckedIn {
                user_name: response.user_name,
            },
            Ok(response) => ScanOutcome::Rejected {
                reason: response.message,
            },
            Err(e) => ScanOutcome::Rejected {
                reason: e.to_string(),
            },
        }
    }

    async fn submit_validation(&self, voucher_id: &str) -> ScanOutcome {
        let result = self
            .api
            .post(
                "/admin/free-entry/validate",
                json!({ "voucher_id": voucher_id }),
            )
            .await;

        match result {
            Ok(value) => match serde_json::from_value::<ValidationResponse>(value) {
                Ok(response) => ScanOutcome::EntryValidated {
                    user_name: response.user_name,
                    message: response.message,
                },
                Err(e) => ScanOutcome::Rejected {
                    reason: e.to_string(),
                },
            },
            Err(e) => rejection(e),
        }
    }

    fn finish(&self, outcome: ScanOutcome) -> ScanState {
        let done = ScanState::Done(outcome);
        *self.state.lock() = done.clone();
        done
    }
}

/// Business rejections carry the server's message; transport failures fall
/// back to their own description. Either way the scanner stays usable.
fn rejection(error: ApiError) -> ScanOutcome {
    let reason = match ClientError::from(error) {
        ClientError::Rejected(detail) => detail,
        ClientError::Api(e) => e.to_string(),
    };

    ScanOutcome::Rejected { reason }
}
