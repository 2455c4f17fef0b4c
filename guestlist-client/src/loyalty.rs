use std::sync::Arc;

use log::info;
use serde::Deserialize;
use serde_json::json;

use guestlist_core::ApiClient;

use crate::{util::decode, ClientResult, FreeEntryVoucher, LoyaltyData, Points};

/// How many points a free entry costs. This is a display hint used to
/// enable the claim control; the authoritative check is always the
/// server's rejection.
pub const REWARD_THRESHOLD: Points = 25;

/// Fetches and reflects the loyalty projection. All point accounting
/// happens server-side; nothing here mutates state locally.
pub struct LoyaltyLedger<A> {
    api: Arc<A>,
}

#[derive(Debug, Deserialize)]
struct ClaimedReward {
    #[serde(default)]
    message: String,
    voucher: FreeEntryVoucher,
}

#[derive(Debug, Deserialize)]
struct VoucherCheck {
    #[serde(default)]
    voucher: Option<FreeEntryVoucher>,
}

/// The result of scanning an event QR code as a user
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventScan {
    pub points_earned: Points,
    pub total_points: Points,
    pub event_name: String,
    #[serde(default)]
    pub message: String,
}

impl<A> LoyaltyLedger<A>
where
    A: ApiClient,
{
    pub fn new(api: &Arc<A>) -> Self {
        Self { api: api.clone() }
    }

    /// Retrieves the current projection. Idempotent and safe to poll.
    pub async fn fetch(&self) -> ClientResult<LoyaltyData> {
        decode(self.api.get("/loyalty/my-points").await?)
    }

    /// Redeems points for a free-entry voucher. An insufficient-points
    /// rejection (a concurrent claim may have raced this one) surfaces
    /// the server's message untouched.
    pub async fn claim_reward(&self) -> ClientResult<FreeEntryVoucher> {
        let value = self.api.post("/loyalty/claim-reward", json!({})).await?;
        let claimed: ClaimedReward = decode(value)?;

        info!("Claimed voucher {}: {}", claimed.voucher.id, claimed.message);
        Ok(claimed.voucher)
    }

    /// The user's currently active voucher, if one exists. Checked on every
    /// profile load so a claim is never offered while one is outstanding.
    pub async fn existing_voucher(&self) -> ClientResult<Option<FreeEntryVoucher>> {
        let value = self.api.get("/loyalty/free-entry/check").await?;
        let check: VoucherCheck = decode(value)?;

        Ok(check.voucher.filter(|voucher| !voucher.used))
    }

    /// Submits an event QR code scanned by the user to earn points.
    /// One scan per code per user, enforced server-side.
    pub async fn scan_event_code(&self, code: &str) -> ClientResult<EventScan> {
        let value = self
            .api
            .post("/loyalty/scan-event-qr", json!({ "qr_code": code }))
            .await?;

        decode(value)
    }
}

/// Whether the claim control should be enabled
pub fn claim_ready(data: &LoyaltyData) -> bool {
    data.points >= REWARD_THRESHOLD
}

/// The progress line shown under the claim control
pub fn progress_line(data: &LoyaltyData) -> String {
    if claim_ready(data) {
        "Free entry available!".to_string()
    } else {
        format!("{} more points needed", data.points_needed)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::RecordingApi;
    use crate::ClientError;
    use guestlist_core::ApiError;
    use serde_json::json;

    fn loyalty_data(points: Points, points_needed: Points) -> LoyaltyData {
        LoyaltyData {
            points,
            check_ins_count: 4,
            progress_to_next_reward: (points as f32 / REWARD_THRESHOLD as f32) * 100.0,
            points_needed,
            rewards_earned: 0,
            recent_check_ins: Vec::new(),
        }
    }

    #[test]
    fn test_claim_control_disabled_below_threshold() {
        let data = loyalty_data(20, 5);

        assert!(!claim_ready(&data));
        assert_eq!(progress_line(&data), "5 more points needed");
    }

    #[test]
    fn test_claim_control_enabled_at_threshold() {
        let data = loyalty_data(25, 25);
        assert!(claim_ready(&data));
    }

    #[tokio::test]
    async fn test_fetch_decodes_projection() {
        let api = RecordingApi::new();

        api.respond_with(Ok(json!({
            "points": 20,
            "check_ins_count": 4,
            "progress_to_next_reward": 80.0,
            "points_needed": 5,
            "rewards_earned": 0,
            "recent_check_ins": [
                { "event_name": "Summer Edition", "points": 5, "date": "2024-06-01T23:30:00Z" }
            ]
        })));

        let ledger = LoyaltyLedger::new(&api);
        let data = ledger.fetch().await.expect("fetch succeeds");

        assert_eq!(data.points, 20);
        assert_eq!(data.recent_check_ins.len(), 1);
        assert_eq!(data.recent_check_ins[0].event_name, "Summer Edition");
    }

    #[tokio::test]
    async fn test_claim_returns_voucher() {
        let api = RecordingApi::new();

        api.respond_with(Ok(json!({
            "message": "Reward claimed successfully!",
            "voucher": { "id": "v1", "code": "ABC123", "used": false }
        })));

        let ledger = LoyaltyLedger::new(&api);
        let voucher = ledger.claim_reward().await.expect("claim succeeds");

        assert_eq!(voucher.id, "v1");
        assert_eq!(voucher.code, "ABC123");
        assert!(!voucher.used);

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/loyalty/claim-reward");
    }

    #[tokio::test]
    async fn test_insufficient_points_surfaces_server_message() {
        let api = RecordingApi::new();

        api.respond_with(Err(ApiError::Status {
            status: 400,
            detail: Some("Not enough points. You have 20, need 25.".to_string()),
        }));

        let ledger = LoyaltyLedger::new(&api);
        let error = ledger.claim_reward().await.expect_err("claim is rejected");

        match error {
            ClientError::Rejected(detail) => {
                assert_eq!(detail, "Not enough points. You have 20, need 25.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_existing_voucher_ignores_used_ones() {
        let api = RecordingApi::new();

        api.respond_with(Ok(json!({
            "has_voucher": true,
            "voucher": { "id": "v1", "code": "ABC123", "used": true }
        })));

        let ledger = LoyaltyLedger::new(&api);
        let voucher = ledger.existing_voucher().await.expect("check succeeds");

        assert_eq!(voucher, None);
    }

    #[tokio::test]
    async fn test_event_scan_decodes_result() {
        let api = RecordingApi::new();

        api.respond_with(Ok(json!({
            "success": true,
            "points_earned": 3,
            "total_points": 23,
            "event_name": "Summer Edition",
            "message": "You earned 3 points!"
        })));

        let ledger = LoyaltyLedger::new(&api);
        let scan = ledger.scan_event_code("EVQ-123").await.expect("scan succeeds");

        assert_eq!(scan.points_earned, 3);
        assert_eq!(scan.total_points, 23);

        let calls = api.calls();
        assert_eq!(calls[0].path, "/loyalty/scan-event-qr");
        assert_eq!(calls[0].body, Some(json!({ "qr_code": "EVQ-123" })));
    }
}
