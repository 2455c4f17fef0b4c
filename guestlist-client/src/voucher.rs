use guestlist_core::QrPayload;

use crate::{claim_ready, FreeEntryVoucher, LoyaltyData, Points};

/// Where the user sits in the free-entry lifecycle. Derived from the
/// server's projection and voucher flag on each fetch, never inferred
/// from what happened locally.
#[derive(Debug, Clone, PartialEq)]
pub enum RewardProgress {
    /// Still earning points towards the threshold
    Accruing { points_needed: Points },
    /// Enough points to claim, no voucher outstanding
    Ready,
    /// An unused voucher exists; its QR can be presented at the door
    Claimed(FreeEntryVoucher),
    /// The voucher was validated at the door. Terminal.
    Consumed,
}

pub fn reward_progress(
    data: &LoyaltyData,
    voucher: Option<&FreeEntryVoucher>,
) -> RewardProgress {
    match voucher {
        Some(voucher) if voucher.used => RewardProgress::Consumed,
        Some(voucher) => RewardProgress::Claimed(voucher.clone()),
        None if claim_ready(data) => RewardProgress::Ready,
        None => RewardProgress::Accruing {
            points_needed: data.points_needed,
        },
    }
}

/// The QR payload for presenting a voucher at the door. A used voucher is
/// terminal and gets no payload; the `used` flag is the server's, refetched
/// rather than tracked locally.
pub fn entry_qr(voucher: &FreeEntryVoucher, user_id: &str) -> Option<QrPayload> {
    if voucher.used {
        return None;
    }

    Some(QrPayload::free_entry(&voucher.id, &voucher.code, user_id))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn data(points: Points, points_needed: Points) -> LoyaltyData {
        LoyaltyData {
            points,
            check_ins_count: 0,
            progress_to_next_reward: 0.0,
            points_needed,
            rewards_earned: 0,
            recent_check_ins: Vec::new(),
        }
    }

    fn voucher(used: bool) -> FreeEntryVoucher {
        FreeEntryVoucher {
            id: "v1".to_string(),
            code: "ABC123".to_string(),
            used,
            expires_at: None,
        }
    }

    #[test]
    fn test_lifecycle_derivation() {
        assert_eq!(
            reward_progress(&data(20, 5), None),
            RewardProgress::Accruing { points_needed: 5 }
        );
        assert_eq!(reward_progress(&data(25, 25), None), RewardProgress::Ready);
        assert_eq!(
            reward_progress(&data(0, 25), Some(&voucher(false))),
            RewardProgress::Claimed(voucher(false))
        );
        assert_eq!(
            reward_progress(&data(30, 20), Some(&voucher(true))),
            RewardProgress::Consumed
        );
    }

    #[test]
    fn test_consumed_voucher_never_renders_qr() {
        assert_eq!(entry_qr(&voucher(true), "u1"), None);
    }

    #[test]
    fn test_entry_qr_payload() {
        let payload = entry_qr(&voucher(false), "u42").expect("unused voucher renders");
        let encoded: serde_json::Value =
            serde_json::from_str(&payload.encode()).expect("payload is json");

        assert_eq!(
            encoded,
            json!({
                "type": "free_entry",
                "voucher_id": "v1",
                "code": "ABC123",
                "user_id": "u42",
            })
        );
    }
}
