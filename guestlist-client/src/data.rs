use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Loyalty point balances are non-negative integers
pub type Points = u32;

/// A guestlist account. Server-owned; the client holds a transient copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub loyalty_points: Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl UserData {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The loyalty projection for the authenticated user. Read-only; recomputed
/// by the server on every fetch and never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyData {
    pub points: Points,
    pub check_ins_count: u32,
    /// 0 to 100
    pub progress_to_next_reward: f32,
    pub points_needed: Points,
    pub rewards_earned: u32,
    /// Most recent first
    #[serde(default)]
    pub recent_check_ins: Vec<CheckIn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub event_name: String,
    pub points: Points,
    pub date: DateTime<Utc>,
}

/// A free-entry voucher. Created server-side when points are redeemed;
/// the copy here is a display cache. Once `used` is true the voucher is
/// terminal and its QR code must never be rendered as valid again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeEntryVoucher {
    pub id: String,
    pub code: String,
    pub used: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRequest {
    pub id: String,
    pub song_title: String,
    pub artist_name: String,
    pub user_name: String,
    pub votes: u32,
    #[serde(default = "one")]
    pub times_requested: u32,
    pub status: RequestStatus,
    #[serde(default)]
    pub rejection_label: Option<String>,
    #[serde(default)]
    pub can_vote: bool,
    #[serde(default)]
    pub can_request: bool,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Played,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Played => "played",
            Self::Rejected => "rejected",
        }
    }
}

impl SongRequest {
    /// Whether the vote control should be enabled. Once a request leaves
    /// the pending state the server disallows voting, and the client
    /// disables the control to match.
    pub fn votable(&self) -> bool {
        self.status == RequestStatus::Pending && self.can_vote
    }

    /// Whether moderation controls should be enabled
    pub fn moderatable(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VipBooking {
    pub id: String,
    pub event_id: String,
    pub zone: String,
    pub package: VipPackage,
    pub guest_count: u32,
    #[serde(default)]
    pub total_price: f32,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VipPackage {
    Bronze,
    Silver,
    Gold,
}

impl VipPackage {
    /// The fixed package price table. A display hint; the server owns the
    /// price actually charged.
    pub fn price(&self) -> f32 {
        match self {
            Self::Bronze => 350.0,
            Self::Silver => 500.0,
            Self::Gold => 800.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub venue_name: String,
    #[serde(default)]
    pub venue_address: String,
    #[serde(default)]
    pub lineup: Vec<LineupEntry>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Notification preferences. There is exactly one shape for these; every
/// key is initialized by `Default` so a toggle can never touch a key that
/// was never part of the struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub push_enabled: bool,
    pub new_events: bool,
    pub event_reminders: bool,
    pub promotions: bool,
    pub loyalty_updates: bool,
    pub dj_updates: bool,
    pub newsletter_email: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push_enabled: true,
            new_events: true,
            event_reminders: true,
            promotions: true,
            loyalty_updates: true,
            dj_updates: true,
            newsletter_email: false,
        }
    }
}
