use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use guestlist_core::ApiClient;

use crate::{util::decode, BookingStatus, ClientResult, VipBooking, VipPackage};

/// VIP table bookings. A booking starts out pending and only an admin
/// moves it from there.
pub struct VipBookings<A> {
    api: Arc<A>,
}

#[derive(Debug, Clone)]
pub struct NewVipBooking {
    pub event_id: String,
    pub zone: String,
    pub package: VipPackage,
    pub guest_count: u32,
    pub bottle_preferences: Option<String>,
    pub special_requests: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingAck {
    pub booking_id: String,
    #[serde(default)]
    pub message: String,
}

impl<A> VipBookings<A>
where
    A: ApiClient,
{
    pub fn new(api: &Arc<A>) -> Self {
        Self { api: api.clone() }
    }

    pub async fn book(&self, new_booking: NewVipBooking) -> ClientResult<BookingAck> {
        let body = json!({
            "event_id": new_booking.event_id,
            "zone": new_booking.zone,
            "package": new_booking.package.as_str(),
            "guest_count": new_booking.guest_count,
            "bottle_preferences": new_booking.bottle_preferences.unwrap_or_default(),
            "special_requests": new_booking.special_requests.unwrap_or_default(),
            "total_price": new_booking.package.price(),
            "customer_name": new_booking.customer_name,
            "customer_email": new_booking.customer_email,
            "customer_phone": new_booking.customer_phone.unwrap_or_default(),
        });

        decode(self.api.post("/vip/book", body).await?)
    }

    pub async fn my_bookings(&self) -> ClientResult<Vec<VipBooking>> {
        decode(self.api.get("/vip/my-bookings").await?)
    }

    pub async fn cancel(&self, booking_id: &str) -> ClientResult<()> {
        self.api
            .delete(&format!("/vip/bookings/{booking_id}"))
            .await?;

        Ok(())
    }

    /// Every booking in the system. Admin only.
    pub async fn all_bookings(&self) -> ClientResult<Vec<VipBooking>> {
        decode(self.api.get("/admin/vip-bookings").await?)
    }

    /// Moves a booking to a new status. Transitions are admin-driven only;
    /// guests never change a booking's status directly.
    pub async fn set_status(&self, booking_id: &str, status: BookingStatus) -> ClientResult<()> {
        self.api
            .put(
                &format!("/admin/vip-bookings/{booking_id}"),
                json!({ "status": status.as_str() }),
            )
            .await?;

        Ok(())
    }
}
