use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use guestlist_core::ApiClient;

use crate::{util::decode, ClientResult, EventData};

/// Read-only access to the venue's event calendar
pub struct Events<A> {
    api: Arc<A>,
}

#[derive(Debug, Deserialize)]
struct NextEvent {
    event: EventData,
}

impl<A> Events<A>
where
    A: ApiClient,
{
    pub fn new(api: &Arc<A>) -> Self {
        Self { api: api.clone() }
    }

    pub async fn list(&self, status: Option<&str>) -> ClientResult<Vec<EventData>> {
        let path = match status {
            Some(status) => format!("/events?status={status}"),
            None => "/events".to_string(),
        };

        decode(self.api.get(&path).await?)
    }

    /// The next upcoming event, falling back server-side to the most
    /// recent one when nothing is scheduled
    pub async fn next(&self) -> ClientResult<EventData> {
        let envelope: NextEvent = decode(self.api.get("/events/next").await?)?;
        Ok(envelope.event)
    }

    pub async fn by_id(&self, event_id: &str) -> ClientResult<EventData> {
        decode(self.api.get(&format!("/events/{event_id}")).await?)
    }
}

/// Admin content management for the event calendar
pub struct EventAdmin<A> {
    api: Arc<A>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub event_date: DateTime<Utc>,
    pub description: Option<String>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
}

/// A partial update; only the fields that are set are sent, so omitted
/// fields keep their current value server-side.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardData {
    pub stats: DashboardStats,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u32,
    #[serde(default)]
    pub pending_requests: u32,
}

impl<A> EventAdmin<A>
where
    A: ApiClient,
{
    pub fn new(api: &Arc<A>) -> Self {
        Self { api: api.clone() }
    }

    pub async fn create(&self, new_event: NewEvent) -> ClientResult<CreatedEvent> {
        let body = json!({
            "name": new_event.name,
            "event_date": new_event.event_date,
            "description": new_event.description.unwrap_or_default(),
            "venue_name": new_event.venue_name.unwrap_or_default(),
            "venue_address": new_event.venue_address.unwrap_or_default(),
        });

        decode(self.api.post("/admin/events", body).await?)
    }

    pub async fn update(&self, event_id: &str, update: EventUpdate) -> ClientResult<()> {
        let mut body = json!({});

        if let Some(name) = update.name {
            body["name"] = json!(name);
        }
        if let Some(description) = update.description {
            body["description"] = json!(description);
        }
        if let Some(event_date) = update.event_date {
            body["event_date"] = json!(event_date);
        }
        if let Some(venue_name) = update.venue_name {
            body["venue_name"] = json!(venue_name);
        }
        if let Some(venue_address) = update.venue_address {
            body["venue_address"] = json!(venue_address);
        }

        self.api
            .put(&format!("/admin/events/{event_id}"), body)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, event_id: &str) -> ClientResult<()> {
        self.api
            .delete(&format!("/admin/events/{event_id}"))
            .await?;

        Ok(())
    }

    /// The overview counters shown on the admin dashboard
    pub async fn dashboard(&self) -> ClientResult<DashboardData> {
        decode(self.api.get("/admin/dashboard").await?)
    }
}
