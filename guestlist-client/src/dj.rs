use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use guestlist_core::ApiClient;

use crate::{util::decode, ClientResult, RequestStatus, SongRequest};

/// The song-request flow between guests and the DJ booth
pub struct SongRequests<A> {
    api: Arc<A>,
}

#[derive(Debug, Clone)]
pub struct NewSongRequest {
    pub song_title: String,
    pub artist_name: String,
    pub user_name: Option<String>,
    /// The venue fence is enforced server-side from these coordinates
    pub location: Option<(f64, f64)>,
}

/// Acknowledgement for a submitted request. Requesting a song that is
/// already pending bumps its counter instead of duplicating it.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestAck {
    pub message: String,
    pub request_id: String,
    #[serde(default)]
    pub times_requested: u32,
}

/// Moderation verdicts available to the DJ dashboard
#[derive(Debug, Clone)]
pub enum Moderation {
    Played,
    Rejected {
        label: Option<String>,
        reason: Option<String>,
    },
}

impl<A> SongRequests<A>
where
    A: ApiClient,
{
    pub fn new(api: &Arc<A>) -> Self {
        Self { api: api.clone() }
    }

    pub async fn list(&self, status: Option<RequestStatus>) -> ClientResult<Vec<SongRequest>> {
        let path = match status {
            Some(status) => format!("/dj/requests?status={}", status.as_str()),
            None => "/dj/requests".to_string(),
        };

        decode(self.api.get(&path).await?)
    }

    pub async fn my_requests(&self) -> ClientResult<Vec<SongRequest>> {
        decode(self.api.get("/dj/my-requests").await?)
    }

    /// Every request in the system, regardless of requester. Admin only.
    pub async fn all_requests(&self) -> ClientResult<Vec<SongRequest>> {
        decode(self.api.get("/dj/admin/all-requests").await?)
    }

    pub async fn request(&self, new_request: NewSongRequest) -> ClientResult<RequestAck> {
        let mut body = json!({
            "song_title": new_request.song_title,
            "artist_name": new_request.artist_name,
        });

        if let Some(user_name) = new_request.user_name {
            body["user_name"] = json!(user_name);
        }

        // The backend reads coordinates as strings
        if let Some((latitude, longitude)) = new_request.location {
            body["latitude"] = json!(latitude.to_string());
            body["longitude"] = json!(longitude.to_string());
        }

        decode(self.api.post("/dj/request-song", body).await?)
    }

    /// Adds the current user's vote. Whether the control should be enabled
    /// at all comes from [SongRequest::votable]; the server has the final
    /// word either way.
    pub async fn vote(&self, request_id: &str) -> ClientResult<()> {
        self.api
            .post(&format!("/dj/vote/{request_id}"), json!({}))
            .await?;

        Ok(())
    }

    pub async fn moderate(&self, request_id: &str, verdict: Moderation) -> ClientResult<()> {
        let body = match verdict {
            Moderation::Played => json!({ "status": "played" }),
            Moderation::Rejected { label, reason } => {
                let mut body = json!({ "status": "rejected" });

                if let Some(label) = label {
                    body["rejection_label"] = json!(label);
                }
                if let Some(reason) = reason {
                    body["rejection_reason"] = json!(reason);
                }

                body
            }
        };

        self.api
            .post(&format!("/dj/admin/update-request/{request_id}"), body)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, request_id: &str) -> ClientResult<()> {
        self.api
            .delete(&format!("/dj/requests/{request_id}"))
            .await?;

        Ok(())
    }

    pub async fn clear_all(&self) -> ClientResult<()> {
        self.api.delete("/dj/requests/clear-all").await?;
        Ok(())
    }
}
