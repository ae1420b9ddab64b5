//! HTTP API client for the platform backend.
//!
//! All endpoints require the bearer token from the session store; the
//! token is resolved per request so login/logout take effect immediately.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    domain::{Room, RoomId, Topic, TopicId, ValueObjectError},
    infrastructure::dto::http::{
        CreateRoomRequest, CreateRoomResponse, CreateTopicRequest, CreateTopicResponse,
        ErrorResponse, JoinRoomRequest, MakeAdminRequest, MyRoomsResponse, RemoveUserRequest,
        RevealPasswordResponse, TopicsResponse,
    },
    session::SessionStore,
};

/// Fallback shown when an error response carries no `detail` field
const GENERIC_API_ERROR: &str = "request failed";

/// Errors surfaced by API calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// No bearer token available; the request was never sent
    #[error("authentication token not available")]
    AuthUnavailable,

    /// Non-2xx response; `detail` is surfaced to the user verbatim
    #[error("{detail}")]
    Api { status: u16, detail: String },

    /// Transport-level failure (connection refused, timeout, ...)
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not map onto the domain model
    #[error("invalid response data: {0}")]
    InvalidData(#[from] ValueObjectError),
}

/// Abstraction over the room/topic HTTP API.
///
/// UseCases depend on this trait so mutations can be tested with a mock
/// instead of a live backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomApi: Send + Sync {
    async fn list_my_rooms(&self) -> Result<Vec<Room>, ApiError>;

    async fn create_room(&self, name: &str, password: &str) -> Result<RoomId, ApiError>;

    async fn join_room(&self, room_id: &RoomId, password: &str) -> Result<(), ApiError>;

    async fn leave_room(&self, room_id: &RoomId) -> Result<(), ApiError>;

    async fn delete_room(&self, room_id: &RoomId) -> Result<(), ApiError>;

    async fn reveal_password(&self, room_id: &RoomId) -> Result<String, ApiError>;

    async fn list_topics(&self, room_id: &RoomId) -> Result<Vec<Topic>, ApiError>;

    async fn create_topic(
        &self,
        room_id: &RoomId,
        title: &str,
        description: &str,
    ) -> Result<TopicId, ApiError>;

    async fn delete_topic(&self, topic_id: &TopicId) -> Result<(), ApiError>;

    async fn make_admin(&self, room_id: &RoomId, user_email: &str) -> Result<(), ApiError>;

    async fn remove_user(&self, room_id: &RoomId, user_email: &str) -> Result<(), ApiError>;

    async fn delete_chat(&self, room_id: &RoomId, topic_id: &TopicId) -> Result<(), ApiError>;
}

/// reqwest-backed [`RoomApi`] implementation
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpApiClient {
    /// Create a client for the given API base URL
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<String, ApiError> {
        self.session.token().ok_or(ApiError::AuthUnavailable)
    }

    /// Map non-2xx responses to `ApiError::Api`, surfacing the `detail`
    /// message when the body carries one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| GENERIC_API_ERROR.to_string());
        Err(ApiError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(self.token()?)
            .json(body)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn delete(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http
            .delete(self.endpoint(path))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn delete_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http
            .delete(self.endpoint(path))
            .bearer_auth(self.token()?)
            .json(body)
            .send()
            .await?;
        Self::check(response).await
    }
}

#[async_trait]
impl RoomApi for HttpApiClient {
    async fn list_my_rooms(&self) -> Result<Vec<Room>, ApiError> {
        let body: MyRoomsResponse = self.get("/rooms/my-rooms").await?.json().await?;
        let rooms = body
            .rooms
            .into_iter()
            .map(Room::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rooms)
    }

    async fn create_room(&self, name: &str, password: &str) -> Result<RoomId, ApiError> {
        let body: CreateRoomResponse = self
            .post_json("/rooms/create", &CreateRoomRequest { name, password })
            .await?
            .json()
            .await?;
        Ok(RoomId::new(body.room_id)?)
    }

    async fn join_room(&self, room_id: &RoomId, password: &str) -> Result<(), ApiError> {
        self.post_json(
            "/rooms/join",
            &JoinRoomRequest {
                room_id: room_id.as_str(),
                password,
            },
        )
        .await?;
        Ok(())
    }

    async fn leave_room(&self, room_id: &RoomId) -> Result<(), ApiError> {
        self.post_json(&format!("/rooms/{room_id}/leave"), &serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn delete_room(&self, room_id: &RoomId) -> Result<(), ApiError> {
        self.delete(&format!("/rooms/{room_id}")).await?;
        Ok(())
    }

    async fn reveal_password(&self, room_id: &RoomId) -> Result<String, ApiError> {
        let body: RevealPasswordResponse = self
            .get(&format!("/rooms/{room_id}/reveal-password"))
            .await?
            .json()
            .await?;
        Ok(body.password)
    }

    async fn list_topics(&self, room_id: &RoomId) -> Result<Vec<Topic>, ApiError> {
        let body: TopicsResponse = self
            .get(&format!("/topics/room/{room_id}"))
            .await?
            .json()
            .await?;
        let topics = body
            .topics
            .into_iter()
            .map(Topic::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(topics)
    }

    async fn create_topic(
        &self,
        room_id: &RoomId,
        title: &str,
        description: &str,
    ) -> Result<TopicId, ApiError> {
        let body: CreateTopicResponse = self
            .post_json(
                "/topics/create",
                &CreateTopicRequest {
                    room_id: room_id.as_str(),
                    title,
                    description,
                },
            )
            .await?
            .json()
            .await?;
        Ok(TopicId::new(body.topic_id)?)
    }

    async fn delete_topic(&self, topic_id: &TopicId) -> Result<(), ApiError> {
        self.delete(&format!("/topics/{topic_id}")).await?;
        Ok(())
    }

    async fn make_admin(&self, room_id: &RoomId, user_email: &str) -> Result<(), ApiError> {
        self.post_json(
            "/room/make-admin",
            &MakeAdminRequest {
                room_id: room_id.as_str(),
                user_email,
            },
        )
        .await?;
        Ok(())
    }

    async fn remove_user(&self, room_id: &RoomId, user_email: &str) -> Result<(), ApiError> {
        self.delete_json(
            "/room/remove-user",
            &RemoveUserRequest {
                room_id: room_id.as_str(),
                user_email,
            },
        )
        .await?;
        Ok(())
    }

    async fn delete_chat(&self, room_id: &RoomId, topic_id: &TopicId) -> Result<(), ApiError> {
        self.delete(&format!("/chat/{room_id}/{topic_id}")).await?;
        Ok(())
    }
}
