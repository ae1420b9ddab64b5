//! HTTP API request/response DTOs.
//!
//! Wire shapes stay here; the rest of the crate works with domain types.

use serde::{Deserialize, Serialize};

use crate::domain::{Member, Room, RoomId, Topic, TopicId, ValueObjectError};

/// Error body returned by the API on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub detail: Option<String>,
}

/// A room member on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDto {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<MemberDto> for Member {
    fn from(dto: MemberDto) -> Self {
        Member::new(dto.id, dto.name, dto.email)
    }
}

/// A topic on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_by: String,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
}

impl TryFrom<TopicDto> for Topic {
    type Error = ValueObjectError;

    fn try_from(dto: TopicDto) -> Result<Self, Self::Error> {
        Ok(Topic::new(
            TopicId::new(dto.id)?,
            dto.title,
            dto.description,
            dto.created_by,
            dto.created_at,
        ))
    }
}

/// A room on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub members: Vec<MemberDto>,
    #[serde(default)]
    pub admins: Vec<MemberDto>,
    #[serde(default)]
    pub topics: Vec<TopicDto>,
}

impl TryFrom<RoomDto> for Room {
    type Error = ValueObjectError;

    fn try_from(dto: RoomDto) -> Result<Self, Self::Error> {
        Ok(Room {
            id: RoomId::new(dto.id)?,
            name: dto.name,
            is_private: dto.is_private,
            members: dto.members.into_iter().map(Member::from).collect(),
            admins: dto.admins.into_iter().map(Member::from).collect(),
            topics: dto
                .topics
                .into_iter()
                .map(Topic::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

/// Response of `GET /rooms/my-rooms`
#[derive(Debug, Clone, Deserialize)]
pub struct MyRoomsResponse {
    #[serde(default)]
    pub rooms: Vec<RoomDto>,
}

/// Response of `GET /topics/room/{room_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct TopicsResponse {
    #[serde(default)]
    pub topics: Vec<TopicDto>,
}

/// Body of `POST /rooms/create`
#[derive(Debug, Clone, Serialize)]
pub struct CreateRoomRequest<'a> {
    pub name: &'a str,
    pub password: &'a str,
}

/// Response of `POST /rooms/create`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
}

/// Body of `POST /rooms/join`
#[derive(Debug, Clone, Serialize)]
pub struct JoinRoomRequest<'a> {
    pub room_id: &'a str,
    pub password: &'a str,
}

/// Response of `GET /rooms/{id}/reveal-password`
#[derive(Debug, Clone, Deserialize)]
pub struct RevealPasswordResponse {
    pub password: String,
}

/// Body of `POST /topics/create`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTopicRequest<'a> {
    pub room_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
}

/// Response of `POST /topics/create`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTopicResponse {
    pub topic_id: String,
}

/// Body of `POST /room/make-admin`
#[derive(Debug, Clone, Serialize)]
pub struct MakeAdminRequest<'a> {
    pub room_id: &'a str,
    pub user_email: &'a str,
}

/// Body of `DELETE /room/remove-user`
#[derive(Debug, Clone, Serialize)]
pub struct RemoveUserRequest<'a> {
    pub room_id: &'a str,
    pub user_email: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_dto_into_domain() {
        // テスト項目: RoomDto からドメインモデルへ変換できる
        // given (前提条件):
        let json = r#"{
            "id": "room-1",
            "name": "Study Group",
            "is_private": true,
            "members": [{"id": "u2", "name": "Bob", "email": "bob@example.com"}],
            "admins": [{"id": "u1", "name": "Alice", "email": "alice@example.com"}],
            "topics": [{
                "id": "topic-1",
                "title": "General",
                "description": "anything",
                "created_by": "Alice",
                "created_at": 1000
            }]
        }"#;

        // when (操作):
        let dto: RoomDto = serde_json::from_str(json).unwrap();
        let room = Room::try_from(dto).unwrap();

        // then (期待する結果):
        assert_eq!(room.id.as_str(), "room-1");
        assert!(room.is_private);
        assert!(room.is_admin("alice@example.com"));
        assert!(room.is_member("bob@example.com"));
        assert_eq!(room.topics.len(), 1);
        assert_eq!(room.topics[0].title, "General");
    }

    #[test]
    fn test_room_dto_missing_collections_default_empty() {
        // テスト項目: members/admins/topics が無い場合は空として扱われる
        // given (前提条件):
        let json = r#"{"id": "room-1", "name": "Bare"}"#;

        // when (操作):
        let dto: RoomDto = serde_json::from_str(json).unwrap();
        let room = Room::try_from(dto).unwrap();

        // then (期待する結果):
        assert!(room.members.is_empty());
        assert!(room.admins.is_empty());
        assert!(room.topics.is_empty());
        assert!(!room.is_private);
    }

    #[test]
    fn test_room_dto_empty_id_fails() {
        // テスト項目: 空の ID を持つ DTO は変換に失敗する
        // given (前提条件):
        let dto: RoomDto = serde_json::from_str(r#"{"id": "", "name": "Bad"}"#).unwrap();

        // when (操作):
        let result = Room::try_from(dto);

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::RoomIdEmpty);
    }

    #[test]
    fn test_error_response_detail_optional() {
        // テスト項目: detail が無いエラーボディもパースできる
        // when (操作):
        let with: ErrorResponse = serde_json::from_str(r#"{"detail": "nope"}"#).unwrap();
        let without: ErrorResponse = serde_json::from_str(r#"{}"#).unwrap();

        // then (期待する結果):
        assert_eq!(with.detail.as_deref(), Some("nope"));
        assert!(without.detail.is_none());
    }
}
