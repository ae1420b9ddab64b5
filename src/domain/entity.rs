//! Core domain models for the room/topic client.

use serde::{Deserialize, Serialize};

use super::{
    error::RoomError,
    value_object::{RoomId, TopicId},
};

/// Sender name used for locally generated assistant/system messages
pub const ASSISTANT_SENDER: &str = "AI";

/// A user that belongs to a room, either as a plain member or an admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// User identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address, used as the membership key
    pub email: String,
}

impl Member {
    /// Create a new member
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A discussion topic owned by exactly one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic identifier
    pub id: TopicId,
    /// Topic title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Display name of the user who created the topic
    pub created_by: String,
    /// Creation timestamp (Unix milliseconds, UTC)
    pub created_at: i64,
}

impl Topic {
    /// Create a new topic
    pub fn new(
        id: TopicId,
        title: impl Into<String>,
        description: impl Into<String>,
        created_by: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            created_by: created_by.into(),
            created_at,
        }
    }
}

/// A room the user belongs to, with its members, admins and topics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Room name
    pub name: String,
    /// Whether joining requires a password
    pub is_private: bool,
    /// Plain members (admins are tracked separately)
    pub members: Vec<Member>,
    /// Room admins. Every admin is implicitly also a member for
    /// permission checks.
    pub admins: Vec<Member>,
    /// Topics in display order
    pub topics: Vec<Topic>,
}

impl Room {
    /// Create a new room with no members beyond the given admin
    pub fn new(id: RoomId, name: impl Into<String>, is_private: bool, creator: Member) -> Self {
        Self {
            id,
            name: name.into(),
            is_private,
            members: Vec::new(),
            admins: vec![creator],
            topics: Vec::new(),
        }
    }

    /// Whether the user with this email is an admin of the room
    pub fn is_admin(&self, email: &str) -> bool {
        self.admins.iter().any(|a| a.email == email)
    }

    /// Whether the user with this email belongs to the room.
    /// Admins count as members.
    pub fn is_member(&self, email: &str) -> bool {
        self.is_admin(email) || self.members.iter().any(|m| m.email == email)
    }

    /// Whether the user with this email is the only admin of the room
    pub fn is_sole_admin(&self, email: &str) -> bool {
        self.admins.len() == 1 && self.admins[0].email == email
    }

    /// Total number of users in the room (members + admins)
    pub fn member_count(&self) -> usize {
        self.members.len() + self.admins.len()
    }

    /// Promote a plain member to admin
    ///
    /// # Errors
    ///
    /// Returns `RoomError::AlreadyAdmin` if the user already is one, or
    /// `RoomError::NotAMember` if no member with this email exists.
    pub fn promote(&mut self, email: &str) -> Result<(), RoomError> {
        if self.is_admin(email) {
            return Err(RoomError::AlreadyAdmin(email.to_string()));
        }
        let pos = self
            .members
            .iter()
            .position(|m| m.email == email)
            .ok_or_else(|| RoomError::NotAMember(email.to_string()))?;
        let member = self.members.remove(pos);
        self.admins.push(member);
        Ok(())
    }

    /// Remove a user from the room, whether member or admin
    ///
    /// # Errors
    ///
    /// Returns `RoomError::NotAMember` if no user with this email belongs
    /// to the room.
    pub fn remove_user(&mut self, email: &str) -> Result<(), RoomError> {
        if !self.is_member(email) {
            return Err(RoomError::NotAMember(email.to_string()));
        }
        self.members.retain(|m| m.email != email);
        self.admins.retain(|a| a.email != email);
        Ok(())
    }

    /// Get a topic by id
    pub fn topic(&self, topic_id: &TopicId) -> Option<&Topic> {
        self.topics.iter().find(|t| &t.id == topic_id)
    }

    /// Append a topic to the room
    pub fn add_topic(&mut self, topic: Topic) {
        self.topics.push(topic);
    }

    /// Remove a topic by id
    pub fn remove_topic(&mut self, topic_id: &TopicId) {
        self.topics.retain(|t| &t.id != topic_id);
    }
}

/// A chat message held in a per-topic log.
///
/// Ephemeral client-side state only; the log is append-only and
/// insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Local message identifier
    pub id: String,
    /// Message text
    pub text: String,
    /// Whether the local user sent this message
    pub is_user: bool,
    /// Display name of the sender
    pub sender: String,
    /// Receive/send timestamp (Unix milliseconds, UTC)
    pub timestamp: i64,
}

impl ChatMessage {
    /// Create a message sent by the local user
    pub fn local(text: impl Into<String>, sender: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            is_user: true,
            sender: sender.into(),
            timestamp,
        }
    }

    /// Create a message received from another participant
    pub fn remote(text: impl Into<String>, sender: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            is_user: false,
            sender: sender.into(),
            timestamp,
        }
    }

    /// Create the welcome message seeded when a topic log is first opened
    pub fn welcome(topic_title: &str, timestamp: i64) -> Self {
        Self::remote(
            format!("Welcome to the topic: {topic_title}!"),
            ASSISTANT_SENDER,
            timestamp,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Member {
        Member::new("u1", "Alice", "alice@example.com")
    }

    fn bob() -> Member {
        Member::new("u2", "Bob", "bob@example.com")
    }

    fn test_room() -> Room {
        let mut room = Room::new(
            RoomId::new("room-1".to_string()).unwrap(),
            "Study Group",
            true,
            alice(),
        );
        room.members.push(bob());
        room
    }

    #[test]
    fn test_room_admin_is_also_member() {
        // テスト項目: admin は権限チェック上 member としても扱われる
        // given (前提条件):
        let room = test_room();

        // then (期待する結果):
        assert!(room.is_admin("alice@example.com"));
        assert!(room.is_member("alice@example.com"));
        assert!(room.is_member("bob@example.com"));
        assert!(!room.is_admin("bob@example.com"));
        assert!(!room.is_member("carol@example.com"));
    }

    #[test]
    fn test_room_sole_admin() {
        // テスト項目: 唯一の admin かどうかを判定できる
        // given (前提条件):
        let mut room = test_room();

        // then (期待する結果):
        assert!(room.is_sole_admin("alice@example.com"));
        assert!(!room.is_sole_admin("bob@example.com"));

        // when (操作): bob を admin に昇格すると alice は唯一の admin ではなくなる
        room.promote("bob@example.com").unwrap();
        assert!(!room.is_sole_admin("alice@example.com"));
    }

    #[test]
    fn test_room_promote_moves_member_to_admins() {
        // テスト項目: 昇格でメンバーが admins に移動する
        // given (前提条件):
        let mut room = test_room();
        assert_eq!(room.member_count(), 2);

        // when (操作):
        let result = room.promote("bob@example.com");

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(room.is_admin("bob@example.com"));
        assert!(room.members.is_empty());
        assert_eq!(room.member_count(), 2);
    }

    #[test]
    fn test_room_promote_already_admin_fails() {
        // テスト項目: 既に admin のユーザーは昇格できない
        // given (前提条件):
        let mut room = test_room();

        // when (操作):
        let result = room.promote("alice@example.com");

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            RoomError::AlreadyAdmin("alice@example.com".to_string())
        );
    }

    #[test]
    fn test_room_promote_nonmember_fails() {
        // テスト項目: メンバーでないユーザーは昇格できない
        // given (前提条件):
        let mut room = test_room();

        // when (操作):
        let result = room.promote("carol@example.com");

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            RoomError::NotAMember("carol@example.com".to_string())
        );
    }

    #[test]
    fn test_room_remove_user() {
        // テスト項目: メンバーを削除できる
        // given (前提条件):
        let mut room = test_room();

        // when (操作):
        let result = room.remove_user("bob@example.com");

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(!room.is_member("bob@example.com"));
        assert_eq!(room.member_count(), 1);
    }

    #[test]
    fn test_room_remove_nonmember_fails() {
        // テスト項目: 存在しないユーザーの削除はエラーになる
        // given (前提条件):
        let mut room = test_room();

        // when (操作):
        let result = room.remove_user("carol@example.com");

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            RoomError::NotAMember("carol@example.com".to_string())
        );
    }

    #[test]
    fn test_room_add_and_remove_topic() {
        // テスト項目: トピックの追加と削除が反映される
        // given (前提条件):
        let mut room = test_room();
        let topic_id = TopicId::new("topic-1".to_string()).unwrap();
        let topic = Topic::new(topic_id.clone(), "General", "anything goes", "Alice", 1000);

        // when (操作):
        room.add_topic(topic.clone());

        // then (期待する結果):
        assert_eq!(room.topics.len(), 1);
        assert_eq!(room.topic(&topic_id), Some(&topic));

        // when (操作):
        room.remove_topic(&topic_id);

        // then (期待する結果):
        assert!(room.topics.is_empty());
        assert_eq!(room.topic(&topic_id), None);
    }

    #[test]
    fn test_chat_message_local_and_remote_flags() {
        // テスト項目: local/remote コンストラクタが is_user フラグを正しく設定する
        // when (操作):
        let local = ChatMessage::local("hello", "Alice", 1000);
        let remote = ChatMessage::remote("hi", "Bob", 2000);

        // then (期待する結果):
        assert!(local.is_user);
        assert_eq!(local.sender, "Alice");
        assert!(!remote.is_user);
        assert_eq!(remote.sender, "Bob");
        assert_ne!(local.id, remote.id);
    }

    #[test]
    fn test_chat_message_welcome() {
        // テスト項目: welcome メッセージはアシスタント発でトピック名を含む
        // when (操作):
        let msg = ChatMessage::welcome("General", 1000);

        // then (期待する結果):
        assert!(!msg.is_user);
        assert_eq!(msg.sender, ASSISTANT_SENDER);
        assert!(msg.text.contains("General"));
    }
}
