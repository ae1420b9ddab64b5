//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Prefix carried by identifiers created locally for optimistic inserts,
/// before the server has assigned an authoritative id.
const TEMP_ID_PREFIX: &str = "temp-";

/// Room identifier value object.
///
/// Represents a unique identifier for a room. Identifiers created by
/// [`RoomId::temporary`] are placeholders that are replaced with the
/// server-assigned id once a create request succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// Create a new RoomId.
    ///
    /// # Arguments
    ///
    /// * `id` - The room identifier string
    ///
    /// # Returns
    ///
    /// A Result containing the RoomId or an error if validation fails
    pub fn new(id: impl Into<String>) -> Result<Self, ValueObjectError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        let len = id.len();
        if len > 100 {
            return Err(ValueObjectError::RoomIdTooLong {
                max: 100,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    /// Generate a temporary RoomId for an optimistic insert.
    pub fn temporary() -> Self {
        Self(format!("{}{}", TEMP_ID_PREFIX, uuid::Uuid::new_v4()))
    }

    /// Whether this id is a local placeholder awaiting the server-assigned id.
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Topic identifier value object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicId(String);

impl TopicId {
    /// Create a new TopicId.
    ///
    /// # Arguments
    ///
    /// * `id` - The topic identifier string
    ///
    /// # Returns
    ///
    /// A Result containing the TopicId or an error if validation fails
    pub fn new(id: impl Into<String>) -> Result<Self, ValueObjectError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValueObjectError::TopicIdEmpty);
        }
        let len = id.len();
        if len > 100 {
            return Err(ValueObjectError::TopicIdTooLong {
                max: 100,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    /// Generate a temporary TopicId for an optimistic insert.
    pub fn temporary() -> Self {
        Self(format!("{}{}", TEMP_ID_PREFIX, uuid::Uuid::new_v4()))
    }

    /// Whether this id is a local placeholder awaiting the server-assigned id.
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat message text value object.
///
/// Represents the text of an outbound chat message with validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    /// Create a new MessageText.
    ///
    /// # Arguments
    ///
    /// * `text` - The message text
    ///
    /// # Returns
    ///
    /// A Result containing the MessageText or an error if validation fails
    pub fn new(text: impl Into<String>) -> Result<Self, ValueObjectError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValueObjectError::MessageTextEmpty);
        }
        let len = text.len();
        if len > 4000 {
            return Err(ValueObjectError::MessageTextTooLong {
                max: 4000,
                actual: len,
            });
        }
        Ok(Self(text))
    }

    /// Whether the text mentions the AI assistant and should be routed
    /// as an `ai_request` rather than a plain chat message.
    pub fn mentions_assistant(&self) -> bool {
        self.0.to_lowercase().contains("@chatbot")
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_new_success() {
        // テスト項目: 有効なルーム ID を作成できる
        // given (前提条件):
        let id = "room-1".to_string();

        // when (操作):
        let result = RoomId::new(id);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "room-1");
    }

    #[test]
    fn test_room_id_new_empty_fails() {
        // テスト項目: 空のルーム ID は作成できない
        // when (操作):
        let result = RoomId::new("".to_string());

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::RoomIdEmpty);
    }

    #[test]
    fn test_room_id_new_too_long_fails() {
        // テスト項目: 101 文字以上のルーム ID は作成できない
        // given (前提条件):
        let id = "a".repeat(101);

        // when (操作):
        let result = RoomId::new(id);

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::RoomIdTooLong {
                max: 100,
                actual: 101
            }
        );
    }

    #[test]
    fn test_room_id_temporary_is_temporary() {
        // テスト項目: temporary() で生成した ID は is_temporary() が true になる
        // when (操作):
        let id = RoomId::temporary();

        // then (期待する結果):
        assert!(id.is_temporary());
        assert!(!RoomId::new("room-1".to_string()).unwrap().is_temporary());
    }

    #[test]
    fn test_room_id_temporary_uniqueness() {
        // テスト項目: temporary() は毎回異なる ID を生成する
        // when (操作):
        let id1 = RoomId::temporary();
        let id2 = RoomId::temporary();

        // then (期待する結果):
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_topic_id_new_empty_fails() {
        // テスト項目: 空のトピック ID は作成できない
        // when (操作):
        let result = TopicId::new("".to_string());

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::TopicIdEmpty);
    }

    #[test]
    fn test_message_text_new_success() {
        // テスト項目: 有効なメッセージ本文を作成できる
        // when (操作):
        let result = MessageText::new("Hello, world!".to_string());

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "Hello, world!");
    }

    #[test]
    fn test_message_text_blank_fails() {
        // テスト項目: 空白のみのメッセージ本文は作成できない
        // when (操作):
        let result = MessageText::new("   ".to_string());

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::MessageTextEmpty);
    }

    #[test]
    fn test_message_text_too_long_fails() {
        // テスト項目: 4001 文字以上のメッセージ本文は作成できない
        // given (前提条件):
        let text = "a".repeat(4001);

        // when (操作):
        let result = MessageText::new(text);

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::MessageTextTooLong {
                max: 4000,
                actual: 4001
            }
        );
    }

    #[test]
    fn test_message_text_mentions_assistant() {
        // テスト項目: @chatbot を含む本文は AI リクエストとして判定される
        // given (前提条件):
        let plain = MessageText::new("hello everyone".to_string()).unwrap();
        let mention = MessageText::new("hey @ChatBot what is Rust?".to_string()).unwrap();

        // then (期待する結果):
        assert!(!plain.mentions_assistant());
        assert!(mention.mentions_assistant());
    }
}
