//! WebSocket frame DTOs for the realtime chat channel.
//!
//! Inbound frames are `{"type": ..., "data": {...}}`; outbound frames are
//! flat `{"type": "chat"|"ai_request", "content": ...}`. Unrecognized
//! inbound types must stay non-fatal, so parsing goes through an untyped
//! envelope first and only then into the typed payloads.

use serde::{Deserialize, Serialize};

/// Untyped inbound envelope: the `type` discriminant plus raw payload
#[derive(Debug, Deserialize)]
struct RawServerFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Payload of a `chat_message` frame
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatMessageData {
    pub content: String,
    pub user_name: Option<String>,
}

/// Payload of `user_joined` / `user_left` frames
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresenceData {
    pub user_name: Option<String>,
}

/// Payload of an `error` frame
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorData {
    pub message: Option<String>,
}

/// A parsed inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// Telemetry-only acknowledgment sent right after connecting
    ConnectionEstablished,
    /// A chat message from another participant
    ChatMessage(ChatMessageData),
    /// A participant joined the topic chat
    UserJoined(PresenceData),
    /// A participant left the topic chat
    UserLeft(PresenceData),
    /// A server-side error report
    Error(ErrorData),
    /// Keepalive acknowledgment
    Pong,
    /// Forward-compatibility: an unrecognized `type`, to be ignored
    Unknown,
}

impl ServerFrame {
    /// Parse an inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` when the frame is not valid JSON or a
    /// known type carries a malformed payload; callers drop such frames.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let raw: RawServerFrame = serde_json::from_str(text)?;
        let frame = match raw.kind.as_str() {
            "connection_established" => Self::ConnectionEstablished,
            "chat_message" => Self::ChatMessage(serde_json::from_value(raw.data)?),
            "user_joined" => Self::UserJoined(serde_json::from_value(raw.data)?),
            "user_left" => Self::UserLeft(serde_json::from_value(raw.data)?),
            "error" => Self::Error(serde_json::from_value(raw.data)?),
            "pong" => Self::Pong,
            _ => Self::Unknown,
        };
        Ok(frame)
    }
}

/// An outbound frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// A plain chat message broadcast to the topic
    Chat { content: String },
    /// A message addressed to the AI assistant
    AiRequest { content: String },
}

impl ClientFrame {
    pub fn chat(content: impl Into<String>) -> Self {
        Self::Chat {
            content: content.into(),
        }
    }

    pub fn ai_request(content: impl Into<String>) -> Self {
        Self::AiRequest {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Chat { content } | Self::AiRequest { content } => content,
        }
    }
}
