//! Realtime chat channel over WebSocket.
//!
//! A [`ChatChannel`] is scoped to one room/topic pair. Opening a new
//! scope tears the previous connection down first, so at most one
//! connection exists per channel. Frames received from the server are
//! surfaced as [`ChannelEvent`]s on the receiver handed out at
//! construction; [`dispatch_frame`] turns them into cache updates and
//! user notices.

pub mod connection;
pub mod machine;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::{
    domain::{ChatMessage, RoomId, TopicId},
    infrastructure::dto::websocket::{ClientFrame, ServerFrame},
    notice::Notice,
};

pub use connection::ChannelEvent;
pub use machine::{ChannelMachine, ChannelState, CloseKind, CloseOutcome, ReconnectPolicy};

use connection::Command;

/// Fallback display name when a presence frame omits the user
const UNKNOWN_USER: &str = "A user";

/// Errors surfaced by channel operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// No auth token available; no connection was attempted
    #[error("authentication token not available")]
    AuthUnavailable,
    /// The channel is not open; nothing was transmitted
    #[error("not connected to chat")]
    NotOpen,
}

/// What [`dispatch_frame`] decided to do with an inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Append this message to the current topic's log
    Append(ChatMessage),
    /// Show a transient notice to the user
    Notify(Notice),
    /// Nothing to do (connection bookkeeping, keepalive, unknown)
    Ignore,
}

/// Map an inbound server frame to a cache/UI action.
///
/// Pure so frame handling is testable without a socket. `now` is the
/// timestamp attached to appended messages.
pub fn dispatch_frame(frame: ServerFrame, now: i64) -> Dispatch {
    match frame {
        ServerFrame::ChatMessage(data) => {
            let sender = data.user_name.unwrap_or_else(|| UNKNOWN_USER.to_string());
            Dispatch::Append(ChatMessage::remote(data.content, sender, now))
        }
        ServerFrame::UserJoined(data) => {
            let name = data.user_name.unwrap_or_else(|| UNKNOWN_USER.to_string());
            Dispatch::Notify(Notice::info(format!("{name} joined the chat")))
        }
        ServerFrame::UserLeft(data) => {
            let name = data.user_name.unwrap_or_else(|| UNKNOWN_USER.to_string());
            Dispatch::Notify(Notice::info(format!("{name} left the chat")))
        }
        ServerFrame::Error(data) => {
            let message = data
                .message
                .unwrap_or_else(|| "An error occurred".to_string());
            Dispatch::Notify(Notice::error(message))
        }
        ServerFrame::ConnectionEstablished | ServerFrame::Pong | ServerFrame::Unknown => {
            Dispatch::Ignore
        }
    }
}

struct ActiveConnection {
    room_id: RoomId,
    topic_id: TopicId,
    machine: Arc<Mutex<ChannelMachine>>,
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

/// Handle to the (at most one) realtime connection.
pub struct ChatChannel {
    ws_base: String,
    policy: ReconnectPolicy,
    events: mpsc::UnboundedSender<ChannelEvent>,
    active: Option<ActiveConnection>,
}

impl ChatChannel {
    /// Create a channel against the given HTTP API base URL.
    ///
    /// Returns the channel and the receiver on which connection events
    /// and inbound frames arrive.
    pub fn new(
        api_base_url: &str,
        policy: ReconnectPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let channel = Self {
            ws_base: websocket_base(api_base_url),
            policy,
            events,
            active: None,
        };
        (channel, events_rx)
    }

    /// Open the channel for a room/topic scope.
    ///
    /// The token must be non-empty; without it no connection is
    /// attempted and the previous scope (if any) stays untouched. An
    /// already-open channel is closed before the new scope connects.
    pub async fn open(
        &mut self,
        room_id: RoomId,
        topic_id: TopicId,
        token: &str,
    ) -> Result<(), ChannelError> {
        if token.is_empty() {
            return Err(ChannelError::AuthUnavailable);
        }
        self.close().await;

        let url = format!(
            "{}/api/chat/ws/{}/{}?token={}",
            self.ws_base,
            room_id,
            topic_id,
            urlencoding::encode(token),
        );
        tracing::debug!("Opening chat channel for room {} topic {}", room_id, topic_id);

        let machine = Arc::new(Mutex::new(ChannelMachine::new(self.policy.clone())));
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let task =
            connection::spawn_connection(url, machine.clone(), commands_rx, self.events.clone());
        self.active = Some(ActiveConnection {
            room_id,
            topic_id,
            machine,
            commands,
            task,
        });
        Ok(())
    }

    /// Send a frame over the open channel.
    ///
    /// Fails with [`ChannelError::NotOpen`] unless the connection is
    /// established; nothing is queued for later delivery.
    pub async fn send(&self, frame: ClientFrame) -> Result<(), ChannelError> {
        let active = self.active.as_ref().ok_or(ChannelError::NotOpen)?;
        if !active.machine.lock().await.is_open() {
            return Err(ChannelError::NotOpen);
        }
        active
            .commands
            .send(Command::Send(frame))
            .map_err(|_| ChannelError::NotOpen)
    }

    /// Close the channel. Idempotent; cancels any pending reconnect
    /// timer and waits for the driver task to finish.
    pub async fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let _ = active.commands.send(Command::Shutdown);
        active.machine.lock().await.close_requested();
        let mut task = active.task;
        if tokio::time::timeout(Duration::from_secs(5), &mut task)
            .await
            .is_err()
        {
            tracing::warn!("Channel driver did not stop in time, aborting");
            task.abort();
        }
    }

    /// Current connection state, `Closed` when no scope is open
    pub async fn state(&self) -> ChannelState {
        match &self.active {
            Some(active) => active.machine.lock().await.state(),
            None => ChannelState::Closed,
        }
    }

    /// The room/topic pair the channel is currently scoped to
    pub fn scope(&self) -> Option<(&RoomId, &TopicId)> {
        self.active
            .as_ref()
            .map(|active| (&active.room_id, &active.topic_id))
    }
}

/// Derive the WebSocket base URL from the HTTP API base URL
fn websocket_base(api_base_url: &str) -> String {
    let trimmed = api_base_url.trim_end_matches('/');
    if trimmed.starts_with("http") {
        trimmed.replacen("http", "ws", 1)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::dto::websocket::{ChatMessageData, ErrorData, PresenceData};
    use crate::notice::NoticeLevel;

    #[test]
    fn test_websocket_base_rewrites_scheme() {
        // テスト項目: http/https の API URL から ws/wss の URL を導出する
        assert_eq!(
            websocket_base("http://localhost:8000/"),
            "ws://localhost:8000"
        );
        assert_eq!(
            websocket_base("https://api.example.com"),
            "wss://api.example.com"
        );
    }

    #[test]
    fn test_dispatch_chat_message_appends_remote() {
        // テスト項目: chat_message フレームはリモートメッセージとして追記される
        // given (前提条件):
        let frame = ServerFrame::ChatMessage(ChatMessageData {
            content: "hi there".to_string(),
            user_name: Some("Bob".to_string()),
        });

        // when (操作):
        let dispatch = dispatch_frame(frame, 1_000);

        // then (期待する結果):
        match dispatch {
            Dispatch::Append(msg) => {
                assert_eq!(msg.text, "hi there");
                assert_eq!(msg.sender, "Bob");
                assert!(!msg.is_user);
                assert_eq!(msg.timestamp, 1_000);
            }
            other => panic!("expected Append, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_presence_frames_notify() {
        // テスト項目: user_joined / user_left は通知になる
        // given (前提条件):
        let joined = ServerFrame::UserJoined(PresenceData {
            user_name: Some("Alice".to_string()),
        });
        let left = ServerFrame::UserLeft(PresenceData { user_name: None });

        // when (操作):
        let joined = dispatch_frame(joined, 0);
        let left = dispatch_frame(left, 0);

        // then (期待する結果):
        assert_eq!(
            joined,
            Dispatch::Notify(Notice::info("Alice joined the chat"))
        );
        assert_eq!(left, Dispatch::Notify(Notice::info("A user left the chat")));
    }

    #[test]
    fn test_dispatch_error_frame_notifies_error() {
        // テスト項目: error フレームはエラー通知になる
        // given (前提条件):
        let frame = ServerFrame::Error(ErrorData {
            message: Some("room is full".to_string()),
        });

        // when (操作):
        let dispatch = dispatch_frame(frame, 0);

        // then (期待する結果):
        match dispatch {
            Dispatch::Notify(notice) => {
                assert_eq!(notice.level, NoticeLevel::Error);
                assert_eq!(notice.text, "room is full");
            }
            other => panic!("expected Notify, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_bookkeeping_frames_ignored() {
        // テスト項目: connection_established / pong / 未知の type は無視される
        assert_eq!(
            dispatch_frame(ServerFrame::ConnectionEstablished, 0),
            Dispatch::Ignore
        );
        assert_eq!(dispatch_frame(ServerFrame::Pong, 0), Dispatch::Ignore);
        assert_eq!(dispatch_frame(ServerFrame::Unknown, 0), Dispatch::Ignore);
    }

    #[tokio::test]
    async fn test_open_with_empty_token_fails_without_connecting() {
        // テスト項目: トークンが空のとき open は即座に失敗し、接続を作らない
        // given (前提条件):
        let (mut channel, _events) = ChatChannel::new("http://localhost:8000", ReconnectPolicy::default());

        // when (操作):
        let result = channel
            .open(
                RoomId::new("room-1").unwrap(),
                TopicId::new("topic-1").unwrap(),
                "",
            )
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ChannelError::AuthUnavailable);
        assert!(channel.scope().is_none());
        assert_eq!(channel.state().await, ChannelState::Closed);
    }

    #[tokio::test]
    async fn test_send_without_open_channel_fails() {
        // テスト項目: 未接続の send は NotOpen で失敗する
        // given (前提条件):
        let (channel, _events) = ChatChannel::new("http://localhost:8000", ReconnectPolicy::default());

        // when (操作):
        let result = channel.send(ClientFrame::chat("hello")).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ChannelError::NotOpen);
    }

    #[tokio::test]
    async fn test_close_without_open_channel_is_noop() {
        // テスト項目: 未接続でも close は安全に呼べる
        // given (前提条件):
        let (mut channel, _events) = ChatChannel::new("http://localhost:8000", ReconnectPolicy::default());

        // when (操作):
        channel.close().await;
        channel.close().await;

        // then (期待する結果):
        assert_eq!(channel.state().await, ChannelState::Closed);
    }
}
