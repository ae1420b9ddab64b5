//! UseCase: チャット送信
//!
//! 送信メッセージは即座にローカルのログへ追記され、チャネル経由で
//! サーバーへ送られる。`@chatbot` を含むメッセージは `ai_request`
//! として送信される。送信に失敗した場合はログが元に戻る。

use std::sync::Arc;

use crate::{
    cache::RoomCache,
    channel::ChatChannel,
    domain::{ChatMessage, MessageText, TopicId},
    infrastructure::dto::websocket::ClientFrame,
    session::SessionStore,
    time,
    usecase::{UseCaseError, require_session},
};

/// Send a chat message over the open channel
pub struct SendChatUseCase {
    session: Arc<SessionStore>,
}

impl SendChatUseCase {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Validate, append locally and transmit.
    ///
    /// The local append happens before the transmit so the user sees
    /// their message immediately; a refused send rolls the log back.
    pub async fn execute(
        &self,
        cache: &mut RoomCache,
        channel: &ChatChannel,
        topic_id: &TopicId,
        text: &str,
    ) -> Result<(), UseCaseError> {
        let session = require_session(&self.session)?;
        let text = MessageText::new(text)?;

        let frame = if text.mentions_assistant() {
            ClientFrame::ai_request(text.as_str())
        } else {
            ClientFrame::chat(text.as_str())
        };

        let snapshot = cache.snapshot();
        let message = ChatMessage::local(text.as_str(), session.name, time::now_millis());
        cache.append_message(topic_id, message);

        if let Err(e) = channel.send(frame).await {
            cache.restore(snapshot);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ReconnectPolicy;
    use crate::session::Session;

    fn logged_in_store() -> Arc<SessionStore> {
        let store = SessionStore::new();
        store.login(Session {
            user_id: "u1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            token: "tok".to_string(),
        });
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_send_without_open_channel_rolls_back_log() {
        // テスト項目: チャネル未接続の送信失敗でログが元に戻る
        // given (前提条件): ログは初期化済み、チャネルは未接続
        let usecase = SendChatUseCase::new(logged_in_store());
        let mut cache = RoomCache::new();
        let topic_id = TopicId::new("topic-1").unwrap();
        cache.init_log(&topic_id, "General");
        let before = cache.snapshot();
        let (channel, _events) = ChatChannel::new("http://localhost:8000", ReconnectPolicy::default());

        // when (操作):
        let result = usecase
            .execute(&mut cache, &channel, &topic_id, "hello")
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(UseCaseError::Channel(_))));
        assert!(cache.matches(&before));
        assert_eq!(cache.log(&topic_id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_locally() {
        // テスト項目: 空白のみの本文はローカルで弾かれ、ログも変わらない
        // given (前提条件):
        let usecase = SendChatUseCase::new(logged_in_store());
        let mut cache = RoomCache::new();
        let topic_id = TopicId::new("topic-1").unwrap();
        cache.init_log(&topic_id, "General");
        let (channel, _events) = ChatChannel::new("http://localhost:8000", ReconnectPolicy::default());

        // when (操作):
        let result = usecase.execute(&mut cache, &channel, &topic_id, "   ").await;

        // then (期待する結果):
        assert!(matches!(result, Err(UseCaseError::Invalid(_))));
        assert_eq!(cache.log(&topic_id).unwrap().len(), 1);
    }
}
