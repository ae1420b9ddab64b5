//! UseCase: トピックに対する操作（作成・削除・チャット履歴の削除）
//!
//! トピック削除はルーム管理者または作成者のみ、チャット履歴の削除は
//! 管理者のみ。どちらもクライアント側で先にチェックされる。

use std::sync::Arc;

use crate::{
    cache::RoomCache,
    domain::{RoomError, RoomId, Topic, TopicId},
    infrastructure::RoomApi,
    session::SessionStore,
    time,
    usecase::{UseCaseError, optimistic, require_session},
};

/// Topic mutations: create, delete, clear chat history
pub struct TopicActionsUseCase {
    api: Arc<dyn RoomApi>,
    session: Arc<SessionStore>,
}

impl TopicActionsUseCase {
    pub fn new(api: Arc<dyn RoomApi>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Create a topic in the room.
    ///
    /// The topic appears in the cache immediately under a temporary id;
    /// the server-assigned id replaces it (carrying the log) on success.
    pub async fn create(
        &self,
        cache: &mut RoomCache,
        room_id: &RoomId,
        title: &str,
        description: &str,
    ) -> Result<TopicId, UseCaseError> {
        let session = require_session(&self.session)?;
        if cache.room(room_id).is_none() {
            return Err(UseCaseError::UnknownRoom(room_id.to_string()));
        }

        let temp_id = TopicId::temporary();
        let placeholder = Topic::new(
            temp_id.clone(),
            title,
            description,
            session.name,
            time::now_millis(),
        );

        let api = self.api.clone();
        let id = room_id.clone();
        let title_owned = title.to_string();
        let description_owned = description.to_string();
        let real_id = optimistic(
            cache,
            |c| {
                if let Some(room) = c.room_mut(room_id) {
                    room.add_topic(placeholder);
                }
            },
            async move {
                api.create_topic(&id, &title_owned, &description_owned)
                    .await
            },
        )
        .await?;

        cache.replace_topic_id(room_id, &temp_id, real_id.clone());
        tracing::info!("Created topic {} in room {}", real_id, room_id);
        Ok(real_id)
    }

    /// Delete a topic. Allowed for room admins and the topic's creator,
    /// checked client-side.
    pub async fn delete(
        &self,
        cache: &mut RoomCache,
        room_id: &RoomId,
        topic_id: &TopicId,
    ) -> Result<(), UseCaseError> {
        let session = require_session(&self.session)?;
        let room = cache
            .room(room_id)
            .ok_or_else(|| UseCaseError::UnknownRoom(room_id.to_string()))?;
        let topic = room
            .topic(topic_id)
            .ok_or_else(|| UseCaseError::UnknownTopic(topic_id.to_string()))?;
        if !room.is_admin(&session.email) && topic.created_by != session.name {
            return Err(UseCaseError::Blocked(
                "Only room admins or the topic creator can delete a topic".to_string(),
            ));
        }

        let api = self.api.clone();
        let id = topic_id.clone();
        optimistic(
            cache,
            |c| {
                c.drop_log(topic_id);
                if let Some(room) = c.room_mut(room_id) {
                    room.remove_topic(topic_id);
                }
            },
            async move { api.delete_topic(&id).await },
        )
        .await?;

        if cache.selected_topic() == Some(topic_id) {
            cache.clear_topic_selection();
        }
        Ok(())
    }

    /// Clear a topic's chat history. Admin only, checked client-side.
    /// The local log resets to just the welcome message.
    pub async fn delete_chat(
        &self,
        cache: &mut RoomCache,
        room_id: &RoomId,
        topic_id: &TopicId,
    ) -> Result<(), UseCaseError> {
        let session = require_session(&self.session)?;
        let room = cache
            .room(room_id)
            .ok_or_else(|| UseCaseError::UnknownRoom(room_id.to_string()))?;
        let topic = room
            .topic(topic_id)
            .ok_or_else(|| UseCaseError::UnknownTopic(topic_id.to_string()))?;
        if !room.is_admin(&session.email) {
            return Err(RoomError::AdminRequired.into());
        }
        let title = topic.title.clone();

        let api = self.api.clone();
        let rid = room_id.clone();
        let tid = topic_id.clone();
        optimistic(
            cache,
            |c| c.reset_log(topic_id, &title),
            async move { api.delete_chat(&rid, &tid).await },
        )
        .await
    }
}
