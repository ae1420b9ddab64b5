//! UseCase: 取得系の処理（ルーム一覧の同期、トピック一覧の取得）
//!
//! どちらも読み取りなので楽観的更新は使わず、結果で丸ごと置き換える。
//! トピック一覧はフェッチ中に選択が変わっていた場合に破棄される。

use std::sync::Arc;

use crate::{
    cache::RoomCache,
    domain::RoomId,
    infrastructure::RoomApi,
    usecase::UseCaseError,
};

/// Refresh the room list from the server
pub struct SyncRoomsUseCase {
    api: Arc<dyn RoomApi>,
}

impl SyncRoomsUseCase {
    pub fn new(api: Arc<dyn RoomApi>) -> Self {
        Self { api }
    }

    /// Fetch the user's rooms and replace the cached list wholesale.
    ///
    /// # Returns
    ///
    /// The number of rooms now in the cache.
    pub async fn execute(&self, cache: &mut RoomCache) -> Result<usize, UseCaseError> {
        let rooms = self.api.list_my_rooms().await?;
        let count = rooms.len();
        cache.replace_rooms(rooms);
        tracing::debug!("Synced {} rooms", count);
        Ok(count)
    }
}

/// Fetch the topic list for one room
pub struct FetchTopicsUseCase {
    api: Arc<dyn RoomApi>,
}

impl FetchTopicsUseCase {
    pub fn new(api: Arc<dyn RoomApi>) -> Self {
        Self { api }
    }

    /// Fetch topics for the room and replace the cached list.
    ///
    /// # Returns
    ///
    /// `true` when the result was applied; `false` when it was dropped
    /// because the selection moved to another room in the meantime.
    pub async fn execute(
        &self,
        cache: &mut RoomCache,
        room_id: &RoomId,
    ) -> Result<bool, UseCaseError> {
        let topics = self.api.list_topics(room_id).await?;
        Ok(cache.replace_topics(room_id, topics))
    }
}
