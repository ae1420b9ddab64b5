//! UseCase: ルームに対する操作（作成・参加・退出・削除・メンバー管理）
//!
//! すべての変更系操作は楽観的更新プロトコルに従う。権限不足は
//! リクエストを送る前にクライアント側でブロックされる。

use std::sync::Arc;

use crate::{
    cache::RoomCache,
    domain::{Member, Room, RoomError, RoomId},
    infrastructure::RoomApi,
    session::SessionStore,
    usecase::{UseCaseError, optimistic, require_session},
};

/// Notice shown when a sole admin tries to leave
const SOLE_ADMIN_LEAVE: &str =
    "You are the only admin of this room. Promote another member before leaving.";

/// Room mutations: create, join, leave, delete and member management
pub struct RoomActionsUseCase {
    api: Arc<dyn RoomApi>,
    session: Arc<SessionStore>,
}

impl RoomActionsUseCase {
    pub fn new(api: Arc<dyn RoomApi>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Create a room with the current user as its first admin.
    ///
    /// The room appears in the cache immediately under a temporary id;
    /// the server-assigned id replaces it on success.
    pub async fn create(
        &self,
        cache: &mut RoomCache,
        name: &str,
        password: &str,
    ) -> Result<RoomId, UseCaseError> {
        let session = require_session(&self.session)?;
        let temp_id = RoomId::temporary();
        let creator = Member::new(session.user_id, session.name, session.email);
        let placeholder = Room::new(temp_id.clone(), name, !password.is_empty(), creator);

        let api = self.api.clone();
        let name = name.to_string();
        let password = password.to_string();
        let real_id = optimistic(
            cache,
            |c| c.insert_room(placeholder),
            async move { api.create_room(&name, &password).await },
        )
        .await?;

        cache.replace_room_id(&temp_id, real_id.clone());
        tracing::info!("Created room {}", real_id);
        Ok(real_id)
    }

    /// Join a room by id. The room list is re-synced by the caller
    /// afterwards since the server owns the room's contents.
    pub async fn join(
        &self,
        cache: &mut RoomCache,
        room_id: &RoomId,
        password: &str,
    ) -> Result<(), UseCaseError> {
        require_session(&self.session)?;
        let api = self.api.clone();
        let room_id = room_id.clone();
        let password = password.to_string();
        optimistic(cache, |_| {}, async move {
            api.join_room(&room_id, &password).await
        })
        .await
    }

    /// Leave a room. Blocked client-side when the user is the room's
    /// only admin; no request is sent in that case.
    pub async fn leave(&self, cache: &mut RoomCache, room_id: &RoomId) -> Result<(), UseCaseError> {
        let session = require_session(&self.session)?;
        let room = cache
            .room(room_id)
            .ok_or_else(|| UseCaseError::UnknownRoom(room_id.to_string()))?;
        if room.is_sole_admin(&session.email) {
            return Err(UseCaseError::Blocked(SOLE_ADMIN_LEAVE.to_string()));
        }

        let api = self.api.clone();
        let id = room_id.clone();
        optimistic(
            cache,
            |c| {
                c.drop_room_logs(room_id);
                c.remove_room(room_id);
            },
            async move { api.leave_room(&id).await },
        )
        .await?;

        if cache.selected_room() == Some(room_id) {
            cache.clear_selection();
        }
        Ok(())
    }

    /// Delete a room. Admin only, checked client-side.
    pub async fn delete(
        &self,
        cache: &mut RoomCache,
        room_id: &RoomId,
    ) -> Result<(), UseCaseError> {
        let session = require_session(&self.session)?;
        self.require_admin(cache, room_id, &session.email)?;

        let api = self.api.clone();
        let id = room_id.clone();
        optimistic(
            cache,
            |c| {
                c.drop_room_logs(room_id);
                c.remove_room(room_id);
            },
            async move { api.delete_room(&id).await },
        )
        .await?;

        if cache.selected_room() == Some(room_id) {
            cache.clear_selection();
        }
        Ok(())
    }

    /// Reveal the room password so it can be shared for joins.
    /// Admin only, checked client-side.
    pub async fn reveal_password(
        &self,
        cache: &RoomCache,
        room_id: &RoomId,
    ) -> Result<String, UseCaseError> {
        let session = require_session(&self.session)?;
        self.require_admin(cache, room_id, &session.email)?;
        Ok(self.api.reveal_password(room_id).await?)
    }

    /// Promote a member to admin. Caller must be an admin.
    pub async fn make_admin(
        &self,
        cache: &mut RoomCache,
        room_id: &RoomId,
        user_email: &str,
    ) -> Result<(), UseCaseError> {
        let session = require_session(&self.session)?;
        let room = self.require_admin(cache, room_id, &session.email)?;
        if room.is_admin(user_email) {
            return Err(RoomError::AlreadyAdmin(user_email.to_string()).into());
        }
        if !room.is_member(user_email) {
            return Err(RoomError::NotAMember(user_email.to_string()).into());
        }

        let api = self.api.clone();
        let id = room_id.clone();
        let email = user_email.to_string();
        optimistic(
            cache,
            |c| {
                if let Some(room) = c.room_mut(room_id) {
                    let _ = room.promote(user_email);
                }
            },
            async move { api.make_admin(&id, &email).await },
        )
        .await
    }

    /// Remove a member from the room. Caller must be an admin; admins
    /// cannot be removed (they leave on their own).
    pub async fn remove_user(
        &self,
        cache: &mut RoomCache,
        room_id: &RoomId,
        user_email: &str,
    ) -> Result<(), UseCaseError> {
        let session = require_session(&self.session)?;
        let room = self.require_admin(cache, room_id, &session.email)?;
        if room.is_admin(user_email) {
            return Err(UseCaseError::Blocked(
                "Admins cannot be removed from the room".to_string(),
            ));
        }
        if !room.is_member(user_email) {
            return Err(RoomError::NotAMember(user_email.to_string()).into());
        }

        let api = self.api.clone();
        let id = room_id.clone();
        let email = user_email.to_string();
        optimistic(
            cache,
            |c| {
                if let Some(room) = c.room_mut(room_id) {
                    let _ = room.remove_user(user_email);
                }
            },
            async move { api.remove_user(&id, &email).await },
        )
        .await
    }

    /// Look the room up and check the caller is one of its admins
    fn require_admin<'c>(
        &self,
        cache: &'c RoomCache,
        room_id: &RoomId,
        email: &str,
    ) -> Result<&'c Room, UseCaseError> {
        let room = cache
            .room(room_id)
            .ok_or_else(|| UseCaseError::UnknownRoom(room_id.to_string()))?;
        if !room.is_admin(email) {
            return Err(RoomError::AdminRequired.into());
        }
        Ok(room)
    }
}
