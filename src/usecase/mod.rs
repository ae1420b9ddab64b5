//! UseCase layer: the operations the UI invokes.
//!
//! Every mutating operation follows the optimistic protocol: snapshot
//! the cache, apply the local edit, dispatch the request, and either
//! reconcile server-assigned ids on success or restore the snapshot on
//! failure. UseCases depend on the [`RoomApi`](crate::infrastructure::RoomApi)
//! trait, never on reqwest directly.

pub mod room_actions;
pub mod send_chat;
pub mod sync_rooms;
pub mod topic_actions;

pub use room_actions::RoomActionsUseCase;
pub use send_chat::SendChatUseCase;
pub use sync_rooms::{FetchTopicsUseCase, SyncRoomsUseCase};
pub use topic_actions::TopicActionsUseCase;

use std::future::Future;

use thiserror::Error;

use crate::{
    cache::RoomCache,
    channel::ChannelError,
    domain::{RoomError, ValueObjectError},
    infrastructure::ApiError,
    session::{Session, SessionStore},
};

/// Errors surfaced by UseCase execution. All map onto notices in the
/// UI; none are fatal.
#[derive(Debug, Error)]
pub enum UseCaseError {
    /// Not logged in; the operation was never started
    #[error("not logged in")]
    NotLoggedIn,

    /// Blocked by a client-side authorization guard; no request sent
    #[error("{0}")]
    Blocked(String),

    /// The room is not in the cache (no request sent)
    #[error("unknown room: {0}")]
    UnknownRoom(String),

    /// The topic is not in the cache (no request sent)
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// The API rejected or never received the request; the cache was
    /// rolled back
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The chat channel refused the send; the cache was rolled back
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// A domain rule failed locally (no request sent)
    #[error(transparent)]
    Domain(#[from] RoomError),

    /// Input failed value-object validation (no request sent)
    #[error(transparent)]
    Invalid(#[from] ValueObjectError),
}

/// Resolve the current session or fail the operation
pub(crate) fn require_session(store: &SessionStore) -> Result<Session, UseCaseError> {
    store.current().ok_or(UseCaseError::NotLoggedIn)
}

/// The optimistic mutation protocol: snapshot, apply, request,
/// reconcile-or-restore.
///
/// `request` must be built before the call (from a cloned `Arc`
/// client) so it does not borrow the cache.
pub(crate) async fn optimistic<T, F>(
    cache: &mut RoomCache,
    apply: impl FnOnce(&mut RoomCache),
    request: F,
) -> Result<T, UseCaseError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let snapshot = cache.snapshot();
    apply(cache);
    match request.await {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::debug!("Rolling back optimistic mutation: {}", e);
            cache.restore(snapshot);
            Err(e.into())
        }
    }
}
