//! Domain layer for the room/topic chat client.
//!
//! This module contains business rules that are independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod value_object;

pub use entity::{ASSISTANT_SENDER, ChatMessage, Member, Room, Topic};
pub use error::{RoomError, ValueObjectError};
pub use value_object::{MessageText, RoomId, TopicId};
