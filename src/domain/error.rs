//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    /// TopicId validation error
    #[error("TopicId cannot be empty")]
    TopicIdEmpty,

    /// TopicId too long error
    #[error("TopicId cannot exceed {max} characters (got {actual})")]
    TopicIdTooLong { max: usize, actual: usize },

    /// MessageText validation error
    #[error("MessageText cannot be empty")]
    MessageTextEmpty,

    /// MessageText too long error
    #[error("MessageText cannot exceed {max} characters (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },
}

/// Errors related to Room membership and permission rules
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// The action requires admin rights in the room
    #[error("only room admins can perform this action")]
    AdminRequired,

    /// The target user is not a member of the room
    #[error("'{0}' is not a member of this room")]
    NotAMember(String),

    /// The target user is already an admin of the room
    #[error("'{0}' is already an admin of this room")]
    AlreadyAdmin(String),
}
