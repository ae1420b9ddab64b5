//! Pure view/selection state machine.
//!
//! `RoomsList → TopicsList → Chat` with `back` transitions. The flow
//! never performs I/O itself; transitions return the effects the
//! runner must execute (fetch topics, open/close the channel), which
//! keeps the navigation rules unit-testable.

use thiserror::Error;

use crate::domain::{RoomId, TopicId};

/// The screen currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    RoomsList,
    TopicsList,
    Chat,
}

/// Side effects a transition requires the runner to perform, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEffect {
    /// Fetch the topic list for the newly selected room
    FetchTopics(RoomId),
    /// Open the chat channel for this scope (closes any previous one)
    OpenChannel { room: RoomId, topic: TopicId },
    /// Close the chat channel
    CloseChannel,
}

/// Invalid transitions, reported instead of silently ignored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("no room selected")]
    NoRoomSelected,
}

/// Navigation state: current view plus room/topic selection
#[derive(Debug)]
pub struct ViewFlow {
    view: View,
    room: Option<RoomId>,
    topic: Option<TopicId>,
}

impl Default for ViewFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewFlow {
    pub fn new() -> Self {
        Self {
            view: View::RoomsList,
            room: None,
            topic: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    pub fn topic(&self) -> Option<&TopicId> {
        self.topic.as_ref()
    }

    /// Select a room and move to its topic list.
    ///
    /// Allowed from any view; coming from the chat view the channel is
    /// closed first.
    pub fn enter_room(&mut self, room: RoomId) -> Vec<FlowEffect> {
        let mut effects = Vec::new();
        if self.view == View::Chat {
            effects.push(FlowEffect::CloseChannel);
        }
        self.topic = None;
        self.room = Some(room.clone());
        self.view = View::TopicsList;
        effects.push(FlowEffect::FetchTopics(room));
        effects
    }

    /// Select a topic and move to the chat view.
    ///
    /// Requires a selected room. Switching topics while already in chat
    /// is allowed; opening the new scope closes the previous one.
    pub fn open_topic(&mut self, topic: TopicId) -> Result<Vec<FlowEffect>, FlowError> {
        let room = self.room.clone().ok_or(FlowError::NoRoomSelected)?;
        self.topic = Some(topic.clone());
        self.view = View::Chat;
        Ok(vec![FlowEffect::OpenChannel { room, topic }])
    }

    /// Go back one level. In the rooms list this is a no-op.
    pub fn back(&mut self) -> Vec<FlowEffect> {
        match self.view {
            View::Chat => {
                self.topic = None;
                self.view = View::TopicsList;
                vec![FlowEffect::CloseChannel]
            }
            View::TopicsList => {
                self.room = None;
                self.view = View::RoomsList;
                Vec::new()
            }
            View::RoomsList => Vec::new(),
        }
    }

    /// Jump back to the rooms list, clearing both selections
    /// (room left or deleted).
    pub fn reset(&mut self) -> Vec<FlowEffect> {
        let effects = if self.view == View::Chat {
            vec![FlowEffect::CloseChannel]
        } else {
            Vec::new()
        };
        self.room = None;
        self.topic = None;
        self.view = View::RoomsList;
        effects
    }
}
