//! Client-side cache of rooms, topics and per-topic chat logs.
//!
//! The cache is the single source of truth for what the UI renders.
//! List fetches replace wholesale (no incremental merge); optimistic
//! mutations edit the cache directly and roll back from a snapshot when
//! the request fails. The current selection is mirrored here so
//! responses that arrive after the user moved on can be dropped.

use std::collections::{HashMap, HashSet};

use crate::{
    domain::{ChatMessage, Room, RoomId, Topic, TopicId},
    time,
};

/// Operations that can be in flight, each with its own pending flag.
///
/// Per-operation flags instead of a global lock: a slow room sync must
/// not block sending chat messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingOp {
    SyncRooms,
    FetchTopics,
    CreateRoom,
    JoinRoom,
    LeaveRoom,
    DeleteRoom,
    RevealPassword,
    CreateTopic,
    DeleteTopic,
    DeleteChat,
    MakeAdmin,
    RemoveUser,
}

/// Tracks which operations are currently in flight
#[derive(Debug, Default)]
pub struct PendingOps {
    active: HashSet<PendingOp>,
}

impl PendingOps {
    /// Mark an operation as started. Returns `false` if it already was.
    pub fn begin(&mut self, op: PendingOp) -> bool {
        self.active.insert(op)
    }

    pub fn finish(&mut self, op: PendingOp) {
        self.active.remove(&op);
    }

    pub fn is_pending(&self, op: PendingOp) -> bool {
        self.active.contains(&op)
    }
}

/// Append-only chat log for one topic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
}

impl MessageLog {
    /// Log seeded with the topic's welcome message
    fn seeded(topic_title: &str, now: i64) -> Self {
        Self {
            messages: vec![ChatMessage::welcome(topic_title, now)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Point-in-time copy of the mutable cache contents, used by the
/// optimistic mutation protocol for rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot {
    rooms: Vec<Room>,
    logs: HashMap<TopicId, MessageLog>,
}

/// The room/topic/message cache plus the mirrored selection.
#[derive(Debug, Default)]
pub struct RoomCache {
    rooms: Vec<Room>,
    logs: HashMap<TopicId, MessageLog>,
    selected_room: Option<RoomId>,
    selected_topic: Option<TopicId>,
}

impl RoomCache {
    pub fn new() -> Self {
        Self::default()
    }

    // --- selection mirror ---

    pub fn select_room(&mut self, room_id: RoomId) {
        self.selected_room = Some(room_id);
        self.selected_topic = None;
    }

    pub fn select_topic(&mut self, topic_id: TopicId) {
        self.selected_topic = Some(topic_id);
    }

    pub fn clear_topic_selection(&mut self) {
        self.selected_topic = None;
    }

    pub fn clear_selection(&mut self) {
        self.selected_room = None;
        self.selected_topic = None;
    }

    pub fn selected_room(&self) -> Option<&RoomId> {
        self.selected_room.as_ref()
    }

    pub fn selected_topic(&self) -> Option<&TopicId> {
        self.selected_topic.as_ref()
    }

    // --- rooms ---

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| &r.id == room_id)
    }

    pub fn room_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| &r.id == room_id)
    }

    /// Find a room by id or by (case-insensitive) name
    pub fn find_room(&self, key: &str) -> Option<&Room> {
        self.rooms
            .iter()
            .find(|r| r.id.as_str() == key || r.name.eq_ignore_ascii_case(key))
    }

    /// Replace the whole room list (result of a room sync)
    pub fn replace_rooms(&mut self, rooms: Vec<Room>) {
        self.rooms = rooms;
    }

    pub fn insert_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    pub fn remove_room(&mut self, room_id: &RoomId) {
        self.rooms.retain(|r| &r.id != room_id);
    }

    /// Swap a temporary room id for the server-assigned one
    pub fn replace_room_id(&mut self, temp_id: &RoomId, real_id: RoomId) {
        if let Some(room) = self.room_mut(temp_id) {
            room.id = real_id.clone();
        }
        if self.selected_room.as_ref() == Some(temp_id) {
            self.selected_room = Some(real_id);
        }
    }

    // --- topics ---

    /// Replace a room's topic list with a fetch result.
    ///
    /// Dropped when the selection moved to another room while the fetch
    /// was in flight.
    pub fn replace_topics(&mut self, room_id: &RoomId, topics: Vec<Topic>) -> bool {
        if self.selected_room.as_ref() != Some(room_id) {
            tracing::debug!("Dropping stale topics response for room {}", room_id);
            return false;
        }
        if let Some(room) = self.room_mut(room_id) {
            room.topics = topics;
            return true;
        }
        false
    }

    /// Swap a temporary topic id for the server-assigned one, carrying
    /// the message log over to the new key.
    pub fn replace_topic_id(&mut self, room_id: &RoomId, temp_id: &TopicId, real_id: TopicId) {
        if let Some(room) = self.room_mut(room_id)
            && let Some(topic) = room.topics.iter_mut().find(|t| &t.id == temp_id)
        {
            topic.id = real_id.clone();
        }
        if let Some(log) = self.logs.remove(temp_id) {
            self.logs.insert(real_id.clone(), log);
        }
        if self.selected_topic.as_ref() == Some(temp_id) {
            self.selected_topic = Some(real_id);
        }
    }

    // --- message logs ---

    /// Ensure a log exists for this topic, seeding the welcome message
    /// on first entry.
    pub fn init_log(&mut self, topic_id: &TopicId, topic_title: &str) {
        self.logs
            .entry(topic_id.clone())
            .or_insert_with(|| MessageLog::seeded(topic_title, time::now_millis()));
    }

    pub fn log(&self, topic_id: &TopicId) -> Option<&MessageLog> {
        self.logs.get(topic_id)
    }

    /// Append a message to a topic's log. The log must have been
    /// initialized; appends to unknown topics are dropped.
    pub fn append_message(&mut self, topic_id: &TopicId, message: ChatMessage) {
        match self.logs.get_mut(topic_id) {
            Some(log) => log.push(message),
            None => tracing::debug!("Dropping message for unknown topic {}", topic_id),
        }
    }

    /// Reset a topic's log to just the welcome message (chat deleted)
    pub fn reset_log(&mut self, topic_id: &TopicId, topic_title: &str) {
        self.logs.insert(
            topic_id.clone(),
            MessageLog::seeded(topic_title, time::now_millis()),
        );
    }

    /// Drop a topic's log entirely (topic deleted or room left)
    pub fn drop_log(&mut self, topic_id: &TopicId) {
        self.logs.remove(topic_id);
    }

    /// Drop the logs of every topic in a room
    pub fn drop_room_logs(&mut self, room_id: &RoomId) {
        if let Some(room) = self.room(room_id) {
            let topic_ids: Vec<TopicId> = room.topics.iter().map(|t| t.id.clone()).collect();
            for topic_id in topic_ids {
                self.logs.remove(&topic_id);
            }
        }
    }

    // --- optimistic mutation support ---

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            rooms: self.rooms.clone(),
            logs: self.logs.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: CacheSnapshot) {
        self.rooms = snapshot.rooms;
        self.logs = snapshot.logs;
    }

    /// Structural equality against a snapshot, for tests and debugging
    pub fn matches(&self, snapshot: &CacheSnapshot) -> bool {
        self.rooms == snapshot.rooms && self.logs == snapshot.logs
    }
}
