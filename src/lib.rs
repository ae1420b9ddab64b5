//! Client-side core of the AI Room Collaborator study platform.
//!
//! The crate implements the pieces a native client needs: a session
//! store, a room/topic cache with optimistic mutation and rollback, a
//! reconnecting WebSocket chat channel, and the view/selection state
//! machine driving the interactive CLI. The platform's HTTP and
//! WebSocket APIs remain opaque collaborators reached through the
//! [`infrastructure::RoomApi`] trait.
//!
//! Layering follows domain / infrastructure / usecase / ui: usecases
//! mutate the [`cache::RoomCache`] against the `RoomApi` abstraction,
//! the [`channel::ChatChannel`] owns the single realtime connection,
//! and the UI runner is the only writer of shared state.

pub mod cache;
pub mod channel;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logger;
pub mod notice;
pub mod session;
pub mod time;
pub mod ui;
pub mod usecase;
