//! Infrastructure layer: the HTTP API client and wire DTOs.
//!
//! The UseCase layer depends on the [`api::RoomApi`] trait, not on the
//! concrete reqwest-backed implementation.

pub mod api;
pub mod dto;

pub use api::{ApiError, HttpApiClient, RoomApi};
