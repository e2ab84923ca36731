//! Engine module for GameEngine implementation
//!
//! Composes shape validation, the possession state machine and the
//! append-only event log behind a single submission pipeline.

pub mod core;

pub use core::GameEngine;

pub use crate::event::{EventPayload, EventStore, GameEvent, GameEventKind, InMemoryEventStore};
pub use crate::repo::{GameRepository, InMemoryGameRepository};
