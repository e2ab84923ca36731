//! Definiciones de eventos, payload de entrada y trait EventStore.

mod payload;
mod store;
mod types;

pub use payload::{validate_shape, EventPayload, ValidatedAction};
pub use store::EventStore;
pub use store::InMemoryEventStore;
pub use types::{EventDraft, GameEvent, GameEventKind, ReboundType, ShotResult, ShotType};
