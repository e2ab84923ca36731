//! hoop-core: Modelo de eventos, máquina de posesión y agregación de
//! estadísticas de un partido de baloncesto.
pub mod display;
pub mod engine;
pub mod errors;
pub mod event;
pub mod possession;
pub mod repo;
pub mod stats;

pub use engine::GameEngine;
pub use errors::{classify_error, CoreError, ErrorClass};
pub use event::{validate_shape, EventDraft, EventPayload, EventStore, GameEvent, GameEventKind, InMemoryEventStore,
                ReboundType, ShotResult, ShotType, ValidatedAction};
pub use possession::{PendingMiss, PossessionState};
pub use repo::{GameRepository, InMemoryGameRepository};
pub use stats::{aggregate, team_totals, PlayerStats};
