// hoop-domain library entry point
pub mod error;
pub mod game;
pub mod player;
pub use error::DomainError;
pub use game::{Game, GameStatus};
pub use player::Player;
