pub mod types;
pub use types::{GameRepository, InMemoryGameRepository};
