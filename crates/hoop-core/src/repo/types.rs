//! Repositorio de partidos: lookup durable de roster y ciclo de vida,
//! clave por id de partido.
//!
//! El core lo trata como colaborador abstracto: la implementación en
//! memoria sirve para tests y demos; la durable vive en hoop-persistence.
use std::collections::HashMap;

use uuid::Uuid;

use hoop_domain::Game;

pub trait GameRepository {
    /// Carga el partido (con su roster) si existe.
    fn load(&self, game_id: Uuid) -> Option<Game>;
    /// Persiste el partido: alta en el setup o transición de estado.
    fn save(&mut self, game: &Game);
}

pub struct InMemoryGameRepository { pub inner: HashMap<Uuid, Game> }

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self { inner: HashMap::new() }
    }
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRepository for InMemoryGameRepository {
    fn load(&self, game_id: Uuid) -> Option<Game> {
        self.inner.get(&game_id).cloned()
    }

    fn save(&mut self, game: &Game) {
        self.inner.insert(game.id(), game.clone());
    }
}
