//! Core GameEngine implementation

use std::collections::BTreeMap;

use uuid::Uuid;

use hoop_domain::Game;

use crate::errors::CoreError;
use crate::event::{validate_shape, EventPayload, EventStore, GameEvent};
use crate::possession::{self, PossessionState};
use crate::repo::GameRepository;
use crate::stats::{self, PlayerStats};

/// Motor de registro de eventos de partido.
///
/// Compone en un único lugar la validación de forma, la máquina de
/// posesión y el append al log. Disciplina de escritor único por motor
/// (`&mut self`): los envíos para un mismo partido se aplican en serie
/// porque la transición de posesión no es conmutativa; partidos distintos
/// son totalmente independientes entre sí.
pub struct GameEngine<S, R>
    where S: EventStore,
          R: GameRepository
{
    event_store: S,
    games: R,
}

impl GameEngine<crate::event::InMemoryEventStore, crate::repo::InMemoryGameRepository> {
    /// Crea un motor con stores en memoria (tests y demos).
    pub fn in_memory() -> Self {
        Self::new_with_stores(crate::event::InMemoryEventStore::default(),
                              crate::repo::InMemoryGameRepository::new())
    }
}

impl<S, R> GameEngine<S, R>
    where S: EventStore,
          R: GameRepository
{
    /// Crea un motor con los stores proporcionados.
    pub fn new_with_stores(event_store: S, games: R) -> Self {
        Self { event_store, games }
    }

    /// Devuelve los stores subyacentes (p.ej. para reconstruir el motor en
    /// otro proceso o tras un reinicio).
    pub fn into_stores(self) -> (S, R) {
        (self.event_store, self.games)
    }

    /// Acceso de sólo lectura al store de eventos, para consultas propias
    /// del backend (p.ej. auditoría de rechazos en Postgres).
    pub fn event_store(&self) -> &S {
        &self.event_store
    }

    /// Da de alta un partido recién creado y devuelve su id.
    pub fn register_game(&mut self, game: Game) -> Uuid {
        let game_id = game.id();
        self.games.save(&game);
        game_id
    }

    fn load_game(&self, game_id: Uuid) -> Result<Game, CoreError> {
        self.games.load(game_id).ok_or(CoreError::UnknownGame(game_id))
    }

    /// Partido con su roster, para consumo de capas de presentación.
    pub fn game(&self, game_id: Uuid) -> Result<Game, CoreError> {
        self.load_game(game_id)
    }

    /// Envía un candidato de evento para un partido.
    ///
    /// Pipeline: partido existente y activo → validación de forma contra el
    /// roster → transición de la máquina de posesión → append (atómico si
    /// la transición derivó el par pérdida+robo). Devuelve los eventos
    /// aceptados, ya con seq asignado.
    ///
    /// No hay aceptación parcial: ante cualquier error el log y la posesión
    /// quedan exactamente como estaban.
    pub fn submit_event(&mut self, game_id: Uuid, payload: &EventPayload) -> Result<Vec<GameEvent>, CoreError> {
        let game = self.load_game(game_id)?;
        if !game.is_active() {
            return Err(CoreError::GameNotActive);
        }
        let action = validate_shape(payload, &game)?;

        let events = self.event_store.list(game_id);
        let state = possession::replay(&game, &events);
        let (_next, drafts) = state.apply(&action, &game, payload.clock_seconds)?;

        Ok(self.event_store.append_batch(game_id, drafts))
    }

    /// Eventos del partido en orden autoritativo (`seq` ascendente).
    pub fn events_for(&self, game_id: Uuid) -> Result<Vec<GameEvent>, CoreError> {
        self.load_game(game_id)?;
        Ok(self.event_store.list(game_id))
    }

    /// Estadísticas por jugador, re-derivadas del log en cada consulta.
    pub fn stats_for(&self, game_id: Uuid) -> Result<BTreeMap<Uuid, PlayerStats>, CoreError> {
        let game = self.load_game(game_id)?;
        let events = self.event_store.list(game_id);
        Ok(stats::aggregate(&game, &events))
    }

    /// Totales por equipo (suma de miembros, calculada en la consulta).
    pub fn team_totals_for(&self, game_id: Uuid) -> Result<BTreeMap<String, PlayerStats>, CoreError> {
        let game = self.load_game(game_id)?;
        let events = self.event_store.list(game_id);
        let tallies = stats::aggregate(&game, &events);
        Ok(stats::team_totals(&game, &tallies))
    }

    /// Equipo con posesión vigente (replay del log desde la posesión
    /// inicial del partido).
    pub fn possession_for(&self, game_id: Uuid) -> Result<String, CoreError> {
        let game = self.load_game(game_id)?;
        let events = self.event_store.list(game_id);
        Ok(possession::replay(&game, &events).possession)
    }

    /// Estado completo de la máquina, incluido el fallo pendiente.
    pub fn possession_state_for(&self, game_id: Uuid) -> Result<PossessionState, CoreError> {
        let game = self.load_game(game_id)?;
        let events = self.event_store.list(game_id);
        Ok(possession::replay(&game, &events))
    }

    /// Cierra el partido; a partir de aquí todo envío devuelve
    /// `GameNotActive`.
    pub fn end_game(&mut self, game_id: Uuid) -> Result<(), CoreError> {
        let mut game = self.load_game(game_id)?;
        game.end();
        self.games.save(&game);
        Ok(())
    }
}
