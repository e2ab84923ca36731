//! Máquina de estados de posesión.
//!
//! Fuente única de verdad sobre "quién tiene el balón" y autoridad que
//! decide si un evento es *legalmente alcanzable* desde el estado actual.
//! El estado completo a nivel de partido es la posesión vigente más,
//! transitoriamente, el fallo de tiro pendiente de resolución. Ese slot
//! `pending_miss` vive en el estado reconstruible desde el log (no en
//! estado de interfaz), de modo que el invariante sobrevive a reinicios
//! del proceso y a múltiples emisores.
//!
//! `apply` es puro: ante un rechazo no se produce ninguna mutación; los
//! borradores devueltos sólo se materializan si el motor los appendea.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hoop_domain::Game;

use crate::errors::CoreError;
use crate::event::{EventDraft, GameEvent, GameEventKind, ReboundType, ShotResult, ValidatedAction};

/// Fallo de tiro registrado, a la espera de rebote o fuera-de-banda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMiss {
    pub shooter_id: Uuid,
    pub shooter_team: String,
}

/// Estado de la máquina: exactamente un equipo tiene la posesión en todo
/// momento (nunca nula una vez arrancado el partido).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossessionState {
    pub possession: String,
    pub pending_miss: Option<PendingMiss>,
}

impl PossessionState {
    /// Estado inicial: el equipo elegido en el setup del partido.
    pub fn initial(game: &Game) -> Self {
        Self { possession: game.starting_possession().to_string(),
               pending_miss: None }
    }

    /// Función de transición: dado el estado actual y una acción validada,
    /// computa el estado siguiente y los borradores de evento derivados
    /// (uno, o dos para el par pérdida+robo).
    ///
    /// # Errores
    /// `InvalidTransition` si la acción es inalcanzable: rebote o
    /// fuera-de-banda sin fallo pendiente, o cualquier otra acción mientras
    /// un fallo sigue sin resolver.
    pub fn apply(&self,
                 action: &ValidatedAction,
                 game: &Game,
                 clock_seconds: u32)
                 -> Result<(PossessionState, Vec<EventDraft>), CoreError> {
        if self.pending_miss.is_some()
           && !matches!(action, ValidatedAction::Rebound { .. } | ValidatedAction::OutOfBounds)
        {
            return Err(CoreError::InvalidTransition("missed shot awaiting rebound or out-of-bounds".to_string()));
        }

        match action {
            ValidatedAction::Shot { player_id,
                                    shot_type,
                                    result, } => {
                let shooter_team = team_of(game, *player_id)?;
                match result {
                    ShotResult::Make => {
                        // Encestar invierte la posesión incondicionalmente.
                        let next = opponent_of(game, &shooter_team)?;
                        Ok((PossessionState { possession: next.clone(),
                                              pending_miss: None },
                            vec![EventDraft::new(GameEventKind::Shot { player_id: *player_id,
                                                                       shot_type: *shot_type,
                                                                       result: *result },
                                                 clock_seconds,
                                                 &next)]))
                    }
                    ShotResult::Miss => {
                        // El fallo no cambia la posesión todavía: queda un
                        // placeholder hasta que algo lo resuelva.
                        Ok((PossessionState { possession: self.possession.clone(),
                                              pending_miss: Some(PendingMiss { shooter_id: *player_id,
                                                                               shooter_team }) },
                            vec![EventDraft::new(GameEventKind::Shot { player_id: *player_id,
                                                                       shot_type: *shot_type,
                                                                       result: *result },
                                                 clock_seconds,
                                                 &self.possession)]))
                    }
                }
            }
            ValidatedAction::Rebound { player_id } => {
                let pending = self.pending_miss
                                  .as_ref()
                                  .ok_or_else(|| CoreError::InvalidTransition("rebound with no pending miss".to_string()))?;
                let rebounder_team = team_of(game, *player_id)?;
                let rebound_type = if rebounder_team == pending.shooter_team {
                    ReboundType::Offensive
                } else {
                    ReboundType::Defensive
                };
                // Defensivo invierte la posesión; ofensivo la deja intacta.
                let next = match rebound_type {
                    ReboundType::Defensive => rebounder_team,
                    ReboundType::Offensive => self.possession.clone(),
                };
                Ok((PossessionState { possession: next.clone(),
                                      pending_miss: None },
                    vec![EventDraft::new(GameEventKind::Rebound { player_id: *player_id,
                                                                  rebound_type },
                                         clock_seconds,
                                         &next)]))
            }
            ValidatedAction::OutOfBounds => {
                if self.pending_miss.is_none() {
                    return Err(CoreError::InvalidTransition("out-of-bounds with no pending miss".to_string()));
                }
                // Política observada: el balón queda con el mismo equipo que
                // acaba de fallar. Divergencia con las reglas reales marcada
                // como pregunta abierta de producto.
                Ok((PossessionState { possession: self.possession.clone(),
                                      pending_miss: None },
                    vec![EventDraft::new(GameEventKind::OutOfBounds, clock_seconds, &self.possession)]))
            }
            ValidatedAction::Turnover { player_id, stolen_by } => {
                let committer_team = team_of(game, *player_id)?;
                match stolen_by {
                    None => {
                        let next = opponent_of(game, &committer_team)?;
                        Ok((PossessionState { possession: next.clone(),
                                              pending_miss: None },
                            vec![EventDraft::new(GameEventKind::Turnover { player_id: *player_id },
                                                 clock_seconds,
                                                 &next)]))
                    }
                    Some(stealer_id) => {
                        // Par vinculado: pérdida acreditada al que la comete y
                        // robo acreditado al ladrón, misma posesión resultante.
                        // El motor los appendea de forma atómica.
                        let next = team_of(game, *stealer_id)?;
                        Ok((PossessionState { possession: next.clone(),
                                              pending_miss: None },
                            vec![EventDraft::new(GameEventKind::Turnover { player_id: *player_id },
                                                 clock_seconds,
                                                 &next),
                                 EventDraft::new(GameEventKind::Steal { player_id: *stealer_id },
                                                 clock_seconds,
                                                 &next)]))
                    }
                }
            }
            ValidatedAction::Steal { player_id } => {
                // Robo sin pérdida emparejada: mismo efecto de posesión, un
                // único evento (no hay a quién acreditar la pérdida).
                let next = team_of(game, *player_id)?;
                Ok((PossessionState { possession: next.clone(),
                                      pending_miss: None },
                    vec![EventDraft::new(GameEventKind::Steal { player_id: *player_id }, clock_seconds, &next)]))
            }
        }
    }
}

fn team_of(game: &Game, player_id: Uuid) -> Result<String, CoreError> {
    game.team_of(player_id)
        .map(str::to_string)
        .ok_or(CoreError::UnknownPlayer(player_id))
}

fn opponent_of(game: &Game, team: &str) -> Result<String, CoreError> {
    game.opponent_of(team)
        .map(str::to_string)
        .ok_or_else(|| CoreError::Internal(format!("team not in game: {team}")))
}

/// Reconstruye el estado de la máquina plegando el log en orden de `seq`.
///
/// La posesión se toma del `possession_after` almacenado en cada evento
/// (campo de auditoría), de modo que el replay es trivialmente consistente
/// con lo que decidió la máquina en su momento.
pub fn replay(game: &Game, events: &[GameEvent]) -> PossessionState {
    let mut state = PossessionState::initial(game);
    for ev in events {
        state.possession = ev.possession_after.clone();
        state.pending_miss = match &ev.kind {
            GameEventKind::Shot { player_id,
                                  result: ShotResult::Miss,
                                  .. } => {
                match game.team_of(*player_id) {
                    Some(team) => Some(PendingMiss { shooter_id: *player_id,
                                                     shooter_team: team.to_string() }),
                    None => {
                        // Inalcanzable con un log bien formado; señal de
                        // observabilidad, nunca un fallo de lectura.
                        log::warn!("replay: shooter {} not on roster of game {}", player_id, game.id());
                        None
                    }
                }
            }
            _ => None,
        };
    }
    state
}
