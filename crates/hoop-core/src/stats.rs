//! Agregador de estadísticas: pliega el log de eventos en conteos por
//! jugador.
//!
//! Siempre re-derivable del log (sin contadores mutables ocultos que puedan
//! divergir), idempotente y asociativo sobre el orden de append: agregar un
//! prefijo y luego el resto equivale a agregar el log completo. Los totales
//! por equipo se calculan en el momento de la consulta sumando a los
//! miembros, nunca se almacenan aparte.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hoop_domain::Game;

use crate::event::{GameEvent, GameEventKind, ReboundType, ShotResult, ShotType};

/// Conteos exactos de ocurrencias por jugador.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub two_pt_made: u32,
    pub two_pt_missed: u32,
    pub three_pt_made: u32,
    pub three_pt_missed: u32,
    pub rebounds: u32,
    pub turnovers: u32,
    pub steals: u32,
}

impl PlayerStats {
    /// Puntos derivados de los aciertos (2×2pt + 3×3pt).
    pub fn points(&self) -> u32 {
        2 * self.two_pt_made + 3 * self.three_pt_made
    }

    /// Intentos de tiro de campo, encestados o no.
    pub fn field_goal_attempts(&self) -> u32 {
        self.two_pt_made + self.two_pt_missed + self.three_pt_made + self.three_pt_missed
    }

    /// Suma componente a componente (para totales por equipo).
    pub fn absorb(&mut self, other: &PlayerStats) {
        self.two_pt_made += other.two_pt_made;
        self.two_pt_missed += other.two_pt_missed;
        self.three_pt_made += other.three_pt_made;
        self.three_pt_missed += other.three_pt_missed;
        self.rebounds += other.rebounds;
        self.turnovers += other.turnovers;
        self.steals += other.steals;
    }
}

/// Acumula un evento sobre el tally de su actor.
fn fold_event(tally: &mut PlayerStats, kind: &GameEventKind) {
    match kind {
        GameEventKind::Shot { shot_type, result, .. } => match (shot_type, result) {
            (ShotType::TwoPt, ShotResult::Make) => tally.two_pt_made += 1,
            (ShotType::TwoPt, ShotResult::Miss) => tally.two_pt_missed += 1,
            (ShotType::ThreePt, ShotResult::Make) => tally.three_pt_made += 1,
            (ShotType::ThreePt, ShotResult::Miss) => tally.three_pt_missed += 1,
        },
        GameEventKind::Rebound { .. } => tally.rebounds += 1,
        GameEventKind::Turnover { .. } => tally.turnovers += 1,
        GameEventKind::Steal { .. } => tally.steals += 1,
        GameEventKind::OutOfBounds => {}
    }
}

/// Pliega el log en un mapa jugador → estadísticas.
///
/// Semántica left-join: todo jugador del roster aparece, con ceros si no
/// registró eventos. Un evento cuyo actor no resuelva contra el roster es
/// inalcanzable con un log bien formado; se señala con `warn!` y se omite,
/// porque el agregador es un fold de lectura y nunca niega acceso a datos
/// existentes.
pub fn aggregate(game: &Game, events: &[GameEvent]) -> BTreeMap<Uuid, PlayerStats> {
    let mut tallies: BTreeMap<Uuid, PlayerStats> =
        game.players().iter().map(|p| (p.id(), PlayerStats::default())).collect();
    for ev in events {
        let Some(player_id) = ev.kind.player_id() else {
            continue; // fuera-de-banda: sin actor que acreditar
        };
        match tallies.get_mut(&player_id) {
            Some(tally) => fold_event(tally, &ev.kind),
            None => {
                log::warn!("aggregate: event seq={} credits player {} not on roster of game {}",
                           ev.seq,
                           player_id,
                           game.id());
            }
        }
    }
    tallies
}

/// Totales por equipo, agrupando por el campo de equipo del roster en el
/// momento de la consulta.
pub fn team_totals(game: &Game, tallies: &BTreeMap<Uuid, PlayerStats>) -> BTreeMap<String, PlayerStats> {
    let mut totals: BTreeMap<String, PlayerStats> = BTreeMap::new();
    totals.insert(game.team1_name().to_string(), PlayerStats::default());
    totals.insert(game.team2_name().to_string(), PlayerStats::default());
    for (player_id, tally) in tallies {
        if let Some(team) = game.team_of(*player_id) {
            if let Some(total) = totals.get_mut(team) {
                total.absorb(tally);
            }
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDraft, ShotResult, ShotType};
    use chrono::Utc;
    use hoop_domain::Game;

    fn setup() -> Game {
        Game::new("Halcones", "Tigres", &["A1", "A2"], &["B1", "B2"], "Halcones").unwrap()
    }

    fn pid(game: &Game, name: &str) -> Uuid {
        game.players().iter().find(|p| p.name() == name).unwrap().id()
    }

    fn ev(game: &Game, seq: u64, kind: GameEventKind) -> GameEvent {
        let draft = EventDraft::new(kind, 10, "Halcones");
        GameEvent { seq,
                    game_id: game.id(),
                    event_id: draft.event_id,
                    kind: draft.kind,
                    clock_seconds: draft.clock_seconds,
                    possession_after: draft.possession_after,
                    ts: Utc::now() }
    }

    fn sample_log(game: &Game) -> Vec<GameEvent> {
        vec![ev(game, 0, GameEventKind::Shot { player_id: pid(game, "A1"),
                                               shot_type: ShotType::TwoPt,
                                               result: ShotResult::Make }),
             ev(game, 1, GameEventKind::Shot { player_id: pid(game, "B1"),
                                               shot_type: ShotType::ThreePt,
                                               result: ShotResult::Miss }),
             ev(game, 2, GameEventKind::Rebound { player_id: pid(game, "A2"),
                                                  rebound_type: ReboundType::Defensive }),
             ev(game, 3, GameEventKind::Turnover { player_id: pid(game, "A1") }),
             ev(game, 4, GameEventKind::Steal { player_id: pid(game, "B2") })]
    }

    #[test]
    fn counts_match_event_occurrences() {
        let game = setup();
        let tallies = aggregate(&game, &sample_log(&game));
        assert_eq!(tallies[&pid(&game, "A1")].two_pt_made, 1);
        assert_eq!(tallies[&pid(&game, "A1")].turnovers, 1);
        assert_eq!(tallies[&pid(&game, "B1")].three_pt_missed, 1);
        assert_eq!(tallies[&pid(&game, "A2")].rebounds, 1);
        assert_eq!(tallies[&pid(&game, "B2")].steals, 1);
    }

    #[test]
    fn rostered_players_without_events_appear_zeroed() {
        let game = setup();
        let tallies = aggregate(&game, &[]);
        assert_eq!(tallies.len(), game.players().len());
        assert!(tallies.values().all(|t| *t == PlayerStats::default()));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let game = setup();
        let log = sample_log(&game);
        assert_eq!(aggregate(&game, &log), aggregate(&game, &log));
    }

    #[test]
    fn prefix_fold_is_consistent_with_full_fold() {
        let game = setup();
        let log = sample_log(&game);
        let full = aggregate(&game, &log);
        for k in 0..=log.len() {
            let mut prefix = aggregate(&game, &log[..k]);
            for ev in &log[k..] {
                if let Some(player_id) = ev.kind.player_id() {
                    fold_event(prefix.get_mut(&player_id).unwrap(), &ev.kind);
                }
            }
            assert_eq!(prefix, full, "split en k={k} debe coincidir con el fold completo");
        }
    }

    #[test]
    fn orphan_actor_is_non_fatal() {
        let game = setup();
        let mut log = sample_log(&game);
        log.push(ev(&game, 5, GameEventKind::Steal { player_id: Uuid::new_v4() }));
        // No panic, el resto de conteos queda intacto
        let tallies = aggregate(&game, &log);
        assert_eq!(tallies[&pid(&game, "B2")].steals, 1);
    }

    #[test]
    fn team_totals_sum_members() {
        let game = setup();
        let tallies = aggregate(&game, &sample_log(&game));
        let totals = team_totals(&game, &tallies);
        assert_eq!(totals["Halcones"].two_pt_made, 1);
        assert_eq!(totals["Halcones"].rebounds, 1);
        assert_eq!(totals["Halcones"].turnovers, 1);
        assert_eq!(totals["Tigres"].three_pt_missed, 1);
        assert_eq!(totals["Tigres"].steals, 1);
        assert_eq!(totals["Halcones"].points(), 2);
        assert_eq!(totals["Tigres"].points(), 0);
    }
}
