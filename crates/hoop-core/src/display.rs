//! Helpers de presentación: descripción legible de eventos y formato de
//! reloj. Consumidos por la CLI y el binario de demo; la capa de UI real
//! queda fuera de este repo.

use hoop_domain::Game;

use crate::event::{GameEvent, GameEventKind, ReboundType, ShotResult, ShotType};

/// Formatea segundos transcurridos como `mm:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn player_name(game: &Game, player_id: uuid::Uuid) -> String {
    game.player(player_id)
        .map(|p| p.name().to_string())
        .unwrap_or_else(|| player_id.to_string())
}

/// Descripción de una línea para un evento, estilo marcador en vivo.
pub fn describe(event: &GameEvent, game: &Game) -> String {
    match &event.kind {
        GameEventKind::Shot { player_id,
                              shot_type,
                              result, } => {
            let name = player_name(game, *player_id);
            let shot = match shot_type {
                ShotType::TwoPt => "2-point",
                ShotType::ThreePt => "3-point",
            };
            let verb = match result {
                ShotResult::Make => "made",
                ShotResult::Miss => "missed",
            };
            format!("{name} {verb} a {shot} shot")
        }
        GameEventKind::Rebound { player_id, rebound_type } => {
            let name = player_name(game, *player_id);
            let side = match rebound_type {
                ReboundType::Offensive => "offensive",
                ReboundType::Defensive => "defensive",
            };
            format!("{name} got a {side} rebound")
        }
        GameEventKind::Steal { player_id } => format!("{} made a steal", player_name(game, *player_id)),
        GameEventKind::Turnover { player_id } => {
            format!("{} committed a turnover", player_name(game, *player_id))
        }
        GameEventKind::OutOfBounds => "ball went out of bounds".to_string(),
    }
}

/// Vista más-reciente-primero para presentación. No altera el orden
/// autoritativo por `seq` del log.
pub fn newest_first(events: &[GameEvent]) -> Vec<&GameEvent> {
    events.iter().rev().collect()
}
