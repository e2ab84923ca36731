//! Payload de entrada (capa de transporte) y validación de forma.
//!
//! `EventPayload` replica el cuerpo JSON que envía la capa externa:
//! `event_type` con sub-campos opcionales en texto, el actor, el reloj de
//! juego y la referencia opcional de robo. `validate_shape` es la función
//! pura del modelo de eventos: impone el invariante de presencia de campos
//! y resuelve los jugadores contra el roster, sin conocer el historial del
//! partido.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hoop_domain::Game;

use super::{ShotResult, ShotType};
use crate::errors::CoreError;

/// Candidato de evento tal como llega del exterior. El llamador debe
/// aportar la intención completa en una sola llamada (tipo, sub-tipo y
/// vínculo de robo); el core no recuerda estado de interacción.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<Uuid>,
    pub clock_seconds: u32,
    /// Sólo válido junto a `event_type = "turnover"`: jugador que roba.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stolen_by: Option<Uuid>,
}

impl EventPayload {
    /// Constructor de conveniencia para tiros.
    pub fn shot(player_id: Uuid, sub_type: &str, result: &str, clock_seconds: u32) -> Self {
        Self { event_type: "shot".to_string(),
               sub_type: Some(sub_type.to_string()),
               result: Some(result.to_string()),
               player_id: Some(player_id),
               clock_seconds,
               stolen_by: None }
    }

    /// Constructor de conveniencia para eventos sin sub-campos.
    pub fn simple(event_type: &str, player_id: Uuid, clock_seconds: u32) -> Self {
        Self { event_type: event_type.to_string(),
               sub_type: None,
               result: None,
               player_id: Some(player_id),
               clock_seconds,
               stolen_by: None }
    }

    /// Pérdida con robo vinculado (se materializa como par atómico).
    pub fn turnover_stolen_by(player_id: Uuid, stealer_id: Uuid, clock_seconds: u32) -> Self {
        Self { stolen_by: Some(stealer_id),
               ..Self::simple("turnover", player_id, clock_seconds) }
    }

    /// Fuera de banda: resuelve un fallo pendiente, sin actor.
    pub fn out_of_bounds(clock_seconds: u32) -> Self {
        Self { event_type: "out-of-bounds".to_string(),
               sub_type: None,
               result: None,
               player_id: None,
               clock_seconds,
               stolen_by: None }
    }
}

/// Acción ya validada en forma y roster, lista para la máquina de posesión.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedAction {
    Shot {
        player_id: Uuid,
        shot_type: ShotType,
        result: ShotResult,
    },
    /// La categoría (ofensivo/defensivo) la deriva la máquina a partir del
    /// fallo pendiente; el candidato no la aporta.
    Rebound { player_id: Uuid },
    Steal { player_id: Uuid },
    Turnover {
        player_id: Uuid,
        stolen_by: Option<Uuid>,
    },
    OutOfBounds,
}

fn parse_shot_type(s: &str) -> Result<ShotType, CoreError> {
    match s {
        "2pt" => Ok(ShotType::TwoPt),
        "3pt" => Ok(ShotType::ThreePt),
        other => Err(CoreError::MalformedEvent(format!("unknown shot sub_type: {other}"))),
    }
}

fn parse_shot_result(s: &str) -> Result<ShotResult, CoreError> {
    match s {
        "make" => Ok(ShotResult::Make),
        "miss" => Ok(ShotResult::Miss),
        other => Err(CoreError::MalformedEvent(format!("unknown shot result: {other}"))),
    }
}

/// Jugador obligatorio del payload, resuelto contra el roster del partido.
fn require_actor(payload: &EventPayload, game: &Game) -> Result<Uuid, CoreError> {
    let player_id = payload.player_id
                           .ok_or_else(|| CoreError::MalformedEvent(format!("{} requires player_id", payload.event_type)))?;
    if game.player(player_id).is_none() {
        return Err(CoreError::UnknownPlayer(player_id));
    }
    Ok(player_id)
}

/// Campos que una variante no admite: presentes → `MalformedEvent`.
fn forbid_sub_fields(payload: &EventPayload) -> Result<(), CoreError> {
    if payload.sub_type.is_some() || payload.result.is_some() {
        return Err(CoreError::MalformedEvent(format!("{} does not admit sub_type/result", payload.event_type)));
    }
    Ok(())
}

/// Valida la forma de un candidato y lo resuelve a una `ValidatedAction`.
///
/// Función pura: no consulta el historial del partido ni muta estado. Las
/// reglas de alcanzabilidad (fallo pendiente, partido activo) pertenecen a
/// la máquina de posesión y al motor respectivamente.
pub fn validate_shape(payload: &EventPayload, game: &Game) -> Result<ValidatedAction, CoreError> {
    if payload.stolen_by.is_some() && payload.event_type != "turnover" {
        return Err(CoreError::MalformedEvent(format!("stolen_by only applies to turnover, got {}",
                                                     payload.event_type)));
    }
    match payload.event_type.as_str() {
        "shot" => {
            let sub_type = payload.sub_type
                                  .as_deref()
                                  .ok_or_else(|| CoreError::MalformedEvent("shot requires sub_type".to_string()))?;
            let result = payload.result
                                .as_deref()
                                .ok_or_else(|| CoreError::MalformedEvent("shot requires result".to_string()))?;
            Ok(ValidatedAction::Shot { player_id: require_actor(payload, game)?,
                                       shot_type: parse_shot_type(sub_type)?,
                                       result: parse_shot_result(result)? })
        }
        "rebound" => {
            forbid_sub_fields(payload)?;
            Ok(ValidatedAction::Rebound { player_id: require_actor(payload, game)? })
        }
        "steal" => {
            forbid_sub_fields(payload)?;
            Ok(ValidatedAction::Steal { player_id: require_actor(payload, game)? })
        }
        "turnover" => {
            forbid_sub_fields(payload)?;
            let player_id = require_actor(payload, game)?;
            if let Some(stealer) = payload.stolen_by {
                if game.player(stealer).is_none() {
                    return Err(CoreError::UnknownPlayer(stealer));
                }
            }
            Ok(ValidatedAction::Turnover { player_id,
                                           stolen_by: payload.stolen_by })
        }
        "out-of-bounds" => {
            forbid_sub_fields(payload)?;
            if payload.player_id.is_some() {
                return Err(CoreError::MalformedEvent("out-of-bounds does not credit a player".to_string()));
            }
            Ok(ValidatedAction::OutOfBounds)
        }
        other => Err(CoreError::MalformedEvent(format!("unknown event_type: {other}"))),
    }
}
