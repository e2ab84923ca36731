//! Tipos de evento del partido y estructura `GameEvent`.
//!
//! Rol en el sistema:
//! - El motor acepta acciones validadas y las materializa como eventos en un
//!   `EventStore` append-only.
//! - El log de eventos es el sustrato compartido: la máquina de posesión lo
//!   reproduce (replay) y el agregador de estadísticas lo pliega, sin
//!   estructuras mutables que puedan divergir del log.
//! - El enum `GameEventKind` define el vocabulario observable y estable de
//!   eventos legales.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categoría de tiro: dos o tres puntos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotType {
    #[serde(rename = "2pt")]
    TwoPt,
    #[serde(rename = "3pt")]
    ThreePt,
}

/// Resultado de un tiro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotResult {
    Make,
    Miss,
}

/// Categoría de rebote, derivada por la máquina de posesión comparando el
/// equipo del reboteador con el del tirador del fallo inmediatamente previo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReboundType {
    Offensive,
    Defensive,
}

/// Vocabulario de eventos aceptados.
///
/// La presencia de sub-tipo/resultado queda determinada por la variante:
/// los tiros llevan ambos, el rebote lleva su categoría derivada, y
/// robo/pérdida/fuera-de-banda no llevan ninguno.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventKind {
    /// Intento de tiro, encestado o fallado. Un fallo abre un "pending miss"
    /// que debe resolverse con rebote o fuera-de-banda.
    Shot {
        player_id: Uuid,
        shot_type: ShotType,
        result: ShotResult,
    },
    /// Rebote que resuelve el fallo pendiente. `rebound_type` es derivado,
    /// nunca lo aporta el llamador.
    Rebound {
        player_id: Uuid,
        rebound_type: ReboundType,
    },
    /// Robo de balón acreditado al jugador.
    Steal { player_id: Uuid },
    /// Pérdida cometida por el jugador.
    Turnover { player_id: Uuid },
    /// Balón fuera de banda: resuelve el fallo pendiente sin reboteador.
    OutOfBounds,
}

impl GameEventKind {
    /// Jugador acreditado por el evento, si la variante lleva actor.
    pub fn player_id(&self) -> Option<Uuid> {
        match self {
            GameEventKind::Shot { player_id, .. }
            | GameEventKind::Rebound { player_id, .. }
            | GameEventKind::Steal { player_id }
            | GameEventKind::Turnover { player_id } => Some(*player_id),
            GameEventKind::OutOfBounds => None,
        }
    }
}

/// Evento inmutable una vez aceptado.
///
/// `seq` es la clave de orden autoritativa (asignada por el log en el
/// append); `clock_seconds` es sólo un atributo de presentación y no se
/// exige monotónico. `possession_after` guarda el equipo con posesión
/// inmediatamente después de aplicar el evento, para replay/auditoría.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub seq: u64, // asignado por el EventStore (orden de append, por partido)
    pub game_id: Uuid,
    pub event_id: Uuid,
    pub kind: GameEventKind,
    pub clock_seconds: u32,
    pub possession_after: String,
    pub ts: DateTime<Utc>, // metadato (no participa en el orden)
}

/// Borrador de evento: todo lo que decide el motor antes de que el log
/// asigne `seq` y `ts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub event_id: Uuid,
    pub kind: GameEventKind,
    pub clock_seconds: u32,
    pub possession_after: String,
}

impl EventDraft {
    /// Construye un borrador con id fresco (el colaborador de generación de
    /// ids es opaco para el resto del core).
    pub fn new(kind: GameEventKind, clock_seconds: u32, possession_after: &str) -> Self {
        Self { event_id: Uuid::new_v4(),
               kind,
               clock_seconds,
               possession_after: possession_after.to_string() }
    }
}
