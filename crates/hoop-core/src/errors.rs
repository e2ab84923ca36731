//! Errores del core: la taxonomía completa de rechazos del motor.
//!
//! Los cuatro primeros son recuperables por el llamador: se devuelven de
//! forma síncrona con detalle suficiente para corregir y reenviar. Ninguno
//! deja estado parcial: un evento rechazado nunca toca el log.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    /// Forma del evento inválida: tipo desconocido,
    /// sub-tipo/resultado presentes cuando deben estar ausentes o viceversa.
    #[error("malformed event: {0}")] MalformedEvent(String),
    /// Forma legal pero inalcanzable desde el estado actual de posesión
    /// (p.ej. rebote sin tiro fallado pendiente).
    #[error("invalid transition: {0}")] InvalidTransition(String),
    #[error("unknown game: {0}")] UnknownGame(Uuid),
    /// El jugador referido no pertenece al roster del partido destino.
    #[error("player not on game roster: {0}")] UnknownPlayer(Uuid),
    #[error("game is not active")] GameNotActive,
    #[error("internal: {0}")] Internal(String),
}

/// Clasificación gruesa para auditoría/persistencia de rechazos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Transition,
    NotFound,
    Lifecycle,
    Internal,
}

impl ErrorClass {
    /// String en minúsculas, estable para la columna `error_class`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Validation => "validation",
            ErrorClass::Transition => "transition",
            ErrorClass::NotFound => "not_found",
            ErrorClass::Lifecycle => "lifecycle",
            ErrorClass::Internal => "internal",
        }
    }
}

pub fn classify_error(err: &CoreError) -> ErrorClass {
    match err {
        CoreError::MalformedEvent(_) => ErrorClass::Validation,
        CoreError::InvalidTransition(_) => ErrorClass::Transition,
        CoreError::UnknownGame(_) | CoreError::UnknownPlayer(_) => ErrorClass::NotFound,
        CoreError::GameNotActive => ErrorClass::Lifecycle,
        CoreError::Internal(_) => ErrorClass::Internal,
    }
}
