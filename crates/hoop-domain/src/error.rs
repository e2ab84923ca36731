// error.rs
use thiserror::Error;

/// Error personalizado del dominio para el tracker de partidos
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    ValidationError(String),
}
