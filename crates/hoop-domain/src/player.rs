use serde::{Deserialize, Serialize};

use crate::DomainError;
use std::fmt;
use uuid::Uuid;

/// Un jugador pertenece a exactamente un equipo dentro de exactamente un
/// partido. Nombre y equipo son inmutables una vez iniciado el partido
/// (no hay traspasos a mitad de juego).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    id: Uuid,
    name: String,
    team: String,
}

impl Player {
    /// Crea un jugador con id fresco. El nombre no puede estar en blanco.
    pub fn new(name: &str, team: &str) -> Result<Self, DomainError> {
        Self::with_id(Uuid::new_v4(), name, team)
    }

    /// Reconstruye un jugador con un id ya asignado (rehidratación desde
    /// almacenamiento). Aplica las mismas validaciones que `new`.
    pub fn with_id(id: Uuid, name: &str, team: &str) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationError("El nombre del jugador no puede estar vacío".to_string()));
        }
        let team = team.trim();
        if team.is_empty() {
            return Err(DomainError::ValidationError("El equipo del jugador no puede estar vacío".to_string()));
        }
        Ok(Player { id,
                    name: name.to_string(),
                    team: team.to_string() })
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn team(&self) -> &str { &self.team }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.team)
    }
}
