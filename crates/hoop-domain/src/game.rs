// game.rs
use crate::{DomainError, Player};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Estado del ciclo de vida de un partido. Los eventos sólo se aceptan
/// mientras el partido está activo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Active,
    Ended,
}

impl GameStatus {
    /// Representación en minúsculas, estable para almacenamiento.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Ended => "ended",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "active" => Ok(GameStatus::Active),
            "ended" => Ok(GameStatus::Ended),
            other => Err(DomainError::ValidationError(format!("Estado de partido desconocido: {other}"))),
        }
    }
}

/// Representa un partido entre exactamente dos equipos con nombre, con su
/// roster fijado en el setup y la posesión inicial elegida al crearlo.
///
/// Invariantes verificados en construcción:
/// - Los dos nombres de equipo son distintos y no vacíos.
/// - Cada equipo tiene al menos un jugador.
/// - No hay nombres de jugador duplicados dentro del partido.
/// - Cada jugador pertenece a uno de los dos equipos.
/// - La posesión inicial corresponde a uno de los dos equipos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    id: Uuid,
    team1_name: String,
    team2_name: String,
    players: Vec<Player>,
    starting_possession: String,
    status: GameStatus,
}

impl Game {
    /// Crea un partido nuevo a partir de dos nombres de equipo y las listas
    /// de nombres de jugadores por equipo (setup de la aplicación).
    ///
    /// # Errores
    /// Retorna `DomainError::ValidationError` si se viola cualquiera de los
    /// invariantes del roster.
    pub fn new(team1_name: &str,
               team2_name: &str,
               team1_players: &[&str],
               team2_players: &[&str],
               starting_possession: &str)
               -> Result<Self, DomainError> {
        let mut players = Vec::with_capacity(team1_players.len() + team2_players.len());
        for name in team1_players {
            players.push(Player::new(name, team1_name)?);
        }
        for name in team2_players {
            players.push(Player::new(name, team2_name)?);
        }
        Self::rehydrate(Uuid::new_v4(),
                        team1_name,
                        team2_name,
                        players,
                        starting_possession,
                        GameStatus::Active)
    }

    /// Reconstruye un partido desde almacenamiento aplicando las mismas
    /// validaciones que `new` (paridad in-memory ↔ durable).
    pub fn rehydrate(id: Uuid,
                     team1_name: &str,
                     team2_name: &str,
                     players: Vec<Player>,
                     starting_possession: &str,
                     status: GameStatus)
                     -> Result<Self, DomainError> {
        let team1_name = team1_name.trim();
        let team2_name = team2_name.trim();
        if team1_name.is_empty() || team2_name.is_empty() {
            return Err(DomainError::ValidationError("Los nombres de equipo no pueden estar vacíos".to_string()));
        }
        if team1_name == team2_name {
            return Err(DomainError::ValidationError(format!("Los dos equipos deben tener nombres distintos: {team1_name}")));
        }
        if !players.iter().any(|p| p.team() == team1_name) || !players.iter().any(|p| p.team() == team2_name) {
            return Err(DomainError::ValidationError("Cada equipo necesita al menos un jugador".to_string()));
        }
        // Validar duplicados por nombre y pertenencia a uno de los dos equipos
        let mut seen_names = HashSet::new();
        for player in &players {
            if !seen_names.insert(player.name().to_owned()) {
                return Err(DomainError::ValidationError(format!("Jugador duplicado en el partido: {}", player.name())));
            }
            if player.team() != team1_name && player.team() != team2_name {
                return Err(DomainError::ValidationError(format!("El jugador {} no pertenece a ninguno de los dos equipos",
                                                                player.name())));
            }
        }
        if starting_possession != team1_name && starting_possession != team2_name {
            return Err(DomainError::ValidationError(format!("La posesión inicial debe ser uno de los dos equipos: {starting_possession}")));
        }
        Ok(Game { id,
                  team1_name: team1_name.to_string(),
                  team2_name: team2_name.to_string(),
                  players,
                  starting_possession: starting_possession.to_string(),
                  status })
    }

    /// Cierra el partido. A partir de aquí el motor rechaza nuevos eventos.
    pub fn end(&mut self) {
        self.status = GameStatus::Ended;
    }

    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }

    // Getters
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn team1_name(&self) -> &str {
        &self.team1_name
    }

    pub fn team2_name(&self) -> &str {
        &self.team2_name
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn starting_possession(&self) -> &str {
        &self.starting_possession
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Busca un jugador del roster por id.
    pub fn player(&self, player_id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == player_id)
    }

    /// Equipo del jugador, si pertenece al roster.
    pub fn team_of(&self, player_id: Uuid) -> Option<&str> {
        self.player(player_id).map(|p| p.team())
    }

    /// Equipo contrario al dado. `None` si el nombre no es ninguno de los dos.
    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if team == self.team1_name {
            Some(&self.team2_name)
        } else if team == self.team2_name {
            Some(&self.team1_name)
        } else {
            None
        }
    }

    /// Jugadores de un equipo, en orden de roster.
    pub fn roster_of(&self, team: &str) -> Vec<&Player> {
        self.players.iter().filter(|p| p.team() == team).collect()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "{} vs {} ({} jugadores, {})",
               self.team1_name,
               self.team2_name,
               self.players.len(),
               self.status.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Game {
        Game::new("Halcones", "Tigres", &["A1", "A2", "A3"], &["B1", "B2"], "Halcones").unwrap()
    }

    #[test]
    fn test_game_creation() {
        let game = setup();
        assert_eq!(game.players().len(), 5);
        assert!(game.is_active());
        assert_eq!(game.starting_possession(), "Halcones");
        assert_eq!(game.roster_of("Tigres").len(), 2);
    }

    #[test]
    fn test_same_team_names_rejected() {
        let result = Game::new("Halcones", "Halcones", &["A1"], &["B1"], "Halcones");
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let result = Game::new("Halcones", "Tigres", &["A1", "A1"], &["B1"], "Halcones");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_roster_rejected() {
        let result = Game::new("Halcones", "Tigres", &[], &["B1"], "Halcones");
        assert!(result.is_err());
    }

    #[test]
    fn test_starting_possession_must_be_a_team() {
        let result = Game::new("Halcones", "Tigres", &["A1"], &["B1"], "Leones");
        assert!(result.is_err());
    }

    #[test]
    fn test_opponent_lookup() {
        let game = setup();
        assert_eq!(game.opponent_of("Halcones"), Some("Tigres"));
        assert_eq!(game.opponent_of("Tigres"), Some("Halcones"));
        assert_eq!(game.opponent_of("Leones"), None);
    }

    #[test]
    fn test_end_game() {
        let mut game = setup();
        game.end();
        assert!(!game.is_active());
        assert_eq!(game.status().as_str(), "ended");
    }
}
