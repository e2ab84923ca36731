use std::collections::HashMap;
use chrono::Utc;
use uuid::Uuid;

use super::{EventDraft, GameEvent, GameEventKind, ShotResult};

/// Almacenamiento de eventos append-only, particionado por partido.
///
/// Contrato:
/// - `seq` por partido estrictamente creciente desde 0, sin huecos.
/// - Nunca se reescribe ni reordena una entrada previa.
/// - `append_batch` es todo-o-nada: o se persisten todos los borradores en
///   orden, o ninguno (par pérdida+robo de la máquina de posesión).
pub trait EventStore {
    /// Agrega un evento a partir de su borrador y devuelve el evento completo
    /// (con seq y ts asignados).
    fn append(&mut self, game_id: Uuid, draft: EventDraft) -> GameEvent;
    /// Agrega varios borradores de forma atómica, en orden, con seqs
    /// consecutivos.
    fn append_batch(&mut self, game_id: Uuid, drafts: Vec<EventDraft>) -> Vec<GameEvent>;
    /// Lista eventos de un partido (orden ascendente por seq).
    fn list(&self, game_id: Uuid) -> Vec<GameEvent>;

    /// Fallo de tiro sin resolver más reciente, si lo hay.
    ///
    /// Un fallo sólo puede quedar pendiente como último evento del log: el
    /// motor rechaza cualquier otro evento hasta que un rebote o un
    /// fuera-de-banda lo resuelva.
    fn pending_miss(&self, game_id: Uuid) -> Option<GameEvent> {
        self.list(game_id).into_iter().last().filter(|ev| {
                                                  matches!(ev.kind,
                                                           GameEventKind::Shot { result: ShotResult::Miss, .. })
                                              })
    }
}


pub struct InMemoryEventStore { pub inner: HashMap<Uuid, Vec<GameEvent>> }

impl Default for InMemoryEventStore { fn default() -> Self { Self { inner: HashMap::new() } } }

impl EventStore for InMemoryEventStore {
    fn append(&mut self, game_id: Uuid, draft: EventDraft) -> GameEvent {
        let vec = self.inner.entry(game_id).or_insert_with(Vec::new);
        let seq = vec.len() as u64;
        let ev = GameEvent { seq,
                             game_id,
                             event_id: draft.event_id,
                             kind: draft.kind,
                             clock_seconds: draft.clock_seconds,
                             possession_after: draft.possession_after,
                             ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    fn append_batch(&mut self, game_id: Uuid, drafts: Vec<EventDraft>) -> Vec<GameEvent> {
        // En memoria el batch es trivialmente atómico: un único push por
        // borrador dentro de la misma llamada, sin punto de fallo intermedio.
        drafts.into_iter().map(|d| self.append(game_id, d)).collect()
    }

    fn list(&self, game_id: Uuid) -> Vec<GameEvent> {
        self.inner.get(&game_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ShotType;

    fn miss_draft(player_id: Uuid) -> EventDraft {
        EventDraft::new(GameEventKind::Shot { player_id,
                                             shot_type: ShotType::TwoPt,
                                             result: ShotResult::Miss },
                        30,
                        "Halcones")
    }

    #[test]
    fn seq_is_contiguous_per_game() {
        let mut store = InMemoryEventStore::default();
        let game_a = Uuid::new_v4();
        let game_b = Uuid::new_v4();
        for _ in 0..3 {
            store.append(game_a, EventDraft::new(GameEventKind::OutOfBounds, 10, "Halcones"));
        }
        store.append(game_b, EventDraft::new(GameEventKind::OutOfBounds, 10, "Tigres"));
        let seqs: Vec<u64> = store.list(game_a).iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        // Partidos independientes: cada uno arranca en 0
        assert_eq!(store.list(game_b)[0].seq, 0);
    }

    #[test]
    fn batch_assigns_consecutive_seqs() {
        let mut store = InMemoryEventStore::default();
        let game_id = Uuid::new_v4();
        let player = Uuid::new_v4();
        let stealer = Uuid::new_v4();
        let evs = store.append_batch(game_id,
                                     vec![EventDraft::new(GameEventKind::Turnover { player_id: player }, 40, "Tigres"),
                                          EventDraft::new(GameEventKind::Steal { player_id: stealer }, 40, "Tigres")]);
        assert_eq!(evs.len(), 2);
        assert_eq!(evs[0].seq, 0);
        assert_eq!(evs[1].seq, 1);
        assert_eq!(evs[0].possession_after, evs[1].possession_after);
    }

    #[test]
    fn pending_miss_is_last_event_only() {
        let mut store = InMemoryEventStore::default();
        let game_id = Uuid::new_v4();
        let shooter = Uuid::new_v4();
        store.append(game_id, miss_draft(shooter));
        assert!(store.pending_miss(game_id).is_some());

        // Resuelto por rebote: ya no hay fallo pendiente
        store.append(game_id,
                     EventDraft::new(GameEventKind::Rebound { player_id: Uuid::new_v4(),
                                                              rebound_type: crate::event::ReboundType::Defensive },
                                     35,
                                     "Tigres"));
        assert!(store.pending_miss(game_id).is_none());
    }
}
