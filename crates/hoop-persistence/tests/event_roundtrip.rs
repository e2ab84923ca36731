use hoop_core::{EventDraft, EventStore, GameEventKind, ReboundType, ShotResult, ShotType};
use hoop_persistence::config::DbConfig;
use hoop_persistence::pg::{build_pool, PgEventStore, PoolProvider};
use uuid::Uuid;

// Cada variante del enum sobrevive el viaje por JSONB: lo que se lee es
// exactamente lo que se escribió (kind, reloj y posesión incluidos).
#[test]
fn every_kind_survives_jsonb_roundtrip() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip every_kind_survives_jsonb_roundtrip (no DATABASE_URL)");
        return;
    }
    let cfg = DbConfig::from_env();
    let pool = build_pool(&cfg.url, 1, 1).expect("pool");
    let mut store = PgEventStore::new(PoolProvider { pool });
    let game_id = Uuid::new_v4();
    let shooter = Uuid::new_v4();
    let rebounder = Uuid::new_v4();

    let kinds = vec![GameEventKind::Shot { player_id: shooter,
                                          shot_type: ShotType::ThreePt,
                                          result: ShotResult::Miss },
                     GameEventKind::Rebound { player_id: rebounder,
                                              rebound_type: ReboundType::Offensive },
                     GameEventKind::Steal { player_id: rebounder },
                     GameEventKind::Turnover { player_id: shooter },
                     GameEventKind::OutOfBounds];

    for (i, kind) in kinds.iter().enumerate() {
        store.append(game_id, EventDraft::new(kind.clone(), 60 + i as u32, "Tigres"));
    }

    let events = store.list(game_id);
    assert_eq!(events.len(), kinds.len());
    for (i, (ev, kind)) in events.iter().zip(kinds.iter()).enumerate() {
        assert_eq!(&ev.kind, kind, "kind en seq {i} debe sobrevivir el roundtrip");
        assert_eq!(ev.clock_seconds, 60 + i as u32);
        assert_eq!(ev.possession_after, "Tigres");
        assert_eq!(ev.game_id, game_id);
    }
    std::mem::forget(store);
}

// El par pérdida+robo se inserta en una sola transacción: seqs consecutivos
// y misma posesión resultante.
#[test]
fn batch_lands_contiguous() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip batch_lands_contiguous (no DATABASE_URL)");
        return;
    }
    let cfg = DbConfig::from_env();
    let pool = build_pool(&cfg.url, 1, 1).expect("pool");
    let mut store = PgEventStore::new(PoolProvider { pool });
    let game_id = Uuid::new_v4();
    let loser = Uuid::new_v4();
    let stealer = Uuid::new_v4();

    let accepted = store.append_batch(game_id,
                                      vec![EventDraft::new(GameEventKind::Turnover { player_id: loser }, 80, "Tigres"),
                                           EventDraft::new(GameEventKind::Steal { player_id: stealer }, 80, "Tigres")]);
    assert_eq!(accepted.len(), 2);
    assert_eq!(accepted[1].seq, accepted[0].seq + 1);

    let events = store.list(game_id);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0].kind, GameEventKind::Turnover { .. }));
    assert!(matches!(events[1].kind, GameEventKind::Steal { .. }));
    assert_eq!(events[0].possession_after, events[1].possession_after);
    std::mem::forget(store);
}
