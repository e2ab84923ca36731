use hoop_core::{CoreError, EventPayload, GameEngine, GameEventKind, ShotResult, ShotType};
use hoop_domain::Game;
use uuid::Uuid;

fn setup() -> (GameEngine<hoop_core::InMemoryEventStore, hoop_core::InMemoryGameRepository>, Uuid, Game) {
    let game = Game::new("Halcones",
                         "Tigres",
                         &["A1", "A2", "A3"],
                         &["B1", "B2", "B3"],
                         "Halcones").expect("setup de partido válido");
    let mut engine = GameEngine::in_memory();
    let game_id = engine.register_game(game.clone());
    (engine, game_id, game)
}

fn pid(game: &Game, name: &str) -> Uuid {
    game.players().iter().find(|p| p.name() == name).unwrap().id()
}

// Escenario completo: tiro encestado, fallo + rebote defensivo, pérdida
// robada. Verifica posesión final, log y agregado.
#[test]
fn full_game_scenario() {
    let (mut engine, game_id, game) = setup();

    // (1) A1 encesta de dos → posesión Tigres
    engine.submit_event(game_id, &EventPayload::shot(pid(&game, "A1"), "2pt", "make", 15))
          .expect("tiro encestado");
    assert_eq!(engine.possession_for(game_id).unwrap(), "Tigres");

    // (2) B1 falla de tres → fallo pendiente, posesión sigue en Tigres
    engine.submit_event(game_id, &EventPayload::shot(pid(&game, "B1"), "3pt", "miss", 40))
          .expect("tiro fallado");
    assert_eq!(engine.possession_for(game_id).unwrap(), "Tigres");
    assert!(engine.possession_state_for(game_id).unwrap().pending_miss.is_some());

    // (3) A2 rebotea (defensivo: equipo contrario al tirador) → posesión Halcones
    let accepted = engine.submit_event(game_id, &EventPayload::simple("rebound", pid(&game, "A2"), 43))
                         .expect("rebote");
    assert!(matches!(accepted[0].kind,
                     GameEventKind::Rebound { rebound_type: hoop_core::ReboundType::Defensive, .. }));
    assert_eq!(engine.possession_for(game_id).unwrap(), "Halcones");

    // (4) A3 pierde el balón, robado por B2 → posesión Tigres, par en el log
    let accepted = engine.submit_event(game_id,
                                       &EventPayload::turnover_stolen_by(pid(&game, "A3"), pid(&game, "B2"), 70))
                         .expect("pérdida robada");
    assert_eq!(accepted.len(), 2);
    assert_eq!(engine.possession_for(game_id).unwrap(), "Tigres");

    // Log completo, en orden de seq sin huecos
    let events = engine.events_for(game_id).unwrap();
    assert_eq!(events.len(), 5);
    for (expected_seq, ev) in (0u64..).zip(events.iter()) {
        assert_eq!(ev.seq, expected_seq);
    }

    // Agregado final: exactamente los conteos del guion, resto en cero
    let tallies = engine.stats_for(game_id).unwrap();
    assert_eq!(tallies[&pid(&game, "A1")].two_pt_made, 1);
    assert_eq!(tallies[&pid(&game, "A2")].rebounds, 1);
    assert_eq!(tallies[&pid(&game, "A3")].turnovers, 1);
    assert_eq!(tallies[&pid(&game, "B1")].three_pt_missed, 1);
    assert_eq!(tallies[&pid(&game, "B2")].steals, 1);
    assert_eq!(tallies[&pid(&game, "B3")], hoop_core::PlayerStats::default());

    let totals = engine.team_totals_for(game_id).unwrap();
    assert_eq!(totals["Halcones"].points(), 2);
    assert_eq!(totals["Tigres"].points(), 0);
}

// Un rechazo no deja rastro: ni en el log ni en la posesión.
#[test]
fn rejection_leaves_state_untouched() {
    let (mut engine, game_id, game) = setup();
    engine.submit_event(game_id, &EventPayload::shot(pid(&game, "A1"), "2pt", "make", 10))
          .unwrap();
    let events_before = engine.events_for(game_id).unwrap();
    let possession_before = engine.possession_for(game_id).unwrap();

    // Rebote sin fallo pendiente → InvalidTransition
    let result = engine.submit_event(game_id, &EventPayload::simple("rebound", pid(&game, "B1"), 12));
    assert!(matches!(result, Err(CoreError::InvalidTransition(_))));

    assert_eq!(engine.events_for(game_id).unwrap(), events_before);
    assert_eq!(engine.possession_for(game_id).unwrap(), possession_before);
}

// El par pérdida+robo comparte posesión resultante y queda contiguo.
#[test]
fn steal_pair_is_appended_atomically() {
    let (mut engine, game_id, game) = setup();
    engine.submit_event(game_id,
                        &EventPayload::turnover_stolen_by(pid(&game, "A1"), pid(&game, "B1"), 5))
          .unwrap();
    let events = engine.events_for(game_id).unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0].kind, GameEventKind::Turnover { .. }));
    assert!(matches!(events[1].kind, GameEventKind::Steal { .. }));
    assert_eq!(events[0].possession_after, "Tigres");
    assert_eq!(events[1].possession_after, "Tigres");
    assert_eq!(events[1].seq, events[0].seq + 1);
}

#[test]
fn ended_game_rejects_submissions() {
    let (mut engine, game_id, game) = setup();
    engine.end_game(game_id).unwrap();
    let result = engine.submit_event(game_id, &EventPayload::shot(pid(&game, "A1"), "2pt", "make", 10));
    assert!(matches!(result, Err(CoreError::GameNotActive)));
    assert!(engine.events_for(game_id).unwrap().is_empty());
}

#[test]
fn unknown_game_is_rejected() {
    let (mut engine, _game_id, game) = setup();
    let ghost = Uuid::new_v4();
    let result = engine.submit_event(ghost, &EventPayload::shot(pid(&game, "A1"), "2pt", "make", 10));
    assert!(matches!(result, Err(CoreError::UnknownGame(g)) if g == ghost));
}

// Partidos distintos no comparten estado: ni log ni posesión.
#[test]
fn games_are_isolated() {
    let (mut engine, game_a, game) = setup();
    let other = Game::new("Osos", "Lobos", &["C1"], &["D1"], "Lobos").unwrap();
    let c1 = other.players()[0].id();
    let game_b = engine.register_game(other);

    engine.submit_event(game_a, &EventPayload::shot(pid(&game, "A1"), "3pt", "make", 9)).unwrap();
    engine.submit_event(game_b, &EventPayload::shot(c1, "2pt", "make", 11)).unwrap();

    assert_eq!(engine.events_for(game_a).unwrap().len(), 1);
    assert_eq!(engine.events_for(game_b).unwrap().len(), 1);
    assert_eq!(engine.possession_for(game_a).unwrap(), "Tigres");
    assert_eq!(engine.possession_for(game_b).unwrap(), "Lobos");

    // Un fallo pendiente en A no bloquea envíos en B
    engine.submit_event(game_a, &EventPayload::shot(pid(&game, "B1"), "2pt", "miss", 20)).unwrap();
    assert!(engine.submit_event(game_b, &EventPayload::simple("turnover", c1, 30)).is_ok());
}

// Tras reconstruir el motor sobre el mismo store, el estado (incluido el
// fallo pendiente) se re-deriva del log.
#[test]
fn state_survives_engine_rebuild() {
    let game = Game::new("Halcones", "Tigres", &["A1"], &["B1"], "Halcones").unwrap();
    let a1 = game.players()[0].id();
    let b1 = game.players()[1].id();

    let mut engine = GameEngine::in_memory();
    let game_id = engine.register_game(game.clone());
    engine.submit_event(game_id, &EventPayload::shot(a1, "2pt", "miss", 10)).unwrap();

    // "Reinicio": motor nuevo sobre los mismos stores
    let (store, repo) = engine.into_stores();
    let mut engine = GameEngine::new_with_stores(store, repo);
    let state = engine.possession_state_for(game.id()).unwrap();
    assert!(state.pending_miss.is_some());
    // El nuevo motor sigue exigiendo resolver el fallo
    let result = engine.submit_event(game.id(), &EventPayload::shot(b1, "2pt", "make", 12));
    assert!(matches!(result, Err(CoreError::InvalidTransition(_))));
    assert!(engine.submit_event(game.id(), &EventPayload::simple("rebound", b1, 13)).is_ok());
}
