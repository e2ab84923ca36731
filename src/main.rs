//! Demo de punta a punta del tracker: arma un partido, envía el guion de
//! eventos contra el motor en memoria y muestra log, marcador y box score.
//! Con `--features pg_demo` repite el guion contra Postgres (DATABASE_URL).

use hoop_core::display::{describe, format_clock, newest_first};
use hoop_core::{CoreError, EventPayload, EventStore, GameEngine, GameRepository};
use hoop_domain::Game;
use uuid::Uuid;

fn pid(game: &Game, name: &str) -> Uuid {
    game.players()
        .iter()
        .find(|p| p.name() == name)
        .map(|p| p.id())
        .unwrap_or_else(Uuid::new_v4)
}

/// Guion de demo: canasta, fallo + rebote defensivo y pérdida robada.
fn run_script<S, R>(engine: &mut GameEngine<S, R>, game: &Game) -> Result<(), CoreError>
    where S: EventStore,
          R: GameRepository
{
    let game_id = engine.register_game(game.clone());

    engine.submit_event(game_id, &EventPayload::shot(pid(game, "A1"), "2pt", "make", 15))?;
    engine.submit_event(game_id, &EventPayload::shot(pid(game, "B1"), "3pt", "miss", 40))?;
    engine.submit_event(game_id, &EventPayload::simple("rebound", pid(game, "A2"), 43))?;
    engine.submit_event(game_id,
                        &EventPayload::turnover_stolen_by(pid(game, "A3"), pid(game, "B2"), 70))?;
    Ok(())
}

/// Envío ilegal para la demo: rebote sin fallo pendiente.
fn illegal_rebound(game: &Game) -> EventPayload {
    EventPayload::simple("rebound", pid(game, "B3"), 80)
}

fn print_report<S, R>(engine: &GameEngine<S, R>, game: &Game) -> Result<(), CoreError>
    where S: EventStore,
          R: GameRepository
{
    let game_id = game.id();
    println!("\n{game}");

    println!("\n-- Log (más reciente primero) --");
    let events = engine.events_for(game_id)?;
    for ev in newest_first(&events) {
        println!("[{}] {}  (posesión: {})",
                 format_clock(ev.clock_seconds),
                 describe(ev, game),
                 ev.possession_after);
    }

    println!("\n-- Marcador --");
    let totals = engine.team_totals_for(game_id)?;
    for team in [game.team1_name(), game.team2_name()] {
        let points = totals.get(team).map(|t| t.points()).unwrap_or(0);
        println!("{team}: {points}");
    }
    println!("posesión: {}", engine.possession_for(game_id)?);

    println!("\n-- Box score --");
    let tallies = engine.stats_for(game_id)?;
    for team in [game.team1_name(), game.team2_name()] {
        println!("== {team} ==");
        for player in game.roster_of(team) {
            if let Some(t) = tallies.get(&player.id()) {
                println!("{:<6} pts={} reb={} stl={} to={} FGA={}",
                         player.name(),
                         t.points(),
                         t.rebounds,
                         t.steals,
                         t.turnovers,
                         t.field_goal_attempts());
            }
        }
    }
    Ok(())
}

#[cfg(feature = "pg_demo")]
fn run_pg_demo(game: &Game) -> Result<(), Box<dyn std::error::Error>> {
    use hoop_persistence::{build_dev_pool_from_env, submit_with_audit, PgEventStore, PgGameRepository, PoolProvider};

    println!("\n=== Demo Postgres (DATABASE_URL) ===");
    let pool = build_dev_pool_from_env()?;
    let store = PgEventStore::new(PoolProvider { pool: pool.clone() });
    let repo = PgGameRepository::new(PoolProvider { pool });
    let mut engine = GameEngine::new_with_stores(store, repo);
    run_script(&mut engine, game)?;

    // Envío ilegal con auditoría durable: el rechazo queda registrado en
    // rejected_submissions sin tocar el log.
    match submit_with_audit(&mut engine, game.id(), &illegal_rebound(game)) {
        Err(CoreError::InvalidTransition(reason)) => println!("(rechazado y auditado: {reason})"),
        other => println!("(inesperado: {other:?})"),
    }
    print_report(&engine, game)?;
    println!("rechazos auditados: {}", engine.event_store().list_rejections(game.id()).len());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let game = Game::new("Halcones",
                         "Tigres",
                         &["A1", "A2", "A3"],
                         &["B1", "B2", "B3"],
                         "Halcones")?;

    println!("=== Demo en memoria ===");
    let mut engine = GameEngine::in_memory();
    run_script(&mut engine, &game)?;

    // Rebote sin fallo pendiente: rechazado, el log queda intacto
    match engine.submit_event(game.id(), &illegal_rebound(&game)) {
        Err(CoreError::InvalidTransition(reason)) => println!("(rechazado como se esperaba: {reason})"),
        other => println!("(inesperado: {other:?})"),
    }
    print_report(&engine, &game)?;

    #[cfg(feature = "pg_demo")]
    {
        // Partido fresco para el backend durable, para no mezclar logs
        let pg_game = Game::new("Halcones",
                                "Tigres",
                                &["A1", "A2", "A3"],
                                &["B1", "B2", "B3"],
                                "Halcones")?;
        run_pg_demo(&pg_game)?;
    }

    Ok(())
}
