use hoop_core::display::{describe, format_clock, newest_first};
use hoop_core::{GameEngine, PlayerStats};
use hoop_domain::Game;
use hoop_persistence::{build_dev_pool_from_env, PgEventStore, PgGameRepository, PoolProvider};
use uuid::Uuid;

type PgEngine = GameEngine<PgEventStore<PoolProvider>, PgGameRepository<PoolProvider>>;

// CLI mínima de consulta contra el backend persistente:
//   hoop log --game <UUID>
//   hoop stats --game <UUID>
//   hoop score --game <UUID>
//   hoop rejections --game <UUID>
fn main() {
    // Cargar .env si existe para obtener DATABASE_URL
    let _ = dotenvy::dotenv();
    let args: Vec<String> = std::env::args().collect();
    let command = match args.get(1).map(|s| s.as_str()) {
        Some(c @ ("log" | "stats" | "score" | "rejections")) => c,
        _ => {
            eprintln!("Uso: hoop <log|stats|score|rejections> --game <UUID>");
            std::process::exit(2);
        }
    };

    let mut game: Option<Uuid> = None;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--game" => {
                i += 1;
                if i < args.len() { game = Uuid::parse_str(&args[i]).ok(); }
            }
            _ => {}
        }
        i += 1;
    }
    let game_id = match game {
        Some(id) => id,
        None => {
            eprintln!("Uso: hoop {command} --game <UUID>");
            std::process::exit(2);
        }
    };

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("[hoop {command}] requiere DATABASE_URL para operar contra backend persistente");
        std::process::exit(4);
    }
    let pool = match build_dev_pool_from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[hoop {command}] pool error: {e}");
            std::process::exit(5);
        }
    };
    let event_store = PgEventStore::new(PoolProvider { pool: pool.clone() });
    let repo = PgGameRepository::new(PoolProvider { pool });
    let engine: PgEngine = GameEngine::new_with_stores(event_store, repo);

    let loaded = match engine.game(game_id) {
        Ok(g) => g,
        Err(_) => {
            eprintln!("[hoop {command}] partido no encontrado: {game_id}");
            std::process::exit(4);
        }
    };

    match command {
        "log" => print_log(&engine, &loaded, game_id),
        "stats" => print_stats(&engine, &loaded, game_id),
        "score" => print_score(&engine, &loaded, game_id),
        "rejections" => print_rejections(engine, game_id),
        _ => unreachable!(),
    }
}

/// Log del partido, más reciente primero (vista de marcador en vivo).
fn print_log(engine: &PgEngine, game: &Game, game_id: Uuid) {
    let events = match engine.events_for(game_id) {
        Ok(evs) => evs,
        Err(e) => {
            eprintln!("[hoop log] error: {e}");
            std::process::exit(5);
        }
    };
    println!("{game}");
    for ev in newest_first(&events) {
        println!("[{}] {}  (posesión: {})",
                 format_clock(ev.clock_seconds),
                 describe(ev, game),
                 ev.possession_after);
    }
}

fn stat_line(name: &str, tallies: &PlayerStats) -> String {
    format!("{:<16} pts={:<3} 2PM={} 2PA-f={} 3PM={} 3PA-f={} reb={} stl={} to={}",
            name,
            tallies.points(),
            tallies.two_pt_made,
            tallies.two_pt_missed,
            tallies.three_pt_made,
            tallies.three_pt_missed,
            tallies.rebounds,
            tallies.steals,
            tallies.turnovers)
}

/// Box score por equipo, con todos los jugadores del roster (en cero si no
/// registraron eventos).
fn print_stats(engine: &PgEngine, game: &Game, game_id: Uuid) {
    let tallies = match engine.stats_for(game_id) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("[hoop stats] error: {e}");
            std::process::exit(5);
        }
    };
    for team in [game.team1_name(), game.team2_name()] {
        println!("== {team} ==");
        for player in game.roster_of(team) {
            if let Some(stats) = tallies.get(&player.id()) {
                println!("{}", stat_line(player.name(), stats));
            }
        }
    }
}

/// Marcador por equipos y posesión vigente.
fn print_score(engine: &PgEngine, game: &Game, game_id: Uuid) {
    let totals = match engine.team_totals_for(game_id) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("[hoop score] error: {e}");
            std::process::exit(5);
        }
    };
    let possession = match engine.possession_for(game_id) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[hoop score] error: {e}");
            std::process::exit(5);
        }
    };
    for team in [game.team1_name(), game.team2_name()] {
        let points = totals.get(team).map(|t| t.points()).unwrap_or(0);
        println!("{team}: {points}");
    }
    println!("posesión: {possession}");
}

/// Rechazos auditados del partido (clase + detalle JSON).
fn print_rejections(engine: PgEngine, game_id: Uuid) {
    // La tabla de auditoría es propia del backend Postgres; se consulta
    // directamente sobre el store subyacente.
    let (store, _repo) = engine.into_stores();
    for row in store.list_rejections(game_id) {
        let details = row.details
                         .map(|d| d.to_string())
                         .unwrap_or_else(|| "{}".to_string());
        println!("[{}] {} {}", row.ts, row.error_class, details);
    }
}
