//! Implementaciones Postgres (Diesel) de los traits del core.
//!
//! Objetivo general del módulo:
//! - Proveer una capa de persistencia durable (Postgres) con paridad 1:1
//!   respecto a los backends en memoria.
//! - Mantener determinismo del motor: el replay sobre los eventos leídos debe
//!   reconstruir exactamente el mismo estado de posesión y las mismas
//!   estadísticas.
//! - Aislar completamente el mapeo dominio ↔ filas de DB de `hoop-core`.
//!
//! Decisiones de la capa:
//! - `seq` es por partido y arranca en 0: se calcula dentro de la transacción
//!   de inserción (`max(seq) + 1` bajo disciplina de escritor único por
//!   partido), con PK compuesta `(game_id, seq)` que rechaza duplicados.
//! - `append_batch` inserta todos los borradores en UNA transacción: el par
//!   pérdida+robo queda contiguo o no queda en absoluto.
//! - Manejo básico de errores transitorios: reintento con backoff en
//!   escrituras y lecturas.
//! - `PgGameRepository` rehidrata el partido con `Game::rehydrate`, que aplica
//!   las mismas validaciones de roster que la creación.

use chrono::{DateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use serde_json::Value;
use uuid::Uuid;

use hoop_core::{classify_error, CoreError, EventDraft, EventPayload, EventStore, GameEngine, GameEvent, GameEventKind,
                GameRepository};
use hoop_domain::{Game, GameStatus, Player};
use log::{debug, error, warn};

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::{game_event_log, games, players, rejected_submissions};

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
///
/// Notas operativas:
/// - El pool se construye con `min_idle` (mínimo de conexiones inactivas) y
///   `max_size` (límite superior total).
/// - Al construirlo, se corre automáticamente el set de migraciones pendientes
///   (una sola vez).
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Este trait permite:
/// - Inyectar un pool real (producción/tests de integración).
/// - Simular/factorear en tests unitarios sin acoplar a r2d2.
///
/// Contrato:
/// - Debe devolver una conexión válida o
///   `PersistenceError::TransientIo`/equivalente en caso de error.
pub trait ConnectionProvider: Send + Sync + 'static {
    /// Obtiene una conexión lista para ejecutar consultas Diesel.
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}
impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Fila mapeada de la tabla `games` para lecturas.
#[derive(Queryable, Debug)]
pub struct GameRow {
    pub id: Uuid,
    pub team1_name: String,
    pub team2_name: String,
    pub starting_possession: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Fila para insertar en `games`. `created_at` lo asigna la base (DEFAULT
/// now()).
#[derive(Insertable, Debug)]
#[diesel(table_name = games)]
pub struct NewGameRow<'a> {
    pub id: Uuid,
    pub team1_name: &'a str,
    pub team2_name: &'a str,
    pub starting_possession: &'a str,
    pub status: &'a str,
}

/// Fila mapeada de la tabla `players` para lecturas.
#[derive(Queryable, Debug)]
pub struct PlayerRow {
    pub id: Uuid,
    pub game_id: Uuid,
    pub name: String,
    pub team: String,
}

/// Fila para insertar en `players`.
#[derive(Insertable, Debug)]
#[diesel(table_name = players)]
pub struct NewPlayerRow<'a> {
    pub id: Uuid,
    pub game_id: Uuid,
    pub name: &'a str,
    pub team: &'a str,
}

/// Fila mapeada de la tabla `game_event_log` para lecturas.
///
/// Campos:
/// - `game_id`: partido al que pertenece el evento.
/// - `seq`: orden autoritativo dentro del partido (0, 1, 2, ... sin huecos).
/// - `event_id`: identificador único del evento.
/// - `ts`: timestamp asignado por la base de datos (DEFAULT now()).
/// - `event_type`: pista/constraint (minúsculas) del tipo de evento.
/// - `clock_seconds`: reloj de juego reportado (sólo presentación).
/// - `possession`: equipo con posesión inmediatamente después del evento.
/// - `payload`: JSONB con la representación completa del enum `GameEventKind`.
#[derive(Queryable, Debug)]
pub struct EventRow {
    pub game_id: Uuid,
    pub seq: i64,
    pub event_id: Uuid,
    pub ts: DateTime<Utc>,
    pub event_type: String,
    pub clock_seconds: i32,
    pub possession: String,
    pub payload: Value,
}

/// Fila para insertar en `game_event_log`.
///
/// Se inserta siempre dentro de una transacción Diesel
/// (`build_transaction().read_write()`), con el `seq` calculado en la misma
/// transacción y el `ts` devuelto vía `RETURNING`.
#[derive(Insertable, Debug)]
#[diesel(table_name = game_event_log)]
pub struct NewEventRow<'a> {
    pub game_id: Uuid,
    pub seq: i64,
    pub event_id: Uuid,
    pub event_type: &'a str,
    pub clock_seconds: i32,
    pub possession: &'a str,
    pub payload: &'a Value,
}

/// Fila mapeada de la tabla `rejected_submissions` para lecturas.
#[derive(Queryable, Debug)]
pub struct RejectionRow {
    pub id: i64,
    pub game_id: Uuid,
    pub error_class: String,
    pub details: Option<Value>,
    pub ts: DateTime<Utc>,
}

/// Fila para insertar en `rejected_submissions`.
///
/// - `error_class`: clasificación gruesa ('validation', 'transition', ...).
/// - `details`: JSONB con el `CoreError` completo.
#[derive(Insertable, Debug)]
#[diesel(table_name = rejected_submissions)]
pub struct NewRejectionRow<'a> {
    pub game_id: Uuid,
    pub error_class: &'a str,
    pub details: Option<&'a Value>,
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
///
/// Cubre:
/// - Conflictos de serialización (deadlocks y nivel de aislamiento).
/// - Errores de IO transitorios de pool/conexión.
/// - Mensajes comunes de desconexión/timeout detectados por texto
///   (best-effort).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos mensajes de error (dependen de driver/pg) pueden llegar como Unknown
        // con texto. Hacemos best-effort string match sin acoplar a SQLSTATE.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry simple con backoff exponencial muy pequeño (hasta 3 intentos).
///
/// Política:
/// - Intentos: 3.
/// - Backoff: 15ms, 30ms, 45ms.
/// - Logs: se emite `warn!` por intento.
///
/// Garantías:
/// - No altera semántica de negocio; sólo repite la unidad de trabajo provista
///   por `f`.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms",
                      attempts + 1,
                      e,
                      delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

// SERIALIZACIÓN: guardamos el enum completo como JSON (payload), y además
// persistimos `event_type` (minúsculas) para cumplir constraint y facilitar
// ciertas consultas.
fn serialize_full_enum(kind: &GameEventKind) -> Value {
    serde_json::to_value(kind).expect("serialize GameEventKind")
}

/// Mapea la variante del enum a un string en minúsculas, estable en el tiempo.
fn event_type_for(kind: &GameEventKind) -> &'static str {
    match kind {
        GameEventKind::Shot { .. } => "shot",
        GameEventKind::Rebound { .. } => "rebound",
        GameEventKind::Steal { .. } => "steal",
        GameEventKind::Turnover { .. } => "turnover",
        GameEventKind::OutOfBounds => "outofbounds",
    }
}

/// Nombre legible de la variante del evento para logging/diagnóstico.
fn kind_variant_name(kind: &GameEventKind) -> &'static str {
    match kind {
        GameEventKind::Shot { .. } => "Shot",
        GameEventKind::Rebound { .. } => "Rebound",
        GameEventKind::Steal { .. } => "Steal",
        GameEventKind::Turnover { .. } => "Turnover",
        GameEventKind::OutOfBounds => "OutOfBounds",
    }
}

/// Deserializa una `EventRow` a `GameEvent`, utilizando el JSON completo del
/// enum almacenado en `payload`. Si por alguna razón el JSON no es válido,
/// emite `warn!` y devuelve `None` (el replay tolera la fila y sigue).
fn deserialize_full_enum(row: EventRow) -> Option<GameEvent> {
    let kind: GameEventKind = match serde_json::from_value(row.payload) {
        Ok(k) => k,
        Err(e) => {
            warn!("payload ilegible game_id={} seq={} err={e}", row.game_id, row.seq);
            return None;
        }
    };
    Some(GameEvent { seq: row.seq as u64,
                     game_id: row.game_id,
                     event_id: row.event_id,
                     kind,
                     clock_seconds: row.clock_seconds as u32,
                     possession_after: row.possession,
                     ts: row.ts })
}

/// Siguiente `seq` libre para un partido, calculado dentro de la transacción
/// de inserción. Bajo escritor único por partido esto es gap-free; si dos
/// escritores compitieran, la PK `(game_id, seq)` rechaza al perdedor.
fn next_seq_for(game_id: Uuid, conn: &mut PgConnection) -> Result<i64, diesel::result::Error> {
    let last: Option<i64> = game_event_log::table.filter(game_event_log::game_id.eq(game_id))
                                                 .select(max(game_event_log::seq))
                                                 .first(conn)?;
    Ok(last.map_or(0, |s| s + 1))
}

/// Implementación Postgres de `EventStore` (append-only).
///
/// Responsabilidades:
/// - `append`/`append_batch`: insertar eventos con seq por partido contiguo,
///   todo-o-nada para el batch.
/// - `list`: devolver todos los eventos de un partido ordenados por `seq`
///   (replay determinista).
pub struct PgEventStore<P: ConnectionProvider> {
    pub provider: P,
}
impl<P: ConnectionProvider> PgEventStore<P> {
    /// Crea un `PgEventStore` a partir de un `ConnectionProvider` (generalmente
    /// `PoolProvider`).
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> EventStore for PgEventStore<P> {
    fn append(&mut self, game_id: Uuid, draft: EventDraft) -> GameEvent {
        let mut evs = self.append_batch(game_id, vec![draft]);
        match evs.pop() {
            Some(ev) => ev,
            None => unreachable!("append_batch de un borrador devuelve un evento"),
        }
    }

    fn append_batch(&mut self, game_id: Uuid, drafts: Vec<EventDraft>) -> Vec<GameEvent> {
        if drafts.is_empty() {
            return Vec::new();
        }
        debug!("append_batch:start game_id={game_id} count={}", drafts.len());
        let encoded: Vec<(&'static str, Value)> =
            drafts.iter()
                  .map(|d| (event_type_for(&d.kind), serialize_full_enum(&d.kind)))
                  .collect();
        // Transacción atómica: seq base + inserción de todos los borradores.
        // - Si falla cualquiera de las inserciones, se revierte todo.
        // - Se usa retry/backoff para errores transitorios.
        let inserted: Vec<(i64, DateTime<Utc>)> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run(|tx_conn| {
                    let base = next_seq_for(game_id, tx_conn)?;
                    let mut out = Vec::with_capacity(drafts.len());
                    for (offset, (draft, enc)) in drafts.iter().zip(encoded.iter()).enumerate() {
                        let seq = base + offset as i64;
                        let ts: DateTime<Utc> = diesel::insert_into(game_event_log::table)
                            .values(NewEventRow { game_id,
                                                  seq,
                                                  event_id: draft.event_id,
                                                  event_type: enc.0,
                                                  clock_seconds: draft.clock_seconds as i32,
                                                  possession: &draft.possession_after,
                                                  payload: &enc.1 })
                            .returning(game_event_log::ts)
                            .get_result(tx_conn)?;
                        out.push((seq, ts));
                    }
                    Ok::<Vec<(i64, DateTime<Utc>)>, diesel::result::Error>(out)
                })
                .map_err(PersistenceError::from)
        })
        .expect("insert event batch");

        let events: Vec<GameEvent> = drafts.into_iter()
                                           .zip(inserted)
                                           .map(|(draft, (seq, ts))| GameEvent { seq: seq as u64,
                                                                                 game_id,
                                                                                 event_id: draft.event_id,
                                                                                 kind: draft.kind,
                                                                                 clock_seconds: draft.clock_seconds,
                                                                                 possession_after: draft.possession_after,
                                                                                 ts })
                                           .collect();
        for ev in &events {
            debug!("append_batch:done game_id={game_id} seq={} kind={}",
                   ev.seq,
                   kind_variant_name(&ev.kind));
        }
        events
    }

    fn list(&self, game_id: Uuid) -> Vec<GameEvent> {
        debug!("list:start game_id={game_id}");
        // Lectura robusta con retry ante fallos transitorios.
        let rows: Vec<EventRow> = with_retry(|| {
                                      let mut conn = self.provider.connection()?;
                                      let query = game_event_log::table.filter(game_event_log::game_id.eq(game_id))
                                                                       .order(game_event_log::seq.asc());
                                      query.load(&mut conn).map_err(PersistenceError::from)
                                  }).unwrap_or_else(|e| {
                                        error!("list:load error game_id={game_id} err={:?}", e);
                                        panic!("diesel load error: {e}");
                                    });
        let events: Vec<GameEvent> = rows.into_iter().filter_map(deserialize_full_enum).collect();
        debug!("list:done game_id={game_id} count={}", events.len());
        events
    }
}

impl<P: ConnectionProvider> PgEventStore<P> {
    /// Registra un envío rechazado para auditoría. No participa del log de
    /// eventos: un rechazo nunca toca `game_event_log`.
    pub fn record_rejection(&self, game_id: Uuid, err: &CoreError) {
        let error_class = classify_error(err).as_str();
        let details = serde_json::to_value(err).ok();
        let result = with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(rejected_submissions::table)
                .values(NewRejectionRow { game_id,
                                          error_class,
                                          details: details.as_ref() })
                .execute(&mut conn)
                .map_err(PersistenceError::from)
        });
        if let Err(e) = result {
            error!("record_rejection:insert error game_id={game_id} err={:?}", e);
        }
    }

    /// Lista rechazos auditados para un partido, ordenados por ts. Se
    /// alimenta de `submit_with_audit` (o de `record_rejection` directo).
    pub fn list_rejections(&self, game_id: Uuid) -> Vec<RejectionRow> {
        debug!("list_rejections:start game_id={game_id}");
        let rows: Vec<RejectionRow> = with_retry(|| {
                                          let mut conn = self.provider.connection()?;
                                          let query =
                                              rejected_submissions::table.filter(rejected_submissions::game_id.eq(game_id))
                                                                         .order(rejected_submissions::ts.asc());
                                          query.load(&mut conn).map_err(PersistenceError::from)
                                      }).unwrap_or_else(|e| {
                                            error!("list_rejections:load error game_id={game_id} err={:?}", e);
                                            vec![]
                                        });
        debug!("list_rejections:done game_id={game_id} count={}", rows.len());
        rows
    }
}

/// Envía un candidato a través del motor y, si es rechazado, deja el
/// rechazo auditado en `rejected_submissions` antes de propagar el error.
///
/// El log de eventos queda exactamente como estaba en el caso de error: la
/// auditoría es una tabla aparte y nunca toca `game_event_log`.
pub fn submit_with_audit<P, R>(engine: &mut GameEngine<PgEventStore<P>, R>,
                               game_id: Uuid,
                               payload: &EventPayload)
                               -> Result<Vec<GameEvent>, CoreError>
    where P: ConnectionProvider,
          R: GameRepository
{
    match engine.submit_event(game_id, payload) {
        Ok(events) => Ok(events),
        Err(err) => {
            engine.event_store().record_rejection(game_id, &err);
            Err(err)
        }
    }
}

/// Implementación Postgres de `GameRepository`.
///
/// `load` rehidrata con `Game::rehydrate`, que re-aplica los invariantes de
/// roster: una fila corrupta nunca produce un partido inválido en memoria
/// (se loguea y se devuelve `None`).
pub struct PgGameRepository<P: ConnectionProvider> {
    pub provider: P,
}
impl<P: ConnectionProvider> PgGameRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> GameRepository for PgGameRepository<P> {
    fn load(&self, game_id: Uuid) -> Option<Game> {
        let row: Option<GameRow> = with_retry(|| {
                                       let mut conn = self.provider.connection()?;
                                       games::table.find(game_id)
                                                   .first::<GameRow>(&mut conn)
                                                   .optional()
                                                   .map_err(PersistenceError::from)
                                   }).unwrap_or_else(|e| {
                                         error!("load:game error game_id={game_id} err={:?}", e);
                                         None
                                     });
        let row = row?;
        let player_rows: Vec<PlayerRow> = with_retry(|| {
                                              let mut conn = self.provider.connection()?;
                                              players::table.filter(players::game_id.eq(game_id))
                                                            .order(players::name.asc())
                                                            .load(&mut conn)
                                                            .map_err(PersistenceError::from)
                                          }).unwrap_or_else(|e| {
                                                error!("load:players error game_id={game_id} err={:?}", e);
                                                vec![]
                                            });
        let status = match GameStatus::parse(&row.status) {
            Ok(s) => s,
            Err(e) => {
                error!("load:status ilegible game_id={game_id} err={e}");
                return None;
            }
        };
        let mut roster = Vec::with_capacity(player_rows.len());
        for p in player_rows {
            match Player::with_id(p.id, &p.name, &p.team) {
                Ok(player) => roster.push(player),
                Err(e) => {
                    error!("load:fila de jugador inválida game_id={game_id} err={e}");
                    return None;
                }
            }
        }
        match Game::rehydrate(row.id,
                              &row.team1_name,
                              &row.team2_name,
                              roster,
                              &row.starting_possession,
                              status)
        {
            Ok(game) => Some(game),
            Err(e) => {
                error!("load:rehydrate error game_id={game_id} err={e}");
                None
            }
        }
    }

    fn save(&mut self, game: &Game) {
        debug!("save:start game_id={}", game.id());
        // Upsert del partido + alta idempotente del roster en una transacción.
        // El roster es inmutable tras el setup: sólo `status` es actualizable.
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run(|tx_conn| {
                    diesel::insert_into(games::table)
                        .values(NewGameRow { id: game.id(),
                                             team1_name: game.team1_name(),
                                             team2_name: game.team2_name(),
                                             starting_possession: game.starting_possession(),
                                             status: game.status().as_str() })
                        .on_conflict(games::id)
                        .do_update()
                        .set(games::status.eq(game.status().as_str()))
                        .execute(tx_conn)?;
                    for player in game.players() {
                        diesel::insert_into(players::table)
                            .values(NewPlayerRow { id: player.id(),
                                                   game_id: game.id(),
                                                   name: player.name(),
                                                   team: player.team() })
                            .on_conflict_do_nothing()
                            .execute(tx_conn)?;
                    }
                    Ok::<(), diesel::result::Error>(())
                })
                .map_err(PersistenceError::from)
        })
        .expect("persist game");
        debug!("save:done game_id={}", game.id());
    }
}

/// Construye un pool Postgres r2d2 a partir de URL.
///
/// Comportamiento:
/// - Valida y ajusta tamaños (si `min_size > max_size`, usa `min_size =
///   max_size`).
/// - Ejecuta migraciones inmediatamente tras el primer `get()`.
/// - Devuelve `PersistenceError::TransientIo` ante errores del pool/manager.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = if min_size == 0 { 1 } else { min_size };
    let validated_max = if max_size == 0 { 1 } else { max_size };
    if validated_min > validated_max {
        eprintln!("WARN: min_size > max_size ({} > {}), ajustando min=max",
                  validated_min, validated_max);
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    // Ejecutar migraciones una sola vez al construir (primer connection checkout).
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Helper de desarrollo: carga `.env`, lee configuración (DATABASE_URL,
/// tamaños) y construye un pool ya migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env();
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}
