//! hoop-persistence
//!
//! Implementaciones Postgres (Diesel) de los colaboradores del core:
//! `EventStore` durable sobre `game_event_log` y `GameRepository` sobre
//! `games`/`players`, más utilidades de conexión y migraciones embebidas.
//! El contrato observable es idéntico al de los backends en memoria: mismo
//! orden de eventos, mismos seq por partido, misma rehidratación de roster.
//!
//! Módulos:
//! - `pg`: implementaciones sobre Postgres (log append-only y repositorio).
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::init_dotenv;
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, submit_with_audit, ConnectionProvider, PgEventStore, PgGameRepository, PgPool,
             PoolProvider};
