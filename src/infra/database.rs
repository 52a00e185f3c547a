//! For interacting with the database.

use super::{config::DatabaseConfig, error::InternalError};
use sqlx::{
    pool::PoolOptions,
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions, PgPool, Postgres, Transaction,
};
use std::time::Duration;
use tracing::log::LevelFilter;

/// A common transaction type.
/// Use this for the persistence layer.
pub type Tx = Transaction<'static, Postgres>;

/// A common database pool type.
pub type DbPool = PgPool;

/// Connects to the database based on some configuration.
pub fn init_db(config: &DatabaseConfig) -> DbPool {
    let db_options = PgConnectOptions::default()
        .username(&config.username)
        .password(&config.password)
        .host(&config.host)
        .port(config.port)
        .database(&config.database_name)
        .ssl_mode(PgSslMode::Prefer)
        .log_statements(LevelFilter::Debug);
    PoolOptions::default()
        .acquire_timeout(Duration::from_secs(5))
        .min_connections(1)
        .max_connections(100)
        .connect_lazy_with(db_options)
}

/// Brings the schema up to date.
#[tracing::instrument(skip(db))]
pub async fn migrate(db: &DbPool) -> Result<(), InternalError> {
    tracing::info!("Running migrations");
    sqlx::migrate!().run(db).await?;
    Ok(())
}

/// Lists and items stored in PostgreSQL.
///
/// The repository traits are implemented next to their features,
/// see [`crate::core::item::item_repository`] and [`crate::core::list::list_repository`].
#[derive(Clone, Debug)]
pub struct PgRepository {
    db: DbPool,
}

impl PgRepository {
    /// Constructs a new [`PgRepository`].
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Starts a transaction that is rolled back unless committed.
    pub(crate) async fn begin(&self) -> Result<Tx, sqlx::Error> {
        self.db.begin().await
    }
}
