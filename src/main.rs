//! A to-do list backend with axum.

use todo_backend::{
    app::run_app,
    infra::{
        config::{load_config, StorageBackend},
        database::{init_db, migrate, PgRepository},
        logging::init_logging,
        memory::MemoryRepository,
        state::AppState,
    },
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;
    let config = load_config()?;
    let _guard = init_logging(&config.logging);

    let state = match config.storage {
        StorageBackend::Postgres => {
            let db = init_db(&config.database);
            migrate(&db).await?;
            AppState::new(PgRepository::new(db), config)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, nothing survives a restart");
            AppState::new(MemoryRepository::new(), config)
        }
    };

    let server = &state.config().server;
    let listener = TcpListener::bind((server.http_address.as_str(), server.http_port)).await?;
    run_app(listener, state).await?;

    Ok(())
}
