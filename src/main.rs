use std::sync::Arc;

use dotenvy::dotenv;
use order_inventory::config::{Config, StorageBackend};
use order_inventory::domain::ports::Store;
use order_inventory::infrastructure::{DieselStore, MemoryStore};
use order_inventory::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;

    let store: Arc<dyn Store> = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config.database_url.as_deref().unwrap_or_default();
            let pool = create_pool(database_url, config.pool_size)
                .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
            run_migrations(&pool)
                .map_err(|e| std::io::Error::other(format!("migrations: {e}")))?;
            Arc::new(DieselStore::new(pool))
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(store, &config.host, config.port)?.await
}
