use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_docstore::{
    DocumentAdapter, DocumentStore, DocumentTestDb, StoreConfig, StoreType,
};

mod scenario;

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            format!("auth_docstore=debug,{}=debug,info", env!("CARGO_CRATE_NAME")).into()
        }

        #[cfg(not(debug_assertions))]
        {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing();

    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "No store configured, using in-memory SQLite");
            StoreConfig::new(StoreType::Sqlite, "sqlite::memory:").with_max_connections(1)
        }
    };

    let store = DocumentStore::connect(&config).await?;
    store.init().await?;

    let adapter = DocumentAdapter::new(store.clone());
    let db = DocumentTestDb::new(store.clone());

    let result = scenario::run(&adapter, &db).await;

    store.close().await;
    result
}
