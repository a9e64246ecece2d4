use crate::config::{StoreConfig, StoreType};
use crate::storage::DocumentStore;

/// Fresh in-memory store with all collection tables created
///
/// Each call gets its own database; a single connection keeps every query
/// on it.
pub(crate) async fn test_store() -> DocumentStore {
    let config = StoreConfig::new(StoreType::Sqlite, "sqlite::memory:").with_max_connections(1);
    let store = DocumentStore::connect(&config)
        .await
        .expect("Failed to connect to in-memory store");
    store.init().await.expect("Failed to initialize store");
    store
}
