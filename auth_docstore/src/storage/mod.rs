mod data_store;
mod errors;
mod index;
mod postgres;
mod schema_validation;
mod sqlite;
mod store_type;

pub use errors::StorageError;
pub use index::Index;
pub use store_type::DocumentStore;
