use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::document::{Collection, Document, DocumentId, Projection};

use super::data_store::{DataStore, connect};
use super::errors::StorageError;
use super::index::Index;
use super::postgres::*;
use super::sqlite::*;

/// Handle to a connected document store
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn DataStore>,
    table_prefix: Arc<str>,
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = if self.backend.as_sqlite().is_some() {
            "sqlite"
        } else {
            "postgres"
        };
        f.debug_struct("DocumentStore")
            .field("backend", &backend)
            .field("table_prefix", &self.table_prefix)
            .finish()
    }
}

impl DocumentStore {
    /// Open a connection pool for `config`
    ///
    /// Tables are not touched; call [`init`](Self::init) once to create and
    /// validate them.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StorageError> {
        let backend = connect(config).await?;
        Ok(Self {
            backend: Arc::from(backend),
            table_prefix: Arc::from(config.table_prefix.as_str()),
        })
    }

    /// Create the collection tables if needed and validate their schemas
    pub async fn init(&self) -> Result<(), StorageError> {
        let prefix = &*self.table_prefix;

        if let Some(pool) = self.backend.as_sqlite() {
            create_tables_sqlite(pool, prefix).await?;
            validate_tables_sqlite(pool, prefix).await?;
        } else if let Some(pool) = self.backend.as_postgres() {
            create_tables_postgres(pool, prefix).await?;
            validate_tables_postgres(pool, prefix).await?;
        } else {
            return Err(StorageError::UnsupportedBackend);
        }

        tracing::info!(table_prefix = prefix, "Document store initialized");
        Ok(())
    }

    /// Close the pool; clones of this handle stop working too
    pub async fn close(&self) {
        if let Some(pool) = self.backend.as_sqlite() {
            pool.close().await;
        } else if let Some(pool) = self.backend.as_postgres() {
            pool.close().await;
        }
        tracing::info!("Document store closed");
    }

    fn table(&self, coll: Collection) -> String {
        coll.table_name(&self.table_prefix)
    }

    /// Persist a new document
    ///
    /// The store assigns the identity when the document has none, and always
    /// sets `ts`.
    #[tracing::instrument(skip(self, document), fields(collection = %document.coll))]
    pub async fn create(&self, document: Document) -> Result<Document, StorageError> {
        let id = document.id.clone().unwrap_or_else(DocumentId::generate);
        let ts = Utc::now();
        let table = self.table(document.coll);

        let result = if let Some(pool) = self.backend.as_sqlite() {
            insert_document_sqlite(pool, &table, &id, ts, &document).await
        } else if let Some(pool) = self.backend.as_postgres() {
            insert_document_postgres(pool, &table, &id, ts, &document).await
        } else {
            Err(StorageError::UnsupportedBackend)
        };

        match &result {
            Ok(doc) => tracing::debug!(id = ?doc.id, "Document created"),
            Err(e) => tracing::error!(error = %e, "Document create failed"),
        }

        result
    }

    /// Fetch a document by identity
    #[tracing::instrument(skip(self, projection), fields(collection = %coll, id = %id))]
    pub async fn get(
        &self,
        coll: Collection,
        id: &str,
        projection: Projection,
    ) -> Result<Option<Document>, StorageError> {
        let table = self.table(coll);

        let result = if let Some(pool) = self.backend.as_sqlite() {
            get_document_sqlite(pool, &table, coll, id).await
        } else if let Some(pool) = self.backend.as_postgres() {
            get_document_postgres(pool, &table, coll, id).await
        } else {
            Err(StorageError::UnsupportedBackend)
        };

        log_lookup(&result);
        result.map(|doc| doc.map(|doc| doc.project(&projection)))
    }

    /// Fetch the first document matching `index`, oldest first
    #[tracing::instrument(skip(self, projection), fields(index = %index))]
    pub async fn first(
        &self,
        index: &Index<'_>,
        projection: Projection,
    ) -> Result<Option<Document>, StorageError> {
        let table = self.table(index.collection());

        let result = if let Some(pool) = self.backend.as_sqlite() {
            first_document_sqlite(pool, &table, index).await
        } else if let Some(pool) = self.backend.as_postgres() {
            first_document_postgres(pool, &table, index).await
        } else {
            Err(StorageError::UnsupportedBackend)
        };

        log_lookup(&result);
        result.map(|doc| doc.map(|doc| doc.project(&projection)))
    }

    /// Merge `patch` into an existing document
    ///
    /// Fields in `patch` overwrite stored ones (a `null` stays `null`), the
    /// rest are kept. Updating a missing document is
    /// [`StorageError::DocumentNotFound`].
    #[tracing::instrument(skip(self, patch), fields(collection = %coll, id = %id))]
    pub async fn update(
        &self,
        coll: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Document, StorageError> {
        let table = self.table(coll);
        let ts = Utc::now();

        let result = if let Some(pool) = self.backend.as_sqlite() {
            update_document_sqlite(pool, &table, coll, id, patch, ts).await
        } else if let Some(pool) = self.backend.as_postgres() {
            update_document_postgres(pool, &table, coll, id, patch, ts).await
        } else {
            Err(StorageError::UnsupportedBackend)
        };

        match result {
            Ok(Some(doc)) => {
                tracing::debug!("Document updated");
                Ok(doc)
            }
            Ok(None) => {
                tracing::warn!("Document to update not found");
                Err(StorageError::DocumentNotFound {
                    collection: coll,
                    id: id.to_string(),
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Document update failed");
                Err(e)
            }
        }
    }

    /// Delete a document by identity, returning it if it existed
    #[tracing::instrument(skip(self), fields(collection = %coll, id = %id))]
    pub async fn delete(
        &self,
        coll: Collection,
        id: &str,
    ) -> Result<Option<Document>, StorageError> {
        let table = self.table(coll);

        let result = if let Some(pool) = self.backend.as_sqlite() {
            delete_document_sqlite(pool, &table, coll, id).await
        } else if let Some(pool) = self.backend.as_postgres() {
            delete_document_postgres(pool, &table, coll, id).await
        } else {
            Err(StorageError::UnsupportedBackend)
        };

        log_lookup(&result);
        result
    }

    /// Atomically delete and return the first document matching `index`
    ///
    /// Concurrent callers racing on the same match see it at most once.
    #[tracing::instrument(skip(self, projection), fields(index = %index))]
    pub async fn take_first(
        &self,
        index: &Index<'_>,
        projection: Projection,
    ) -> Result<Option<Document>, StorageError> {
        let table = self.table(index.collection());

        let result = if let Some(pool) = self.backend.as_sqlite() {
            take_first_sqlite(pool, &table, index).await
        } else if let Some(pool) = self.backend.as_postgres() {
            take_first_postgres(pool, &table, index).await
        } else {
            Err(StorageError::UnsupportedBackend)
        };

        log_lookup(&result);
        result.map(|doc| doc.map(|doc| doc.project(&projection)))
    }

    /// Delete a document together with every document matching `dependents`
    ///
    /// All deletes run in one transaction: either everything goes or nothing
    /// does. Dependents are removed even when the document itself is missing.
    #[tracing::instrument(skip(self, dependents), fields(collection = %coll, id = %id))]
    pub async fn delete_with_dependents(
        &self,
        coll: Collection,
        id: &str,
        dependents: &[Index<'_>],
    ) -> Result<Option<Document>, StorageError> {
        let prefix = &*self.table_prefix;

        let result = if let Some(pool) = self.backend.as_sqlite() {
            delete_with_dependents_sqlite(pool, prefix, coll, id, dependents).await
        } else if let Some(pool) = self.backend.as_postgres() {
            delete_with_dependents_postgres(pool, prefix, coll, id, dependents).await
        } else {
            Err(StorageError::UnsupportedBackend)
        };

        match result {
            Ok((deleted, dependents)) => {
                tracing::debug!(found = deleted.is_some(), dependents, "Documents deleted");
                Ok(deleted)
            }
            Err(e) => {
                tracing::error!(error = %e, "Document delete failed, rolled back");
                Err(e)
            }
        }
    }

    /// Look a document up by column equality with a standalone query
    ///
    /// `columns` pairs a table column (`id` or a term column) with its value.
    /// No projection is applied and `ts` is left unset.
    pub(crate) async fn raw_lookup(
        &self,
        coll: Collection,
        columns: &[(&'static str, &str)],
    ) -> Result<Option<Document>, StorageError> {
        let table = self.table(coll);

        let result = if let Some(pool) = self.backend.as_sqlite() {
            raw_lookup_sqlite(pool, &table, coll, columns).await
        } else if let Some(pool) = self.backend.as_postgres() {
            raw_lookup_postgres(pool, &table, coll, columns).await
        } else {
            Err(StorageError::UnsupportedBackend)
        };

        log_lookup(&result);
        result
    }
}

fn log_lookup(result: &Result<Option<Document>, StorageError>) {
    match result {
        Ok(Some(_)) => tracing::debug!(found = true, "Document lookup completed"),
        Ok(None) => tracing::debug!(found = false, "Document lookup completed - not found"),
        Err(e) => tracing::error!(error = %e, "Document lookup failed"),
    }
}
