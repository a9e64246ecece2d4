//! Read path for conformance tests
//!
//! [`DocumentTestDb`] looks records up with its own column queries and field
//! selection, sharing neither the index templates nor the projection code of
//! [`DocumentAdapter`](crate::DocumentAdapter).

use async_trait::async_trait;
use serde_json::Value;

use crate::adapter::{AdapterAccount, AdapterSession, AdapterUser, VerificationToken};
use crate::document::{Document, Entity, Projection, from_document};
use crate::storage::{DocumentStore, StorageError};

#[async_trait]
pub trait AdapterTestDb: Send + Sync {
    /// Release the connection
    async fn disconnect(&self) -> Result<(), StorageError>;
    async fn user(&self, id: &str) -> Result<Option<AdapterUser>, StorageError>;
    async fn session(&self, session_token: &str) -> Result<Option<AdapterSession>, StorageError>;
    async fn account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterAccount>, StorageError>;
    async fn verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<Option<VerificationToken>, StorageError>;
}

/// [`AdapterTestDb`] over raw document store queries
#[derive(Debug, Clone)]
pub struct DocumentTestDb {
    store: DocumentStore,
}

impl DocumentTestDb {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    async fn lookup<T: Entity>(
        &self,
        columns: &[(&'static str, &str)],
    ) -> Result<Option<T>, StorageError> {
        let document = self.store.raw_lookup(T::COLLECTION, columns).await?;
        Ok(from_document(document.map(|doc| select(doc, &T::FIELDS)))?)
    }
}

/// Copy the selected fields out of `document`, filling absent ones with `null`
fn select(document: Document, selector: &Projection) -> Document {
    let Some(fields) = selector.fields() else {
        return document;
    };

    let mut selected = Document::new(document.coll);
    for field in fields {
        if *field == "id" {
            selected.id = document.id.clone();
        } else {
            let value = document.data.get(*field).cloned().unwrap_or(Value::Null);
            selected.data.insert(field.to_string(), value);
        }
    }
    selected
}

#[async_trait]
impl AdapterTestDb for DocumentTestDb {
    async fn disconnect(&self) -> Result<(), StorageError> {
        self.store.close().await;
        Ok(())
    }

    async fn user(&self, id: &str) -> Result<Option<AdapterUser>, StorageError> {
        self.lookup(&[("id", id)]).await
    }

    async fn session(&self, session_token: &str) -> Result<Option<AdapterSession>, StorageError> {
        self.lookup(&[("session_token", session_token)]).await
    }

    async fn account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterAccount>, StorageError> {
        self.lookup(&[
            ("provider", provider),
            ("provider_account_id", provider_account_id),
        ])
        .await
    }

    async fn verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<Option<VerificationToken>, StorageError> {
        self.lookup(&[("identifier", identifier), ("token", token)])
            .await
    }
}
