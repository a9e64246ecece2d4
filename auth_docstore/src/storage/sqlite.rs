use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{FromRow, Pool, Sqlite};

use crate::document::{Collection, Document, DocumentId, FormatError};

use super::errors::StorageError;
use super::index::Index;
use super::schema_validation::validate_sqlite_table_schema;

#[derive(FromRow)]
struct DocumentRow {
    id: String,
    ts: DateTime<Utc>,
    data: String,
}

impl DocumentRow {
    fn into_document(self, coll: Collection) -> Result<Document, StorageError> {
        let data: Map<String, Value> =
            serde_json::from_str(&self.data).map_err(FormatError::from)?;
        Ok(Document {
            id: Some(DocumentId::from(self.id)),
            coll,
            ts: Some(self.ts),
            data,
        })
    }
}

fn where_terms(terms: &[(&str, &str)]) -> String {
    terms
        .iter()
        .map(|(column, _)| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

// SQLite implementations
pub(super) async fn create_tables_sqlite(
    pool: &Pool<Sqlite>,
    prefix: &str,
) -> Result<(), StorageError> {
    let users_table = Collection::User.table_name(prefix);
    let sessions_table = Collection::Session.table_name(prefix);
    let accounts_table = Collection::Account.table_name(prefix);
    let tokens_table = Collection::VerificationToken.table_name(prefix);

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {users_table} (
            id TEXT PRIMARY KEY NOT NULL,
            ts TIMESTAMP NOT NULL,
            data TEXT NOT NULL,
            email TEXT UNIQUE
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {sessions_table} (
            id TEXT PRIMARY KEY NOT NULL,
            ts TIMESTAMP NOT NULL,
            data TEXT NOT NULL,
            session_token TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {accounts_table} (
            id TEXT PRIMARY KEY NOT NULL,
            ts TIMESTAMP NOT NULL,
            data TEXT NOT NULL,
            provider TEXT NOT NULL,
            provider_account_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            UNIQUE(provider, provider_account_id)
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {tokens_table} (
            id TEXT PRIMARY KEY NOT NULL,
            ts TIMESTAMP NOT NULL,
            data TEXT NOT NULL,
            identifier TEXT NOT NULL,
            token TEXT NOT NULL,
            UNIQUE(identifier, token)
        )
        "#
    ))
    .execute(pool)
    .await?;

    // Create indexes on user_id for cascade deletes
    for table in [&sessions_table, &accounts_table] {
        sqlx::query(&format!(
            r#"
            CREATE INDEX IF NOT EXISTS idx_{}_user_id ON {}(user_id)
            "#,
            table.replace(".", "_"),
            table
        ))
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Validates that the collection table schemas match what we expect
pub(super) async fn validate_tables_sqlite(
    pool: &Pool<Sqlite>,
    prefix: &str,
) -> Result<(), StorageError> {
    for collection in Collection::ALL {
        let mut expected_columns = vec![("id", "TEXT"), ("ts", "TIMESTAMP"), ("data", "TEXT")];
        expected_columns.extend(
            collection
                .term_columns()
                .iter()
                .map(|(column, _)| (*column, "TEXT")),
        );

        validate_sqlite_table_schema(pool, &collection.table_name(prefix), &expected_columns)
            .await?;
    }

    Ok(())
}

pub(super) async fn insert_document_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    id: &DocumentId,
    ts: DateTime<Utc>,
    document: &Document,
) -> Result<Document, StorageError> {
    let terms = document.coll.term_columns();
    let columns = terms
        .iter()
        .map(|(column, _)| format!(", {column}"))
        .collect::<String>();
    let placeholders = ", ?".repeat(terms.len());

    let sql = format!(
        r#"
        INSERT INTO {table_name} (id, ts, data{columns})
        VALUES (?, ?, ?{placeholders})
        RETURNING id, ts, data
        "#
    );

    let mut query = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(id.as_str())
        .bind(ts)
        .bind(serde_json::to_string(&document.data).map_err(FormatError::from)?);
    for value in document.term_values() {
        query = query.bind(value);
    }

    query.fetch_one(pool).await?.into_document(document.coll)
}

pub(super) async fn get_document_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    coll: Collection,
    id: &str,
) -> Result<Option<Document>, StorageError> {
    sqlx::query_as::<_, DocumentRow>(&format!(
        r#"
        SELECT id, ts, data FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(|row| row.into_document(coll))
    .transpose()
}

pub(super) async fn first_document_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    index: &Index<'_>,
) -> Result<Option<Document>, StorageError> {
    let terms = index.terms();
    let sql = format!(
        r#"
        SELECT id, ts, data FROM {table_name}
        WHERE {}
        ORDER BY ts ASC, id ASC
        LIMIT 1
        "#,
        where_terms(&terms)
    );

    let mut query = sqlx::query_as::<_, DocumentRow>(&sql);
    for (_, value) in terms {
        query = query.bind(value);
    }

    query
        .fetch_optional(pool)
        .await?
        .map(|row| row.into_document(index.collection()))
        .transpose()
}

pub(super) async fn update_document_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    coll: Collection,
    id: &str,
    patch: Map<String, Value>,
    ts: DateTime<Utc>,
) -> Result<Option<Document>, StorageError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, DocumentRow>(&format!(
        r#"
        SELECT id, ts, data FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(existing) = existing else {
        return Ok(None);
    };

    let mut document = existing.into_document(coll)?;
    document.merge(patch);

    let assignments = coll
        .term_columns()
        .iter()
        .map(|(column, _)| format!(", {column} = ?"))
        .collect::<String>();

    let sql = format!(
        r#"
        UPDATE {table_name} SET ts = ?, data = ?{assignments}
        WHERE id = ?
        RETURNING id, ts, data
        "#
    );

    let mut query = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(ts)
        .bind(serde_json::to_string(&document.data).map_err(FormatError::from)?);
    for value in document.term_values() {
        query = query.bind(value);
    }

    let updated = query.bind(id).fetch_one(&mut *tx).await?;

    tx.commit().await?;

    updated.into_document(coll).map(Some)
}

pub(super) async fn delete_document_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    coll: Collection,
    id: &str,
) -> Result<Option<Document>, StorageError> {
    sqlx::query_as::<_, DocumentRow>(&format!(
        r#"
        DELETE FROM {table_name} WHERE id = ?
        RETURNING id, ts, data
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(|row| row.into_document(coll))
    .transpose()
}

/// Delete the first match of `index` and return it, in a single statement
pub(super) async fn take_first_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    index: &Index<'_>,
) -> Result<Option<Document>, StorageError> {
    let terms = index.terms();
    let sql = format!(
        r#"
        DELETE FROM {table_name}
        WHERE id = (
            SELECT id FROM {table_name}
            WHERE {}
            ORDER BY ts ASC, id ASC
            LIMIT 1
        )
        RETURNING id, ts, data
        "#,
        where_terms(&terms)
    );

    let mut query = sqlx::query_as::<_, DocumentRow>(&sql);
    for (_, value) in terms {
        query = query.bind(value);
    }

    query
        .fetch_optional(pool)
        .await?
        .map(|row| row.into_document(index.collection()))
        .transpose()
}

/// Delete a document and everything matching `dependents`, in one transaction
///
/// Returns the deleted document and how many dependents went with it.
pub(super) async fn delete_with_dependents_sqlite(
    pool: &Pool<Sqlite>,
    prefix: &str,
    coll: Collection,
    id: &str,
    dependents: &[Index<'_>],
) -> Result<(Option<Document>, u64), StorageError> {
    let mut tx = pool.begin().await?;

    let mut removed = 0;
    for index in dependents {
        let terms = index.terms();
        let sql = format!(
            r#"
            DELETE FROM {} WHERE {}
            "#,
            index.collection().table_name(prefix),
            where_terms(&terms)
        );

        let mut query = sqlx::query(&sql);
        for (_, value) in terms {
            query = query.bind(value);
        }
        removed += query.execute(&mut *tx).await?.rows_affected();
    }

    let deleted = sqlx::query_as::<_, DocumentRow>(&format!(
        r#"
        DELETE FROM {} WHERE id = ?
        RETURNING id, ts, data
        "#,
        coll.table_name(prefix)
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;

    let deleted = deleted.map(|row| row.into_document(coll)).transpose()?;
    Ok((deleted, removed))
}

#[derive(FromRow)]
struct RawRow {
    id: String,
    data: String,
}

/// Plain `SELECT` over fixed column names, independent of the index templates
pub(super) async fn raw_lookup_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    coll: Collection,
    columns: &[(&'static str, &str)],
) -> Result<Option<Document>, StorageError> {
    let mut conditions = Vec::with_capacity(columns.len());
    for (column, _) in columns {
        conditions.push(format!("{column} = ?"));
    }
    let sql = format!(
        "SELECT id, data FROM {table_name} WHERE {}",
        conditions.join(" AND ")
    );

    let mut query = sqlx::query_as::<_, RawRow>(&sql);
    for (_, value) in columns {
        query = query.bind(*value);
    }

    let Some(row) = query.fetch_optional(pool).await? else {
        return Ok(None);
    };

    let data: Map<String, Value> = serde_json::from_str(&row.data).map_err(FormatError::from)?;
    let mut document = Document::new(coll);
    document.id = Some(DocumentId::from(row.id));
    document.data = data;
    Ok(Some(document))
}
