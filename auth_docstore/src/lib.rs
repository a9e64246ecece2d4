//! auth-docstore - document store adapter for an auth library's data model
//!
//! Maps the canonical User, Account, Session and VerificationToken records
//! onto a document store backed by SQLite or PostgreSQL, and provides an
//! independent read path for adapter conformance tests.

mod adapter;
mod config;
mod document;
mod storage;
mod verification;

#[cfg(test)]
mod test_utils;

pub use adapter::{
    AccountType, AdapterAccount, AdapterSession, AdapterUser, DocumentAdapter, NewUser,
    SessionAndUser, SessionUpdate, UserUpdate, VerificationToken,
};

pub use config::{ConfigError, StoreConfig, StoreType};

pub use document::{
    ACCOUNT_FIELDS, Collection, Document, DocumentId, Entity, FormatError, Projection,
    SESSION_FIELDS, USER_FIELDS, VERIFICATION_TOKEN_FIELDS, from_document, tagged, to_document,
};

pub use storage::{DocumentStore, Index, StorageError};

pub use verification::{AdapterTestDb, DocumentTestDb};
