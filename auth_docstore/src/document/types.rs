use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::fields::Projection;
use super::tagged;

/// Collections known to the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    User,
    Session,
    Account,
    VerificationToken,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::User,
        Collection::Session,
        Collection::Account,
        Collection::VerificationToken,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Session => "Session",
            Self::Account => "Account",
            Self::VerificationToken => "VerificationToken",
        }
    }

    pub(crate) fn table_suffix(&self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Session => "sessions",
            Self::Account => "accounts",
            Self::VerificationToken => "verification_tokens",
        }
    }

    pub(crate) fn table_name(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.table_suffix())
    }

    /// Whether the engine identity surfaces as the public `id` field
    pub fn exposes_identity(&self) -> bool {
        matches!(self, Self::User)
    }

    /// Fields stored as `@time` values
    pub fn time_fields(&self) -> &'static [&'static str] {
        match self {
            Self::User => &["emailVerified"],
            Self::Session | Self::VerificationToken => &["expires"],
            Self::Account => &[],
        }
    }

    /// Target collection of a field stored as a `@ref` value
    pub fn reference(&self, field: &str) -> Option<Collection> {
        match (self, field) {
            (Self::Session | Self::Account, "userId") => Some(Self::User),
            _ => None,
        }
    }

    /// Index term columns as `(column, document field)` pairs, in table order
    pub(crate) fn term_columns(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::User => &[("email", "email")],
            Self::Session => &[("session_token", "sessionToken"), ("user_id", "userId")],
            Self::Account => &[
                ("provider", "provider"),
                ("provider_account_id", "providerAccountId"),
                ("user_id", "userId"),
            ],
            Self::VerificationToken => &[("identifier", "identifier"), ("token", "token")],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Engine-assigned document identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a new identity as a 63-bit decimal string
    pub fn generate() -> Self {
        let (high, _) = uuid::Uuid::new_v4().as_u64_pair();
        Self((high >> 1).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document in its store-native shape
///
/// `id`, `coll` and `ts` are engine metadata. `data` holds the document body
/// in the tagged value format (see [`tagged`](super::tagged)).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Engine identity, `None` until the document is persisted
    pub id: Option<DocumentId>,
    /// Collection the document belongs to
    pub coll: Collection,
    /// Time of the last write, set by the store
    pub ts: Option<DateTime<Utc>>,
    /// Tagged document body
    pub data: Map<String, Value>,
}

impl Document {
    pub fn new(coll: Collection) -> Self {
        Self {
            id: None,
            coll,
            ts: None,
            data: Map::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Plain string value of an index term: strings as-is, references by id
    pub(crate) fn term(&self, field: &str) -> Option<String> {
        match self.data.get(field)? {
            Value::String(s) => Some(s.clone()),
            other => tagged::ref_id(other).map(str::to_string),
        }
    }

    /// Values for every term column of the collection, in table order
    pub(crate) fn term_values(&self) -> Vec<Option<String>> {
        self.coll
            .term_columns()
            .iter()
            .map(|(_, field)| self.term(field))
            .collect()
    }

    /// Overwrite the fields present in `patch`, keeping the rest
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            self.data.insert(key, value);
        }
    }

    /// Keep only the projected fields; absent fields project as `null`
    pub fn project(mut self, projection: &Projection) -> Self {
        let Some(fields) = projection.fields() else {
            return self;
        };

        let mut data = Map::new();
        for field in fields.iter().filter(|f| **f != "id") {
            let value = self.data.remove(*field).unwrap_or(Value::Null);
            data.insert(field.to_string(), value);
        }

        Self {
            id: if projection.includes("id") {
                self.id
            } else {
                None
            },
            coll: self.coll,
            ts: self.ts,
            data,
        }
    }
}
