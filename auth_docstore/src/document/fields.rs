use serde::{Serialize, de::DeserializeOwned};

use super::types::Collection;

/// Fields returned by a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// The whole document
    All,
    /// Only the listed fields; `id` selects the engine identity
    Fields(&'static [&'static str]),
}

impl Projection {
    pub fn fields(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::All => None,
            Self::Fields(fields) => Some(fields),
        }
    }

    pub fn includes(&self, field: &str) -> bool {
        match self {
            Self::All => true,
            Self::Fields(fields) => fields.contains(&field),
        }
    }
}

pub const USER_FIELDS: Projection =
    Projection::Fields(&["id", "name", "email", "emailVerified", "image"]);

pub const SESSION_FIELDS: Projection = Projection::Fields(&["sessionToken", "userId", "expires"]);

pub const ACCOUNT_FIELDS: Projection = Projection::Fields(&[
    "access_token",
    "expires_at",
    "id_token",
    "provider",
    "providerAccountId",
    "refresh_token",
    "scope",
    "session_state",
    "token_type",
    "type",
    "userId",
]);

pub const VERIFICATION_TOKEN_FIELDS: Projection =
    Projection::Fields(&["identifier", "token", "expires"]);

/// A canonical record stored in one collection
pub trait Entity: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
    /// Projection that fetches exactly what the canonical shape needs
    const FIELDS: Projection;
}
