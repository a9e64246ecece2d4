use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{
    ACCOUNT_FIELDS, Collection, Entity, Projection, SESSION_FIELDS, USER_FIELDS,
    VERIFICATION_TOKEN_FIELDS,
};

/// A user as the auth library sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdapterUser {
    /// Store-assigned identity
    pub id: String,
    pub name: Option<String>,
    /// Unique across users
    pub email: String,
    /// When the email address was verified, if ever
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

/// A user that has not been stored yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

impl NewUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
            email_verified: None,
            image: None,
        }
    }
}

/// Partial update of a user; unset fields are left as stored
///
/// The outer `Option` says whether the field is touched, the inner one
/// lets a nullable field be cleared.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
}

impl UserUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Oauth,
    Oidc,
    Email,
    Webauthn,
}

/// A provider account linked to a user
///
/// The OAuth token fields keep the provider's snake_case names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdapterAccount {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub provider: String,
    #[serde(rename = "providerAccountId")]
    pub provider_account_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Expiry of the access token, in seconds since the epoch
    pub expires_at: Option<i64>,
    pub id_token: Option<String>,
    pub scope: Option<String>,
    pub session_state: Option<String>,
    pub token_type: Option<String>,
}

impl AdapterAccount {
    pub fn new(
        user_id: impl Into<String>,
        account_type: AccountType,
        provider: impl Into<String>,
        provider_account_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_type,
            provider: provider.into(),
            provider_account_id: provider_account_id.into(),
            access_token: None,
            refresh_token: None,
            expires_at: None,
            id_token: None,
            scope: None,
            session_state: None,
            token_type: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdapterSession {
    pub session_token: String,
    pub user_id: String,
    pub expires: DateTime<Utc>,
}

/// Partial update of the session identified by `session_token`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub session_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl SessionUpdate {
    pub fn new(session_token: impl Into<String>) -> Self {
        Self {
            session_token: session_token.into(),
            user_id: None,
            expires: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationToken {
    pub identifier: String,
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// A session together with the user it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct SessionAndUser {
    pub session: AdapterSession,
    pub user: AdapterUser,
}

impl Entity for AdapterUser {
    const COLLECTION: Collection = Collection::User;
    const FIELDS: Projection = USER_FIELDS;
}

impl Entity for AdapterSession {
    const COLLECTION: Collection = Collection::Session;
    const FIELDS: Projection = SESSION_FIELDS;
}

impl Entity for AdapterAccount {
    const COLLECTION: Collection = Collection::Account;
    const FIELDS: Projection = ACCOUNT_FIELDS;
}

impl Entity for VerificationToken {
    const COLLECTION: Collection = Collection::VerificationToken;
    const FIELDS: Projection = VERIFICATION_TOKEN_FIELDS;
}
