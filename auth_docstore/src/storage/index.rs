use std::fmt;

use crate::document::Collection;

/// Lookup indexes over the collection term columns
///
/// `Display` renders only the index name, so term values (tokens, emails)
/// never end up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index<'a> {
    UserByEmail {
        email: &'a str,
    },
    SessionBySessionToken {
        session_token: &'a str,
    },
    SessionByUserId {
        user_id: &'a str,
    },
    AccountByUserId {
        user_id: &'a str,
    },
    AccountByProviderAndProviderAccountId {
        provider: &'a str,
        provider_account_id: &'a str,
    },
    VerificationTokenByIdentifierAndToken {
        identifier: &'a str,
        token: &'a str,
    },
}

impl<'a> Index<'a> {
    pub fn collection(&self) -> Collection {
        match self {
            Self::UserByEmail { .. } => Collection::User,
            Self::SessionBySessionToken { .. } | Self::SessionByUserId { .. } => {
                Collection::Session
            }
            Self::AccountByUserId { .. } | Self::AccountByProviderAndProviderAccountId { .. } => {
                Collection::Account
            }
            Self::VerificationTokenByIdentifierAndToken { .. } => Collection::VerificationToken,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UserByEmail { .. } => "byEmail",
            Self::SessionBySessionToken { .. } => "bySessionToken",
            Self::SessionByUserId { .. } | Self::AccountByUserId { .. } => "byUserId",
            Self::AccountByProviderAndProviderAccountId { .. } => {
                "byProviderAndProviderAccountId"
            }
            Self::VerificationTokenByIdentifierAndToken { .. } => "byIdentifierAndToken",
        }
    }

    /// `(column, value)` pairs the lookup is constrained by
    pub(crate) fn terms(&self) -> Vec<(&'static str, &'a str)> {
        match *self {
            Self::UserByEmail { email } => vec![("email", email)],
            Self::SessionBySessionToken { session_token } => {
                vec![("session_token", session_token)]
            }
            Self::SessionByUserId { user_id } | Self::AccountByUserId { user_id } => {
                vec![("user_id", user_id)]
            }
            Self::AccountByProviderAndProviderAccountId {
                provider,
                provider_account_id,
            } => vec![
                ("provider", provider),
                ("provider_account_id", provider_account_id),
            ],
            Self::VerificationTokenByIdentifierAndToken { identifier, token } => {
                vec![("identifier", identifier), ("token", token)]
            }
        }
    }
}

impl fmt::Display for Index<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.collection(), self.name())
    }
}
