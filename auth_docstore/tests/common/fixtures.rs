use auth_docstore::{AccountType, AdapterAccount, AdapterSession, NewUser, VerificationToken};
use chrono::{Duration, Utc};
use uuid::Uuid;

/// Suffix that keeps test data apart when tests share a database
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub fn new_user() -> NewUser {
    let mut user = NewUser::new(format!("{}@example.com", unique("user")));
    user.name = Some("Test User".to_string());
    user.image = Some("https://example.com/avatar.png".to_string());
    user
}

pub fn session_for(user_id: &str) -> AdapterSession {
    AdapterSession {
        session_token: unique("session"),
        user_id: user_id.to_string(),
        expires: Utc::now() + Duration::days(30),
    }
}

pub fn account_for(user_id: &str) -> AdapterAccount {
    let mut account =
        AdapterAccount::new(user_id, AccountType::Oauth, "github", unique("gh"));
    account.access_token = Some(unique("access"));
    account.refresh_token = Some(unique("refresh"));
    account.expires_at = Some((Utc::now() + Duration::hours(1)).timestamp());
    account.scope = Some("read:user user:email".to_string());
    account.token_type = Some("bearer".to_string());
    account
}

pub fn verification_token() -> VerificationToken {
    VerificationToken {
        identifier: format!("{}@example.com", unique("verify")),
        token: unique("token"),
        expires: Utc::now() + Duration::hours(24),
    }
}
