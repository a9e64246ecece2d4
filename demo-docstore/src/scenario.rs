use chrono::{Duration, Utc};

use auth_docstore::{
    AccountType, AdapterAccount, AdapterSession, AdapterTestDb, DocumentAdapter, NewUser,
    VerificationToken,
};

/// Sign-up, sign-in and account removal against a live store
pub(crate) async fn run(
    adapter: &DocumentAdapter,
    db: &dyn AdapterTestDb,
) -> Result<(), Box<dyn std::error::Error>> {
    let suffix = Utc::now().timestamp_micros();
    let email = format!("demo-{suffix}@example.com");

    // Email sign-in: issue and redeem a verification token
    let token = adapter
        .create_verification_token(VerificationToken {
            identifier: email.clone(),
            token: format!("demo-token-{suffix}"),
            expires: Utc::now() + Duration::hours(24),
        })
        .await?;
    let redeemed = adapter
        .use_verification_token(&token.identifier, &token.token)
        .await?;
    tracing::info!(redeemed = redeemed.is_some(), "Verification token redeemed");

    let mut new_user = NewUser::new(email);
    new_user.name = Some("Demo User".to_string());
    new_user.email_verified = Some(Utc::now());
    let user = adapter.create_user(new_user).await?;

    let mut account = AdapterAccount::new(
        user.id.clone(),
        AccountType::Oauth,
        "github",
        format!("gh-{suffix}"),
    );
    account.access_token = Some(format!("access-{suffix}"));
    account.token_type = Some("bearer".to_string());
    adapter.link_account(account).await?;

    let session = adapter
        .create_session(AdapterSession {
            session_token: format!("session-{suffix}"),
            user_id: user.id.clone(),
            expires: Utc::now() + Duration::days(30),
        })
        .await?;

    match adapter.get_session_and_user(&session.session_token).await? {
        Some(found) => tracing::info!(user_id = %found.user.id, "Session resolved to user"),
        None => return Err("session lookup came back empty".into()),
    }

    if db.user(&user.id).await?.as_ref() != Some(&user) {
        return Err("stored user differs from the adapter's view".into());
    }

    adapter.delete_user(&user.id).await?;

    let leftovers = (
        db.user(&user.id).await?,
        db.session(&session.session_token).await?,
        db.account("github", &format!("gh-{suffix}")).await?,
    );
    if leftovers != (None, None, None) {
        return Err("user data left behind after delete".into());
    }

    tracing::info!(user_id = %user.id, "Demo scenario completed");
    Ok(())
}
