use auth_docstore::{AdapterTestDb, DocumentAdapter, SessionUpdate, UserUpdate};
use chrono::{Duration, Utc};

use super::fixtures::{account_for, new_user, session_for, verification_token};

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Adapter conformance checks, every write cross-checked through `db`
///
/// Runs against any adapter/harness pair backed by the same store.
pub async fn run_basic_tests(adapter: &DocumentAdapter, db: &dyn AdapterTestDb) -> TestResult {
    users(adapter, db).await?;
    sessions(adapter, db).await?;
    accounts(adapter, db).await?;
    verification_tokens(adapter, db).await?;
    Ok(())
}

async fn users(adapter: &DocumentAdapter, db: &dyn AdapterTestDb) -> TestResult {
    let user = adapter.create_user(new_user()).await?;
    assert_eq!(db.user(&user.id).await?, Some(user.clone()));
    assert_eq!(adapter.get_user(&user.id).await?, Some(user.clone()));
    assert_eq!(adapter.get_user_by_email(&user.email).await?, Some(user.clone()));

    let verified_at = Utc::now();
    let mut update = UserUpdate::new(user.id.clone());
    update.email_verified = Some(Some(verified_at));
    update.image = Some(None);
    let updated = adapter.update_user(update).await?;
    assert_eq!(updated.email_verified, Some(verified_at));
    assert_eq!(updated.image, None);
    assert_eq!(updated.name, user.name);
    assert_eq!(db.user(&user.id).await?, Some(updated));

    assert!(adapter.delete_user(&user.id).await?.is_some());
    assert_eq!(db.user(&user.id).await?, None);
    assert_eq!(adapter.get_user(&user.id).await?, None);
    Ok(())
}

async fn sessions(adapter: &DocumentAdapter, db: &dyn AdapterTestDb) -> TestResult {
    let user = adapter.create_user(new_user()).await?;
    let session = adapter.create_session(session_for(&user.id)).await?;
    assert_eq!(db.session(&session.session_token).await?, Some(session.clone()));

    let found = adapter
        .get_session_and_user(&session.session_token)
        .await?
        .ok_or("session should be found")?;
    assert_eq!(found.session, session);
    assert_eq!(found.user, user);

    let mut update = SessionUpdate::new(session.session_token.clone());
    update.expires = Some(session.expires + Duration::days(1));
    let updated = adapter
        .update_session(update)
        .await?
        .ok_or("session should update")?;
    assert_eq!(updated.expires, session.expires + Duration::days(1));
    assert_eq!(db.session(&session.session_token).await?, Some(updated.clone()));

    assert_eq!(adapter.delete_session(&session.session_token).await?, Some(updated));
    assert_eq!(db.session(&session.session_token).await?, None);
    assert_eq!(adapter.delete_session(&session.session_token).await?, None);

    adapter.delete_user(&user.id).await?;
    Ok(())
}

async fn accounts(adapter: &DocumentAdapter, db: &dyn AdapterTestDb) -> TestResult {
    let user = adapter.create_user(new_user()).await?;
    let account = adapter.link_account(account_for(&user.id)).await?;
    let (provider, provider_account_id) = (&account.provider, &account.provider_account_id);

    assert_eq!(db.account(provider, provider_account_id).await?, Some(account.clone()));
    assert_eq!(
        adapter.get_account_by_provider(provider, provider_account_id).await?,
        Some(account.clone())
    );
    assert_eq!(
        adapter.get_user_by_account(provider, provider_account_id).await?,
        Some(user.clone())
    );

    assert_eq!(
        adapter.unlink_account(provider, provider_account_id).await?,
        Some(account.clone())
    );
    assert_eq!(db.account(provider, provider_account_id).await?, None);
    assert_eq!(adapter.get_user_by_account(provider, provider_account_id).await?, None);

    adapter.delete_user(&user.id).await?;
    Ok(())
}

async fn verification_tokens(adapter: &DocumentAdapter, db: &dyn AdapterTestDb) -> TestResult {
    let token = adapter.create_verification_token(verification_token()).await?;
    assert_eq!(
        db.verification_token(&token.identifier, &token.token).await?,
        Some(token.clone())
    );
    assert_eq!(
        adapter.get_verification_token(&token.identifier, &token.token).await?,
        Some(token.clone())
    );

    assert_eq!(
        adapter.use_verification_token(&token.identifier, &token.token).await?,
        Some(token.clone())
    );
    assert_eq!(db.verification_token(&token.identifier, &token.token).await?, None);
    Ok(())
}
