use auth_docstore::AdapterTestDb;
use serial_test::serial;

use crate::common::{TestContext, new_user, run_basic_tests, session_for};

/// Full adapter conformance run against the configured store
#[tokio::test]
#[serial]
async fn test_basic_adapter_suite() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::new().await?;

    run_basic_tests(&ctx.adapter, &ctx.db).await?;

    ctx.shutdown().await;
    Ok(())
}

/// Create a user and a session, look both up through the harness, delete
/// the user, and see every lookup come back empty
#[tokio::test]
#[serial]
async fn test_user_session_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::new().await?;

    let user = ctx.adapter.create_user(new_user()).await?;
    let session = ctx.adapter.create_session(session_for(&user.id)).await?;

    assert_eq!(ctx.db.user(&user.id).await?, Some(user.clone()));
    assert_eq!(ctx.db.session(&session.session_token).await?, Some(session.clone()));

    let deleted = ctx.adapter.delete_user(&user.id).await?;
    assert_eq!(deleted, Some(user.clone()));

    assert_eq!(ctx.db.user(&user.id).await?, None);
    assert_eq!(ctx.db.session(&session.session_token).await?, None);
    assert_eq!(ctx.adapter.get_session_and_user(&session.session_token).await?, None);

    ctx.shutdown().await;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_lookups_for_unknown_keys_return_none() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::new().await?;

    assert_eq!(ctx.adapter.get_user("0").await?, None);
    assert_eq!(ctx.db.user("0").await?, None);
    assert_eq!(ctx.adapter.get_account_by_provider("github", "missing").await?, None);
    assert_eq!(ctx.db.account("github", "missing").await?, None);
    assert_eq!(ctx.adapter.get_session_and_user("missing").await?, None);
    assert_eq!(ctx.db.session("missing").await?, None);
    assert_eq!(ctx.adapter.get_verification_token("nobody", "missing").await?, None);
    assert_eq!(ctx.db.verification_token("nobody", "missing").await?, None);

    ctx.shutdown().await;
    Ok(())
}
