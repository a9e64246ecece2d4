use auth_docstore::{AdapterTestDb, NewUser, StoreConfig, StoreType};
use serial_test::serial;

use crate::common::{
    TestContext, account_for, new_user, run_basic_tests, session_for, verification_token,
};

/// Postgres store named by `TEST_POSTGRES_URL`, if any
async fn postgres_context() -> Result<Option<TestContext>, Box<dyn std::error::Error>> {
    let Ok(url) = std::env::var("TEST_POSTGRES_URL") else {
        println!("TEST_POSTGRES_URL not set, skipping");
        return Ok(None);
    };

    let config = StoreConfig::new(StoreType::Postgres, url)
        .with_table_prefix("itest_auth_")
        .with_max_connections(4);
    Ok(Some(TestContext::with_config(&config, None).await?))
}

#[tokio::test]
#[serial]
#[ignore = "needs a Postgres server in TEST_POSTGRES_URL"]
async fn test_postgres_basic_adapter_suite() -> Result<(), Box<dyn std::error::Error>> {
    let Some(ctx) = postgres_context().await? else {
        return Ok(());
    };

    run_basic_tests(&ctx.adapter, &ctx.db).await?;

    ctx.shutdown().await;
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "needs a Postgres server in TEST_POSTGRES_URL"]
async fn test_postgres_cascade_and_composite_keys() -> Result<(), Box<dyn std::error::Error>> {
    let Some(ctx) = postgres_context().await? else {
        return Ok(());
    };

    let user = ctx.adapter.create_user(new_user()).await?;
    let session = ctx.adapter.create_session(session_for(&user.id)).await?;
    let account = ctx.adapter.link_account(account_for(&user.id)).await?;
    let token = ctx
        .adapter
        .create_verification_token(verification_token())
        .await?;

    assert_eq!(ctx.db.account(&account.provider, "gh-unknown").await?, None);
    assert_eq!(
        ctx.adapter
            .use_verification_token(&token.identifier, "wrong")
            .await?,
        None
    );
    assert_eq!(
        ctx.adapter
            .use_verification_token(&token.identifier, &token.token)
            .await?,
        Some(token)
    );

    let duplicate = ctx.adapter.create_user(NewUser::new(user.email.clone())).await;
    assert!(
        matches!(&duplicate, Err(e) if e.is_unique_violation()),
        "got {duplicate:?}"
    );

    assert_eq!(ctx.adapter.delete_user(&user.id).await?, Some(user.clone()));
    assert_eq!(ctx.db.user(&user.id).await?, None);
    assert_eq!(ctx.db.session(&session.session_token).await?, None);
    assert_eq!(
        ctx.db
            .account(&account.provider, &account.provider_account_id)
            .await?,
        None
    );

    ctx.shutdown().await;
    Ok(())
}
