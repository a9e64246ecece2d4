use auth_docstore::{NewUser, StorageError};
use serial_test::serial;

use crate::common::{TestContext, account_for, new_user, session_for};

fn assert_unique_violation<T: std::fmt::Debug>(result: Result<T, StorageError>) {
    match result {
        Err(e) => assert!(e.is_unique_violation(), "expected unique violation, got {e:?}"),
        Ok(value) => panic!("expected unique violation, got {value:?}"),
    }
}

#[tokio::test]
#[serial]
async fn test_duplicate_email_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::new().await?;

    let user = ctx.adapter.create_user(new_user()).await?;
    let result = ctx.adapter.create_user(NewUser::new(user.email.clone())).await;
    assert_unique_violation(result);

    ctx.adapter.delete_user(&user.id).await?;
    ctx.shutdown().await;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_duplicate_session_token_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::new().await?;

    let user = ctx.adapter.create_user(new_user()).await?;
    let session = ctx.adapter.create_session(session_for(&user.id)).await?;

    let result = ctx.adapter.create_session(session.clone()).await;
    assert_unique_violation(result);

    ctx.adapter.delete_user(&user.id).await?;
    ctx.shutdown().await;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_duplicate_provider_account_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::new().await?;

    let first = ctx.adapter.create_user(new_user()).await?;
    let second = ctx.adapter.create_user(new_user()).await?;
    let account = ctx.adapter.link_account(account_for(&first.id)).await?;

    let mut duplicate = account.clone();
    duplicate.user_id = second.id.clone();
    let result = ctx.adapter.link_account(duplicate).await;
    assert_unique_violation(result);

    // The original link is untouched
    assert_eq!(
        ctx.adapter
            .get_user_by_account(&account.provider, &account.provider_account_id)
            .await?,
        Some(first.clone())
    );

    ctx.adapter.delete_user(&first.id).await?;
    ctx.adapter.delete_user(&second.id).await?;
    ctx.shutdown().await;
    Ok(())
}
