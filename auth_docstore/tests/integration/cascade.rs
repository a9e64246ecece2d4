use auth_docstore::AdapterTestDb;
use serial_test::serial;

use crate::common::{TestContext, account_for, new_user, session_for};

#[tokio::test]
#[serial]
async fn test_delete_user_removes_sessions_and_accounts() -> Result<(), Box<dyn std::error::Error>>
{
    let ctx = TestContext::new().await?;

    let user = ctx.adapter.create_user(new_user()).await?;
    let sessions = vec![
        ctx.adapter.create_session(session_for(&user.id)).await?,
        ctx.adapter.create_session(session_for(&user.id)).await?,
    ];
    let accounts = vec![
        ctx.adapter.link_account(account_for(&user.id)).await?,
        ctx.adapter.link_account(account_for(&user.id)).await?,
    ];

    ctx.adapter.delete_user(&user.id).await?;

    for session in &sessions {
        assert_eq!(ctx.db.session(&session.session_token).await?, None);
    }
    for account in &accounts {
        assert_eq!(
            ctx.db
                .account(&account.provider, &account.provider_account_id)
                .await?,
            None
        );
    }
    assert_eq!(ctx.db.user(&user.id).await?, None);

    ctx.shutdown().await;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_delete_user_leaves_other_users_alone() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::new().await?;

    let doomed = ctx.adapter.create_user(new_user()).await?;
    let survivor = ctx.adapter.create_user(new_user()).await?;
    ctx.adapter.create_session(session_for(&doomed.id)).await?;
    let kept_session = ctx.adapter.create_session(session_for(&survivor.id)).await?;
    let kept_account = ctx.adapter.link_account(account_for(&survivor.id)).await?;

    ctx.adapter.delete_user(&doomed.id).await?;

    assert_eq!(ctx.db.user(&survivor.id).await?, Some(survivor));
    assert_eq!(
        ctx.db.session(&kept_session.session_token).await?,
        Some(kept_session)
    );
    assert_eq!(
        ctx.db
            .account(&kept_account.provider, &kept_account.provider_account_id)
            .await?,
        Some(kept_account)
    );

    ctx.shutdown().await;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_delete_missing_user_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::new().await?;

    assert_eq!(ctx.adapter.delete_user("does-not-exist").await?, None);

    ctx.shutdown().await;
    Ok(())
}
