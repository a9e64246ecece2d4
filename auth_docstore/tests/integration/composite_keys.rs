use auth_docstore::AdapterTestDb;
use serial_test::serial;

use crate::common::{TestContext, account_for, new_user, verification_token};

#[tokio::test]
#[serial]
async fn test_wrong_token_for_known_identifier_is_not_used() -> Result<(), Box<dyn std::error::Error>>
{
    let ctx = TestContext::new().await?;
    let token = ctx
        .adapter
        .create_verification_token(verification_token())
        .await?;

    assert_eq!(
        ctx.db.verification_token(&token.identifier, "wrong").await?,
        None
    );
    assert_eq!(
        ctx.adapter
            .get_verification_token(&token.identifier, "wrong")
            .await?,
        None
    );
    assert_eq!(
        ctx.adapter
            .use_verification_token(&token.identifier, "wrong")
            .await?,
        None
    );

    // The real token survives the failed attempt
    assert_eq!(
        ctx.db
            .verification_token(&token.identifier, &token.token)
            .await?,
        Some(token)
    );

    ctx.shutdown().await;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_wrong_account_id_for_known_provider_is_not_found()
-> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::new().await?;
    let user = ctx.adapter.create_user(new_user()).await?;
    let account = ctx.adapter.link_account(account_for(&user.id)).await?;

    assert_eq!(ctx.db.account(&account.provider, "gh-unknown").await?, None);
    assert_eq!(
        ctx.adapter
            .get_account_by_provider(&account.provider, "gh-unknown")
            .await?,
        None
    );
    assert_eq!(
        ctx.adapter
            .get_user_by_account(&account.provider, "gh-unknown")
            .await?,
        None
    );
    assert_eq!(
        ctx.adapter
            .unlink_account(&account.provider, "gh-unknown")
            .await?,
        None
    );

    assert_eq!(
        ctx.db
            .account(&account.provider, &account.provider_account_id)
            .await?,
        Some(account)
    );

    ctx.adapter.delete_user(&user.id).await?;
    ctx.shutdown().await;
    Ok(())
}
