use auth_docstore::AdapterTestDb;
use serial_test::serial;

use crate::common::{TestContext, verification_token};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_token_is_consumed_exactly_once() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::concurrent(8).await?;
    let token = ctx
        .adapter
        .create_verification_token(verification_token())
        .await?;

    let attempts = (0..8).map(|_| {
        let adapter = ctx.adapter.clone();
        let (identifier, value) = (token.identifier.clone(), token.token.clone());
        tokio::spawn(async move { adapter.use_verification_token(&identifier, &value).await })
    });

    let mut consumed = 0;
    for attempt in attempts.collect::<Vec<_>>() {
        if attempt.await??.is_some() {
            consumed += 1;
        }
    }

    assert_eq!(consumed, 1);
    assert_eq!(
        ctx.db
            .verification_token(&token.identifier, &token.token)
            .await?,
        None
    );

    ctx.shutdown().await;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_using_one_token_keeps_others() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = TestContext::new().await?;

    let used = ctx
        .adapter
        .create_verification_token(verification_token())
        .await?;
    let mut sibling = verification_token();
    sibling.identifier = used.identifier.clone();
    let sibling = ctx.adapter.create_verification_token(sibling).await?;

    ctx.adapter
        .use_verification_token(&used.identifier, &used.token)
        .await?;

    assert_eq!(
        ctx.db
            .verification_token(&sibling.identifier, &sibling.token)
            .await?,
        Some(sibling)
    );

    ctx.shutdown().await;
    Ok(())
}
