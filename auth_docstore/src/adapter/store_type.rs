use crate::document::{Collection, Document, Entity, Projection, from_document, to_document};
use crate::storage::{DocumentStore, Index, StorageError};

use super::types::{
    AdapterAccount, AdapterSession, AdapterUser, NewUser, SessionAndUser, SessionUpdate,
    UserUpdate, VerificationToken,
};

/// Auth library adapter backed by a [`DocumentStore`]
///
/// Every lookup returns `Ok(None)` when nothing matches. Store errors,
/// including unique index violations, are returned unchanged.
#[derive(Debug, Clone)]
pub struct DocumentAdapter {
    store: DocumentStore,
}

fn decode<T: Entity>(document: Option<Document>) -> Result<Option<T>, StorageError> {
    Ok(from_document(document)?)
}

fn decode_created<T: Entity>(document: Document) -> Result<T, StorageError> {
    let id = document.id.clone();
    decode::<T>(Some(document.project(&T::FIELDS)))?.ok_or(StorageError::DocumentNotFound {
        collection: T::COLLECTION,
        id: id.map(|id| id.into_string()).unwrap_or_default(),
    })
}

impl DocumentAdapter {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    async fn insert<T: Entity>(&self, record: &impl serde::Serialize) -> Result<T, StorageError> {
        let document = to_document(T::COLLECTION, record)?;
        let created = self.store.create(document).await?;
        decode_created(created)
    }

    #[tracing::instrument(skip(self, user))]
    pub async fn create_user(&self, user: NewUser) -> Result<AdapterUser, StorageError> {
        let created: AdapterUser = self.insert::<AdapterUser>(&user).await?;
        tracing::info!(user_id = %created.id, "User created");
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<Option<AdapterUser>, StorageError> {
        let document = self
            .store
            .get(Collection::User, id, AdapterUser::FIELDS)
            .await?;
        decode(document)
    }

    #[tracing::instrument(skip(self, email))]
    pub async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AdapterUser>, StorageError> {
        let document = self
            .store
            .first(&Index::UserByEmail { email }, AdapterUser::FIELDS)
            .await?;
        decode(document)
    }

    /// User owning the account `(provider, provider_account_id)`
    #[tracing::instrument(skip(self, provider_account_id))]
    pub async fn get_user_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterUser>, StorageError> {
        let Some(account) = self
            .get_account_by_provider(provider, provider_account_id)
            .await?
        else {
            return Ok(None);
        };

        self.get_user(&account.user_id).await
    }

    /// Apply the fields set in `update`; the user must exist
    #[tracing::instrument(skip(self, update), fields(user_id = %update.id))]
    pub async fn update_user(&self, update: UserUpdate) -> Result<AdapterUser, StorageError> {
        let patch = to_document(Collection::User, &update)?;
        let updated = self
            .store
            .update(Collection::User, &update.id, patch.data)
            .await?;
        decode_created(updated)
    }

    /// Delete a user together with its sessions and accounts
    ///
    /// Returns the deleted user, or `None` if there was none.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<Option<AdapterUser>, StorageError> {
        let dependents = [
            Index::SessionByUserId { user_id: id },
            Index::AccountByUserId { user_id: id },
        ];
        let deleted = self
            .store
            .delete_with_dependents(Collection::User, id, &dependents)
            .await?;

        tracing::info!(found = deleted.is_some(), "User delete completed");

        decode(deleted.map(|doc| doc.project(&AdapterUser::FIELDS)))
    }

    #[tracing::instrument(skip(self, account), fields(provider = %account.provider, user_id = %account.user_id))]
    pub async fn link_account(
        &self,
        account: AdapterAccount,
    ) -> Result<AdapterAccount, StorageError> {
        self.insert::<AdapterAccount>(&account).await
    }

    /// Remove the account link, returning it if it existed
    #[tracing::instrument(skip(self, provider_account_id))]
    pub async fn unlink_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterAccount>, StorageError> {
        let index = Index::AccountByProviderAndProviderAccountId {
            provider,
            provider_account_id,
        };
        let document = self
            .store
            .take_first(&index, AdapterAccount::FIELDS)
            .await?;
        decode(document)
    }

    #[tracing::instrument(skip(self, provider_account_id))]
    pub async fn get_account_by_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterAccount>, StorageError> {
        let index = Index::AccountByProviderAndProviderAccountId {
            provider,
            provider_account_id,
        };
        let document = self.store.first(&index, AdapterAccount::FIELDS).await?;
        decode(document)
    }

    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn create_session(
        &self,
        session: AdapterSession,
    ) -> Result<AdapterSession, StorageError> {
        self.insert::<AdapterSession>(&session).await
    }

    /// Session for `session_token` and its user
    ///
    /// `None` when the session is missing or its user no longer exists.
    #[tracing::instrument(skip(self, session_token))]
    pub async fn get_session_and_user(
        &self,
        session_token: &str,
    ) -> Result<Option<SessionAndUser>, StorageError> {
        let document = self
            .store
            .first(
                &Index::SessionBySessionToken { session_token },
                AdapterSession::FIELDS,
            )
            .await?;
        let Some(session) = decode::<AdapterSession>(document)? else {
            return Ok(None);
        };

        let Some(user) = self.get_user(&session.user_id).await? else {
            tracing::warn!(user_id = %session.user_id, "Session refers to a missing user");
            return Ok(None);
        };

        Ok(Some(SessionAndUser { session, user }))
    }

    /// Apply the fields set in `update`; `None` when the session is gone
    #[tracing::instrument(skip(self, update))]
    pub async fn update_session(
        &self,
        update: SessionUpdate,
    ) -> Result<Option<AdapterSession>, StorageError> {
        let index = Index::SessionBySessionToken {
            session_token: &update.session_token,
        };
        let Some(existing) = self.store.first(&index, Projection::All).await?
        else {
            return Ok(None);
        };
        let Some(id) = existing.id else {
            return Ok(None);
        };

        let patch = to_document(Collection::Session, &update)?;
        match self.store.update(Collection::Session, id.as_str(), patch.data).await {
            Ok(updated) => decode_created(updated).map(Some),
            // Deleted between the lookup and the update
            Err(StorageError::DocumentNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete the session, returning it if it existed
    #[tracing::instrument(skip(self, session_token))]
    pub async fn delete_session(
        &self,
        session_token: &str,
    ) -> Result<Option<AdapterSession>, StorageError> {
        let document = self
            .store
            .take_first(
                &Index::SessionBySessionToken { session_token },
                AdapterSession::FIELDS,
            )
            .await?;
        decode(document)
    }

    #[tracing::instrument(skip(self, token))]
    pub async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> Result<VerificationToken, StorageError> {
        self.insert::<VerificationToken>(&token).await
    }

    #[tracing::instrument(skip(self, identifier, token))]
    pub async fn get_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<Option<VerificationToken>, StorageError> {
        let index = Index::VerificationTokenByIdentifierAndToken { identifier, token };
        let document = self
            .store
            .first(&index, VerificationToken::FIELDS)
            .await?;
        decode(document)
    }

    /// Consume a verification token
    ///
    /// The token is deleted and returned to exactly one caller; every later
    /// or concurrent call sees `None`.
    #[tracing::instrument(skip(self, identifier, token))]
    pub async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<Option<VerificationToken>, StorageError> {
        let index = Index::VerificationTokenByIdentifierAndToken { identifier, token };
        let document = self
            .store
            .take_first(&index, VerificationToken::FIELDS)
            .await?;

        tracing::info!(found = document.is_some(), "Verification token consumed");
        decode(document)
    }
}
