//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use tokio::task;
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::credentials::CredentialManager;
use crate::db::{InsertAccount, Store};
use crate::models::{Account, LookupKey, NewAccount, RoleQuery, resolve_lookup_key};
use crate::services::account_service::{AccountError, AccountService};
use crate::validation;

pub struct SeaOrmAccountService {
    store: Store,
    credentials: CredentialManager,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, credentials: CredentialManager, security: SecurityConfig) -> Self {
        Self {
            store,
            credentials,
            security,
        }
    }

    /// Argon2 is CPU-intensive, so hashing runs on a blocking task.
    async fn hash_blocking(&self, plaintext: String, salt: String) -> Result<String, AccountError> {
        let credentials = self.credentials.clone();
        let hash = task::spawn_blocking(move || credentials.hash(&plaintext, &salt))
            .await
            .map_err(|_| AccountError::Internal("Password hashing task panicked".to_string()))??;

        Ok(hash)
    }

    async fn verify_blocking(
        &self,
        plaintext: String,
        stored_hash: String,
        salt: String,
    ) -> Result<bool, AccountError> {
        let credentials = self.credentials.clone();
        let is_valid =
            task::spawn_blocking(move || credentials.verify(&plaintext, &stored_hash, &salt))
                .await
                .map_err(|_| {
                    AccountError::Internal("Password verification task panicked".to_string())
                })??;

        Ok(is_valid)
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(&self, new_account: NewAccount) -> Result<Account, AccountError> {
        validation::validate_username(&new_account.username)?;
        validation::validate_email(&new_account.email)?;
        validation::validate_password(&new_account.password, self.security.min_password_length)?;

        if self
            .store
            .account_exists(LookupKey::Username, &new_account.username)
            .await?
        {
            return Err(AccountError::validation("Username is already taken"));
        }

        if self
            .store
            .account_exists(LookupKey::Email, &new_account.email)
            .await?
        {
            return Err(AccountError::validation("Email is already registered"));
        }

        // Before-save pipeline: salt, then hash, then persist.
        let salt = new_account
            .salt
            .unwrap_or_else(CredentialManager::generate_salt);
        let password_hash = self.hash_blocking(new_account.password, salt.clone()).await?;

        let account = self
            .store
            .insert_account(InsertAccount {
                username: new_account.username,
                email: new_account.email,
                password_hash,
                salt,
            })
            .await?;

        info!("Registered account '{}'", account.username);
        Ok(account)
    }

    async fn account_exists(&self, lookup: &str) -> Result<bool, AccountError> {
        let key = resolve_lookup_key(lookup);
        Ok(self.store.account_exists(key, lookup).await?)
    }

    async fn update_password(
        &self,
        old_password: Option<&str>,
        new_password: Option<&str>,
        lookup: &str,
        new_salt: Option<String>,
    ) -> Result<bool, AccountError> {
        let (Some(old_password), Some(new_password)) = (old_password, new_password) else {
            return Ok(false);
        };

        let key = resolve_lookup_key(lookup);
        let Some((account, stored_hash, stored_salt)) =
            self.store.find_account_with_secret(key, lookup).await?
        else {
            return Ok(false);
        };

        let verified = self
            .verify_blocking(
                old_password.to_string(),
                stored_hash.clone(),
                stored_salt,
            )
            .await?;

        if !verified {
            debug!("Password rotation rejected for '{}'", account.username);
            return Ok(false);
        }

        let salt = new_salt.unwrap_or_else(CredentialManager::generate_salt);
        let new_hash = self
            .hash_blocking(new_password.to_string(), salt.clone())
            .await?;

        let account_id = account
            .id
            .ok_or_else(|| AccountError::Internal("Persisted account without id".to_string()))?;

        // Guarded write: if another rotation landed between our read and this
        // update, no row matches and the stale credential is not written.
        let updated = self
            .store
            .update_account_password(account_id, &stored_hash, &new_hash, &salt)
            .await?;

        if updated {
            info!("Password rotated for '{}'", account.username);
        }

        Ok(updated)
    }

    async fn complete_login(&self, account: &Account) -> Result<(), AccountError> {
        let Some(account_id) = account.id else {
            debug!("Skipping login bookkeeping for unpersisted account");
            return Ok(());
        };

        if !self.store.record_login(account_id).await? {
            return Err(AccountError::AccountNotFound);
        }

        Ok(())
    }

    async fn has_role(&self, account: &Account, role: RoleQuery) -> Result<bool, AccountError> {
        let Some(account_id) = account.id else {
            return Ok(false);
        };

        let roles = self.store.roles_for_account(account_id).await?;

        let found = match role {
            RoleQuery::Ref(role) => roles.iter().any(|r| r.id == role.id),
            RoleQuery::Name(name) => roles.iter().any(|r| r.name == name),
            RoleQuery::Id(id) => roles.iter().any(|r| r.id == id),
        };

        Ok(found)
    }
}
