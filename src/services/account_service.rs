//! Domain service for account management.
//!
//! Sequences record lookup, credential verification, and mutation. Wrong
//! credentials and missing accounts surface as `Ok(false)` from the rotation
//! path rather than as errors, so callers cannot tell which check failed.

use thiserror::Error;

use crate::credentials::CredentialError;
use crate::models::{Account, NewAccount, RoleQuery};

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Account not found")]
    AccountNotFound,

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Validates fields, runs the before-save credential pipeline (salt
    /// generation + hashing), and persists a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] for bad or non-unique fields.
    async fn register(&self, new_account: NewAccount) -> Result<Account, AccountError>;

    /// Whether an account matches the given ambiguous lookup value.
    async fn account_exists(&self, lookup: &str) -> Result<bool, AccountError>;

    /// Rotates a password after verifying the old one.
    ///
    /// Returns `Ok(false)` without mutating when either plaintext is absent,
    /// no account matches the lookup value, the old password fails to verify,
    /// or a concurrent rotation replaced the hash first.
    async fn update_password(
        &self,
        old_password: Option<&str>,
        new_password: Option<&str>,
        lookup: &str,
        new_salt: Option<String>,
    ) -> Result<bool, AccountError>;

    /// Increments the login counter and stamps the login time. A no-op for an
    /// account that has not been persisted yet.
    async fn complete_login(&self, account: &Account) -> Result<(), AccountError>;

    /// Whether the account holds the referenced role.
    async fn has_role(&self, account: &Account, role: RoleQuery) -> Result<bool, AccountError>;
}
