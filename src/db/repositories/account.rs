use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set,
};

use crate::entities::{accounts, roles};
use crate::models::{Account, LookupKey, Role};

/// Column values for a new account row; credentials arrive pre-hashed.
#[derive(Debug, Clone)]
pub struct InsertAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
}

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn lookup_query(key: LookupKey, value: &str) -> Option<sea_orm::Select<accounts::Entity>> {
        match key {
            LookupKey::Email => {
                Some(accounts::Entity::find().filter(accounts::Column::Email.eq(value)))
            }
            LookupKey::Username => {
                Some(accounts::Entity::find().filter(accounts::Column::Username.eq(value)))
            }
            // A lookup value that resolved to Id but does not parse can never
            // match a row.
            LookupKey::Id => value
                .parse::<i32>()
                .ok()
                .map(|id| accounts::Entity::find_by_id(id)),
        }
    }

    /// Find an account by resolved lookup key.
    pub async fn find(&self, key: LookupKey, value: &str) -> Result<Option<Account>> {
        let Some(query) = Self::lookup_query(key, value) else {
            return Ok(None);
        };

        let account = query
            .one(&self.conn)
            .await
            .with_context(|| format!("Failed to query account by {}", key.as_str()))?;

        Ok(account.map(Account::from))
    }

    /// Find an account along with its stored hash and salt (for verification).
    pub async fn find_with_secret(
        &self,
        key: LookupKey,
        value: &str,
    ) -> Result<Option<(Account, String, String)>> {
        let Some(query) = Self::lookup_query(key, value) else {
            return Ok(None);
        };

        let account = query
            .one(&self.conn)
            .await
            .with_context(|| format!("Failed to query account by {}", key.as_str()))?;

        Ok(account.map(|a| {
            let hash = a.password_hash.clone();
            let salt = a.salt.clone();
            (Account::from(a), hash, salt)
        }))
    }

    pub async fn exists(&self, key: LookupKey, value: &str) -> Result<bool> {
        let Some(query) = Self::lookup_query(key, value) else {
            return Ok(false);
        };

        let count = query
            .count(&self.conn)
            .await
            .with_context(|| format!("Failed to count accounts by {}", key.as_str()))?;

        Ok(count > 0)
    }

    pub async fn insert(&self, record: InsertAccount) -> Result<Account> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = accounts::ActiveModel {
            username: Set(record.username),
            email: Set(record.email),
            password_hash: Set(record.password_hash),
            salt: Set(record.salt),
            login_count: Set(0),
            last_login_at: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert account")?;

        Ok(Account::from(model))
    }

    /// Replace the stored credential, conditional on the hash being unchanged.
    ///
    /// Returns `false` when no row matched, which means either the account is
    /// gone or a concurrent rotation got there first. Either way the stale
    /// write did not land.
    pub async fn update_password_guarded(
        &self,
        account_id: i32,
        expected_hash: &str,
        new_hash: &str,
        new_salt: &str,
    ) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::PasswordHash, Expr::value(new_hash))
            .col_expr(accounts::Column::Salt, Expr::value(new_salt))
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
            .filter(accounts::Column::Id.eq(account_id))
            .filter(accounts::Column::PasswordHash.eq(expected_hash))
            .exec(&self.conn)
            .await
            .context("Failed to update account password")?;

        Ok(result.rows_affected == 1)
    }

    /// Increment the login counter and stamp the login time in one UPDATE.
    pub async fn record_login(&self, account_id: i32) -> Result<bool> {
        let now = chrono::Utc::now();

        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::LoginCount,
                Expr::col(accounts::Column::LoginCount).add(1),
            )
            .col_expr(
                accounts::Column::LastLoginAt,
                Expr::value(Some(now.timestamp())),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now.to_rfc3339()))
            .filter(accounts::Column::Id.eq(account_id))
            .exec(&self.conn)
            .await
            .context("Failed to record login")?;

        Ok(result.rows_affected == 1)
    }

    /// Roles associated with an account, empty when the account is missing.
    pub async fn roles(&self, account_id: i32) -> Result<Vec<Role>> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.conn)
            .await
            .context("Failed to query account for role traversal")?;

        let Some(account) = account else {
            return Ok(Vec::new());
        };

        let roles = account
            .find_related(roles::Entity)
            .all(&self.conn)
            .await
            .context("Failed to query roles for account")?;

        Ok(roles.into_iter().map(Role::from).collect())
    }
}
