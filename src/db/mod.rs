//! The record store: pooled SQLite connection, embedded migrations, and the
//! persistence operations the account service sequences.

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::account::InsertAccount;

use crate::models::{Account, LookupKey, Role};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn role_repo(&self) -> repositories::role::RoleRepository {
        repositories::role::RoleRepository::new(self.conn.clone())
    }

    pub async fn find_account(&self, key: LookupKey, value: &str) -> Result<Option<Account>> {
        self.account_repo().find(key, value).await
    }

    /// Find an account together with its stored hash and salt.
    pub async fn find_account_with_secret(
        &self,
        key: LookupKey,
        value: &str,
    ) -> Result<Option<(Account, String, String)>> {
        self.account_repo().find_with_secret(key, value).await
    }

    pub async fn account_exists(&self, key: LookupKey, value: &str) -> Result<bool> {
        self.account_repo().exists(key, value).await
    }

    pub async fn insert_account(&self, record: InsertAccount) -> Result<Account> {
        self.account_repo().insert(record).await
    }

    /// Conditional credential swap; `false` means the guard did not match.
    pub async fn update_account_password(
        &self,
        account_id: i32,
        expected_hash: &str,
        new_hash: &str,
        new_salt: &str,
    ) -> Result<bool> {
        self.account_repo()
            .update_password_guarded(account_id, expected_hash, new_hash, new_salt)
            .await
    }

    pub async fn record_login(&self, account_id: i32) -> Result<bool> {
        self.account_repo().record_login(account_id).await
    }

    pub async fn roles_for_account(&self, account_id: i32) -> Result<Vec<Role>> {
        self.account_repo().roles(account_id).await
    }

    pub async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.role_repo().find_by_name(name).await
    }

    pub async fn find_role_by_id(&self, id: i32) -> Result<Option<Role>> {
        self.role_repo().find_by_id(id).await
    }

    pub async fn create_role(&self, name: &str) -> Result<Role> {
        self.role_repo().create(name).await
    }

    pub async fn grant_role(&self, account_id: i32, role_id: i32) -> Result<()> {
        self.role_repo().grant(account_id, role_id).await
    }

    pub async fn revoke_role(&self, account_id: i32, role_id: i32) -> Result<bool> {
        self.role_repo().revoke(account_id, role_id).await
    }
}
