use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::entities::{account_roles, roles};
use crate::models::Role;

pub struct RoleRepository {
    conn: DatabaseConnection,
}

impl RoleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let role = roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query role by name")?;

        Ok(role.map(Role::from))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Role>> {
        let role = roles::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query role by ID")?;

        Ok(role.map(Role::from))
    }

    pub async fn create(&self, name: &str) -> Result<Role> {
        let active = roles::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert role")?;

        Ok(Role::from(model))
    }

    /// Associate an account with a role. Granting twice is a no-op.
    pub async fn grant(&self, account_id: i32, role_id: i32) -> Result<()> {
        let active = account_roles::ActiveModel {
            account_id: Set(account_id),
            role_id: Set(role_id),
        };

        let insert = account_roles::Entity::insert(active).on_conflict(
            OnConflict::columns([
                account_roles::Column::AccountId,
                account_roles::Column::RoleId,
            ])
            .do_nothing()
            .to_owned(),
        );

        match insert.exec(&self.conn).await {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e).context("Failed to grant role"),
        }
    }

    /// Remove an association. Returns whether a row was actually deleted.
    pub async fn revoke(&self, account_id: i32, role_id: i32) -> Result<bool> {
        let result = account_roles::Entity::delete_many()
            .filter(account_roles::Column::AccountId.eq(account_id))
            .filter(account_roles::Column::RoleId.eq(role_id))
            .exec(&self.conn)
            .await
            .context("Failed to revoke role")?;

        Ok(result.rows_affected > 0)
    }
}
