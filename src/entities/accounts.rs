use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash (PHC string), never plaintext
    pub password_hash: String,

    /// 22-character alphanumeric salt, also embedded in the PHC string
    pub salt: String,

    pub login_count: i32,

    /// Epoch seconds of the last successful login
    pub last_login_at: Option<i64>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_roles::Entity")]
    AccountRoles,
}

impl Related<super::account_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountRoles.def()
    }
}

impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        super::account_roles::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::account_roles::Relation::Account.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
