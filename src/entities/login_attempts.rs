use sea_orm::entity::prelude::*;

/// Append-only audit record of login outcomes. Rows are never updated,
/// only inserted and eventually pruned by the retention sweep.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "login_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Lowercased email or username the caller presented.
    pub identifier: String,

    pub ip_address: String,

    pub user_agent: Option<String>,

    pub success: bool,

    /// One of: invalid_credentials, invalid_email, account_locked,
    /// success, other.
    pub reason: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
