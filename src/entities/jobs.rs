use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub company: String,

    pub location: String,

    /// Full-time | Part-time | Contract | Internship | Freelance
    pub job_type: String,

    pub category: String,

    pub description: String,

    /// JSON array of requirements
    pub requirements: Option<String>,

    pub salary_min: Option<i32>,

    pub salary_max: Option<i32>,

    pub salary_currency: String,

    pub salary_period: String,

    pub posted_by: i32,

    pub is_active: bool,

    pub expires_at: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::PostedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::job_applications::Entity")]
    JobApplications,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::job_applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobApplications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
