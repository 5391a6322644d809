use sea_orm::entity::prelude::*;

/// One review per (freelancer, reviewer); enforced by a unique index.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "freelancer_reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub freelancer_id: i32,

    pub reviewer_id: i32,

    /// 1 to 5 inclusive.
    pub rating: i32,

    pub comment: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::freelancers::Entity",
        from = "Column::FreelancerId",
        to = "super::freelancers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Freelancers,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ReviewerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::freelancers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Freelancers.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
