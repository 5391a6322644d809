use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "freelancers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,

    pub title: String,

    pub category: String,

    pub description: String,

    /// JSON array of skills
    pub skills: Option<String>,

    pub rate_min: Option<i32>,

    pub rate_max: Option<i32>,

    pub rate_currency: String,

    /// Available | Busy | Not Available
    pub availability: String,

    /// Average of review ratings, recomputed on every new review.
    pub rating: f64,

    pub completed_projects: i32,

    /// JSON array of portfolio items
    pub portfolio: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::freelancer_reviews::Entity")]
    FreelancerReviews,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::freelancer_reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FreelancerReviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
