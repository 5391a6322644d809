use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// question | information | opinion | knowledge
    pub post_type: String,

    pub title: String,

    pub content: String,

    pub category: String,

    pub author_id: i32,

    pub views: i32,

    pub is_resolved: bool,

    /// JSON array of tags
    pub tags: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::post_replies::Entity")]
    PostReplies,
    #[sea_orm(has_many = "super::post_votes::Entity")]
    PostVotes,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::post_replies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostReplies.def()
    }
}

impl Related<super::post_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostVotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
