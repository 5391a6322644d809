use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{post_replies, post_votes, posts};

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub category: Option<String>,
    pub post_type: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author_id: i32,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub is_resolved: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    pub upvotes: u64,
    pub downvotes: u64,
}

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Newest-first page of posts with optional category, type and text
    /// filters. Returns (rows, `total_pages`, total).
    pub async fn list(
        &self,
        filter: PostFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<posts::Model>, u64, u64)> {
        let mut query = posts::Entity::find().order_by_desc(posts::Column::CreatedAt);

        if let Some(category) = filter.category {
            query = query.filter(posts::Column::Category.eq(category));
        }

        if let Some(post_type) = filter.post_type {
            query = query.filter(posts::Column::PostType.eq(post_type));
        }

        if let Some(search) = filter.search {
            query = query.filter(
                Condition::any()
                    .add(posts::Column::Title.contains(&search))
                    .add(posts::Column::Content.contains(&search)),
            );
        }

        let paginator = query.paginate(&self.conn, page_size);
        let total = paginator.num_items().await?;
        let total_pages = paginator.num_pages().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total_pages, total))
    }

    pub async fn get(&self, id: i32) -> Result<Option<posts::Model>> {
        let post = posts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query post")?;

        Ok(post)
    }

    /// Fetch a post and bump its view counter.
    pub async fn get_and_touch_views(&self, id: i32) -> Result<Option<posts::Model>> {
        let Some(post) = self.get(id).await? else {
            return Ok(None);
        };

        posts::Entity::update_many()
            .col_expr(
                posts::Column::Views,
                Expr::col(posts::Column::Views).add(1),
            )
            .filter(posts::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to increment post views")?;

        Ok(Some(posts::Model {
            views: post.views + 1,
            ..post
        }))
    }

    pub async fn create(&self, new_post: NewPost) -> Result<posts::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = posts::ActiveModel {
            post_type: Set(new_post.post_type),
            title: Set(new_post.title),
            content: Set(new_post.content),
            category: Set(new_post.category),
            author_id: Set(new_post.author_id),
            views: Set(0),
            is_resolved: Set(false),
            tags: Set(new_post.tags),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create post")?;

        Ok(model)
    }

    pub async fn update(&self, id: i32, update: PostUpdate) -> Result<Option<posts::Model>> {
        let Some(post) = self.get(id).await? else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: posts::ActiveModel = post.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(content) = update.content {
            active.content = Set(content);
        }
        if let Some(category) = update.category {
            active.category = Set(category);
        }
        if let Some(tags) = update.tags {
            active.tags = Set(Some(tags));
        }
        if let Some(is_resolved) = update.is_resolved {
            active.is_resolved = Set(is_resolved);
        }
        active.updated_at = Set(now);

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update post")?;

        Ok(Some(model))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = posts::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete post")?;

        Ok(result.rows_affected > 0)
    }

    /// Toggle semantics: voting the same direction again removes the
    /// vote; voting the opposite direction flips it.
    pub async fn vote(&self, post_id: i32, user_id: i32, value: i32) -> Result<VoteTally> {
        let existing = post_votes::Entity::find()
            .filter(post_votes::Column::PostId.eq(post_id))
            .filter(post_votes::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query existing vote")?;

        match existing {
            Some(vote) if vote.value == value => {
                post_votes::Entity::delete_by_id(vote.id)
                    .exec(&self.conn)
                    .await
                    .context("Failed to remove vote")?;
            }
            Some(vote) => {
                let mut active: post_votes::ActiveModel = vote.into();
                active.value = Set(value);
                active
                    .update(&self.conn)
                    .await
                    .context("Failed to flip vote")?;
            }
            None => {
                let active = post_votes::ActiveModel {
                    post_id: Set(post_id),
                    user_id: Set(user_id),
                    value: Set(value),
                    created_at: Set(chrono::Utc::now().to_rfc3339()),
                    ..Default::default()
                };
                post_votes::Entity::insert(active)
                    .exec(&self.conn)
                    .await
                    .context("Failed to insert vote")?;
            }
        }

        self.tally(post_id).await
    }

    pub async fn tally(&self, post_id: i32) -> Result<VoteTally> {
        let upvotes = post_votes::Entity::find()
            .filter(post_votes::Column::PostId.eq(post_id))
            .filter(post_votes::Column::Value.eq(1))
            .count(&self.conn)
            .await
            .context("Failed to count upvotes")?;

        let downvotes = post_votes::Entity::find()
            .filter(post_votes::Column::PostId.eq(post_id))
            .filter(post_votes::Column::Value.eq(-1))
            .count(&self.conn)
            .await
            .context("Failed to count downvotes")?;

        Ok(VoteTally { upvotes, downvotes })
    }

    pub async fn add_reply(
        &self,
        post_id: i32,
        author_id: i32,
        content: &str,
    ) -> Result<post_replies::Model> {
        let active = post_replies::ActiveModel {
            post_id: Set(post_id),
            author_id: Set(author_id),
            content: Set(content.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create reply")?;

        Ok(model)
    }

    pub async fn list_replies(&self, post_id: i32) -> Result<Vec<post_replies::Model>> {
        let replies = post_replies::Entity::find()
            .filter(post_replies::Column::PostId.eq(post_id))
            .order_by_asc(post_replies::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list replies")?;

        Ok(replies)
    }
}
