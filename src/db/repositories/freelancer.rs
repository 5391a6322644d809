use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{freelancer_reviews, freelancers};

#[derive(Debug, Clone, Default)]
pub struct FreelancerFilter {
    pub category: Option<String>,
    pub availability: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FreelancerProfile {
    pub title: String,
    pub category: String,
    pub description: String,
    pub skills: Option<String>,
    pub rate_min: Option<i32>,
    pub rate_max: Option<i32>,
    pub rate_currency: String,
    pub availability: String,
    pub portfolio: Option<String>,
}

/// Distinguishes first-time profile creation from an update of an
/// existing one, so the handler can answer 201 vs 200.
#[derive(Debug)]
pub enum UpsertOutcome {
    Created(freelancers::Model),
    Updated(freelancers::Model),
}

#[derive(Debug)]
pub enum ReviewOutcome {
    Added(freelancer_reviews::Model),
    AlreadyReviewed,
}

pub struct FreelancerRepository {
    conn: DatabaseConnection,
}

impl FreelancerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Pages freelancers, best rated first, ties broken by completed
    /// project count. Returns (rows, `total_pages`, total).
    pub async fn list(
        &self,
        filter: FreelancerFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<freelancers::Model>, u64, u64)> {
        let mut query = freelancers::Entity::find()
            .order_by_desc(freelancers::Column::Rating)
            .order_by_desc(freelancers::Column::CompletedProjects);

        if let Some(category) = filter.category {
            query = query.filter(freelancers::Column::Category.eq(category));
        }

        if let Some(availability) = filter.availability {
            query = query.filter(freelancers::Column::Availability.eq(availability));
        }

        let paginator = query.paginate(&self.conn, page_size);
        let total = paginator.num_items().await?;
        let total_pages = paginator.num_pages().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total_pages, total))
    }

    pub async fn get(&self, id: i32) -> Result<Option<freelancers::Model>> {
        let freelancer = freelancers::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query freelancer")?;

        Ok(freelancer)
    }

    pub async fn get_by_user(&self, user_id: i32) -> Result<Option<freelancers::Model>> {
        let freelancer = freelancers::Entity::find()
            .filter(freelancers::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query freelancer by user")?;

        Ok(freelancer)
    }

    /// One profile per user: creates on first call, updates afterwards.
    pub async fn upsert(&self, user_id: i32, profile: FreelancerProfile) -> Result<UpsertOutcome> {
        let now = chrono::Utc::now().to_rfc3339();

        if let Some(existing) = self.get_by_user(user_id).await? {
            let mut active: freelancers::ActiveModel = existing.into();
            active.title = Set(profile.title);
            active.category = Set(profile.category);
            active.description = Set(profile.description);
            active.skills = Set(profile.skills);
            active.rate_min = Set(profile.rate_min);
            active.rate_max = Set(profile.rate_max);
            active.rate_currency = Set(profile.rate_currency);
            active.availability = Set(profile.availability);
            active.portfolio = Set(profile.portfolio);
            active.updated_at = Set(now);

            let model = active
                .update(&self.conn)
                .await
                .context("Failed to update freelancer profile")?;

            return Ok(UpsertOutcome::Updated(model));
        }

        let active = freelancers::ActiveModel {
            user_id: Set(user_id),
            title: Set(profile.title),
            category: Set(profile.category),
            description: Set(profile.description),
            skills: Set(profile.skills),
            rate_min: Set(profile.rate_min),
            rate_max: Set(profile.rate_max),
            rate_currency: Set(profile.rate_currency),
            availability: Set(profile.availability),
            rating: Set(0.0),
            completed_projects: Set(0),
            portfolio: Set(profile.portfolio),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create freelancer profile")?;

        Ok(UpsertOutcome::Created(model))
    }

    /// One review per reviewer; the average rating is recomputed from
    /// all reviews after insert.
    pub async fn add_review(
        &self,
        freelancer_id: i32,
        reviewer_id: i32,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<ReviewOutcome> {
        let existing = freelancer_reviews::Entity::find()
            .filter(freelancer_reviews::Column::FreelancerId.eq(freelancer_id))
            .filter(freelancer_reviews::Column::ReviewerId.eq(reviewer_id))
            .count(&self.conn)
            .await
            .context("Failed to check for existing review")?;

        if existing > 0 {
            return Ok(ReviewOutcome::AlreadyReviewed);
        }

        let active = freelancer_reviews::ActiveModel {
            freelancer_id: Set(freelancer_id),
            reviewer_id: Set(reviewer_id),
            rating: Set(rating),
            comment: Set(comment.map(str::to_string)),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create review")?;

        self.recompute_rating(freelancer_id).await?;

        Ok(ReviewOutcome::Added(model))
    }

    pub async fn list_reviews(
        &self,
        freelancer_id: i32,
    ) -> Result<Vec<freelancer_reviews::Model>> {
        let reviews = freelancer_reviews::Entity::find()
            .filter(freelancer_reviews::Column::FreelancerId.eq(freelancer_id))
            .order_by_desc(freelancer_reviews::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list reviews")?;

        Ok(reviews)
    }

    async fn recompute_rating(&self, freelancer_id: i32) -> Result<()> {
        let reviews = self.list_reviews(freelancer_id).await?;

        let average = if reviews.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            {
                f64::from(reviews.iter().map(|r| r.rating).sum::<i32>()) / reviews.len() as f64
            }
        };

        let freelancer = self
            .get(freelancer_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Freelancer not found: {freelancer_id}"))?;

        let mut active: freelancers::ActiveModel = freelancer.into();
        active.rating = Set(average);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update freelancer rating")?;

        Ok(())
    }
}
