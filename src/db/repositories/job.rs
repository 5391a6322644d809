use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{job_applications, jobs};

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub job_type: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub category: String,
    pub description: String,
    pub requirements: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub salary_currency: String,
    pub salary_period: String,
    pub posted_by: i32,
    pub expires_at: Option<String>,
}

#[derive(Debug)]
pub enum ApplicationOutcome {
    Submitted(job_applications::Model),
    AlreadyApplied,
}

pub struct JobRepository {
    conn: DatabaseConnection,
}

impl JobRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Newest-first page of active jobs. Returns (rows, `total_pages`,
    /// total).
    pub async fn list(
        &self,
        filter: JobFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<jobs::Model>, u64, u64)> {
        let mut query = jobs::Entity::find()
            .filter(jobs::Column::IsActive.eq(true))
            .order_by_desc(jobs::Column::CreatedAt);

        if let Some(job_type) = filter.job_type {
            query = query.filter(jobs::Column::JobType.eq(job_type));
        }

        if let Some(category) = filter.category {
            query = query.filter(jobs::Column::Category.eq(category));
        }

        let paginator = query.paginate(&self.conn, page_size);
        let total = paginator.num_items().await?;
        let total_pages = paginator.num_pages().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total_pages, total))
    }

    pub async fn get(&self, id: i32) -> Result<Option<jobs::Model>> {
        let job = jobs::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query job")?;

        Ok(job)
    }

    pub async fn create(&self, new_job: NewJob) -> Result<jobs::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = jobs::ActiveModel {
            title: Set(new_job.title),
            company: Set(new_job.company),
            location: Set(new_job.location),
            job_type: Set(new_job.job_type),
            category: Set(new_job.category),
            description: Set(new_job.description),
            requirements: Set(new_job.requirements),
            salary_min: Set(new_job.salary_min),
            salary_max: Set(new_job.salary_max),
            salary_currency: Set(new_job.salary_currency),
            salary_period: Set(new_job.salary_period),
            posted_by: Set(new_job.posted_by),
            is_active: Set(true),
            expires_at: Set(new_job.expires_at),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create job")?;

        Ok(model)
    }

    /// Submit an application; a second application from the same user is
    /// reported rather than inserted.
    pub async fn apply(
        &self,
        job_id: i32,
        applicant_id: i32,
        cover_letter: Option<&str>,
        resume: Option<&str>,
    ) -> Result<ApplicationOutcome> {
        let existing = job_applications::Entity::find()
            .filter(job_applications::Column::JobId.eq(job_id))
            .filter(job_applications::Column::ApplicantId.eq(applicant_id))
            .count(&self.conn)
            .await
            .context("Failed to check for existing application")?;

        if existing > 0 {
            return Ok(ApplicationOutcome::AlreadyApplied);
        }

        let active = job_applications::ActiveModel {
            job_id: Set(job_id),
            applicant_id: Set(applicant_id),
            cover_letter: Set(cover_letter.map(str::to_string)),
            resume: Set(resume.map(str::to_string)),
            status: Set("pending".to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create application")?;

        Ok(ApplicationOutcome::Submitted(model))
    }

}
