use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation;
use super::{ApiError, AppState, JobDto, JobListResponse, MessageResponse};
use crate::db::{ApplicationOutcome, JobFilter, NewJob};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobPayload {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub category: String,
    pub description: String,
    pub requirements: Option<Vec<String>>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub salary_currency: Option<String>,
    pub salary_period: Option<String>,
    pub expires_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPayload {
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
}

/// GET /jobs
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<JobListResponse>, ApiError> {
    let page = validation::normalize_page(query.page);
    let page_size = validation::normalize_page_size(query.page_size);

    let filter = JobFilter {
        job_type: query.job_type,
        category: query.category,
    };

    let (rows, total_pages, total) = state.store.list_jobs(filter, page, page_size).await?;

    Ok(Json(JobListResponse {
        jobs: rows.into_iter().map(JobDto::from).collect(),
        total_pages,
        current_page: page,
        total,
    }))
}

/// GET /jobs/{id}
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<JobDto>, ApiError> {
    let id = validation::validate_id(id, "job")?;

    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job", id))?;

    Ok(Json(JobDto::from(job)))
}

/// POST /jobs
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let title = validation::validate_title(&payload.title)?.to_string();
    validation::validate_job_type(&payload.job_type)?;
    let description = validation::validate_content(&payload.description)?.to_string();

    if payload.company.trim().is_empty() {
        return Err(ApiError::validation("Company is required"));
    }

    let requirements = payload
        .requirements
        .map(|r| serde_json::to_string(&r))
        .transpose()
        .map_err(|e| ApiError::internal(format!("Failed to encode requirements: {e}")))?;

    let job = state
        .store
        .create_job(NewJob {
            title,
            company: payload.company,
            location: payload.location,
            job_type: payload.job_type,
            category: payload.category,
            description,
            requirements,
            salary_min: payload.salary_min,
            salary_max: payload.salary_max,
            salary_currency: payload.salary_currency.unwrap_or_else(|| "KES".to_string()),
            salary_period: payload.salary_period.unwrap_or_else(|| "month".to_string()),
            posted_by: current.id,
            expires_at: payload.expires_at,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(JobDto::from(job))))
}

/// POST /jobs/{id}/apply
/// One application per user per job.
pub async fn apply_to_job(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let id = validation::validate_id(id, "job")?;

    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job", id))?;

    if !job.is_active {
        return Err(ApiError::validation("This job is no longer active"));
    }

    let outcome = state
        .store
        .apply_to_job(
            id,
            current.id,
            payload.cover_letter.as_deref(),
            payload.resume.as_deref(),
        )
        .await?;

    match outcome {
        ApplicationOutcome::Submitted(_) => Ok((
            StatusCode::CREATED,
            Json(MessageResponse {
                message: "Application submitted".to_string(),
            }),
        )),
        ApplicationOutcome::AlreadyApplied => {
            Err(ApiError::conflict("You have already applied to this job"))
        }
    }
}
