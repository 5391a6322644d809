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
use super::{
    ApiError, AppState, FreelancerDetailResponse, FreelancerDto, FreelancerListResponse, ReviewDto,
};
use crate::db::{FreelancerFilter, FreelancerProfile, ReviewOutcome, UpsertOutcome};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerListQuery {
    pub category: Option<String>,
    pub availability: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfilePayload {
    pub title: String,
    pub category: String,
    pub description: String,
    pub skills: Option<Vec<String>>,
    pub rate_min: Option<i32>,
    pub rate_max: Option<i32>,
    pub rate_currency: Option<String>,
    pub availability: String,
    pub portfolio: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub struct ReviewPayload {
    pub rating: i32,
    pub comment: Option<String>,
}

/// GET /freelancers
pub async fn list_freelancers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FreelancerListQuery>,
) -> Result<Json<FreelancerListResponse>, ApiError> {
    let page = validation::normalize_page(query.page);
    let page_size = validation::normalize_page_size(query.page_size);

    let filter = FreelancerFilter {
        category: query.category,
        availability: query.availability,
    };

    let (rows, total_pages, total) = state
        .store
        .list_freelancers(filter, page, page_size)
        .await?;

    Ok(Json(FreelancerListResponse {
        freelancers: rows.into_iter().map(FreelancerDto::from).collect(),
        total_pages,
        current_page: page,
        total,
    }))
}

/// GET /freelancers/{id}
pub async fn get_freelancer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<FreelancerDetailResponse>, ApiError> {
    let id = validation::validate_id(id, "freelancer")?;

    let freelancer = state
        .store
        .get_freelancer(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Freelancer", id))?;

    let reviews = state.store.list_freelancer_reviews(id).await?;

    Ok(Json(FreelancerDetailResponse {
        freelancer: FreelancerDto::from(freelancer),
        reviews: reviews.into_iter().map(ReviewDto::from).collect(),
    }))
}

/// POST /freelancers/profile
/// Creates the caller's profile on first call (201), updates it on
/// subsequent calls (200).
pub async fn upsert_profile(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpsertProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let title = validation::validate_title(&payload.title)?.to_string();
    let description = validation::validate_content(&payload.description)?.to_string();
    validation::validate_availability(&payload.availability)?;

    let skills = payload
        .skills
        .map(|s| serde_json::to_string(&s))
        .transpose()
        .map_err(|e| ApiError::internal(format!("Failed to encode skills: {e}")))?;

    let portfolio = payload
        .portfolio
        .map(|p| serde_json::to_string(&p))
        .transpose()
        .map_err(|e| ApiError::internal(format!("Failed to encode portfolio: {e}")))?;

    let profile = FreelancerProfile {
        title,
        category: payload.category,
        description,
        skills,
        rate_min: payload.rate_min,
        rate_max: payload.rate_max,
        rate_currency: payload.rate_currency.unwrap_or_else(|| "KES".to_string()),
        availability: payload.availability,
        portfolio,
    };

    match state.store.upsert_freelancer(current.id, profile).await? {
        UpsertOutcome::Created(model) => {
            Ok((StatusCode::CREATED, Json(FreelancerDto::from(model))))
        }
        UpsertOutcome::Updated(model) => Ok((StatusCode::OK, Json(FreelancerDto::from(model)))),
    }
}

/// POST /freelancers/{id}/reviews
/// One review per reviewer; freelancers cannot review themselves.
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<ReviewPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let id = validation::validate_id(id, "freelancer")?;
    validation::validate_rating(payload.rating)?;

    let freelancer = state
        .store
        .get_freelancer(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Freelancer", id))?;

    if freelancer.user_id == current.id {
        return Err(ApiError::validation("You cannot review your own profile"));
    }

    let outcome = state
        .store
        .add_freelancer_review(id, current.id, payload.rating, payload.comment.as_deref())
        .await?;

    match outcome {
        ReviewOutcome::Added(model) => Ok((StatusCode::CREATED, Json(ReviewDto::from(model)))),
        ReviewOutcome::AlreadyReviewed => Err(ApiError::conflict(
            "You have already reviewed this freelancer",
        )),
    }
}
