use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation;
use super::{ApiError, AppState, PublicUserDto, UserDto};
use crate::db::ProfileUpdate;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub location: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
}

/// GET /users/{username}
/// Public profile lookup.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<PublicUserDto>, ApiError> {
    let user = state
        .store
        .get_user_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &username))?;

    Ok(Json(PublicUserDto::from(user)))
}

/// PUT /users/profile
/// Update the signed-in user's own profile.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<UserDto>, ApiError> {
    if let Some(bio) = &payload.bio {
        validation::validate_bio(bio)?;
    }

    let expertise = payload
        .expertise
        .map(|e| serde_json::to_string(&e))
        .transpose()
        .map_err(|e| ApiError::internal(format!("Failed to encode expertise: {e}")))?;

    let user = state
        .store
        .update_user_profile(
            current.id,
            ProfileUpdate {
                bio: payload.bio,
                avatar: payload.avatar,
                expertise,
                location: payload.location,
                country_code: payload.country_code,
                phone: payload.phone,
            },
        )
        .await?;

    Ok(Json(UserDto::from(user)))
}
