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
    ApiError, AppState, PostDetailResponse, PostDto, PostListResponse, PublicUserDto, ReplyDto,
    VoteResponse,
};
use crate::db::{NewPost, PostFilter, PostUpdate};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    pub category: Option<String>,
    pub post_type: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostPayload {
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub is_resolved: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct ReplyPayload {
    pub content: String,
}

fn tags_to_json(tags: Option<Vec<String>>) -> Result<Option<String>, ApiError> {
    tags.map(|t| serde_json::to_string(&t))
        .transpose()
        .map_err(|e| ApiError::internal(format!("Failed to encode tags: {e}")))
}

/// GET /posts
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let page = validation::normalize_page(query.page);
    let page_size = validation::normalize_page_size(query.page_size);

    let filter = PostFilter {
        category: query.category,
        post_type: query.post_type,
        search: query.search,
    };

    let (rows, total_pages, total) = state.store.list_posts(filter, page, page_size).await?;

    Ok(Json(PostListResponse {
        posts: rows.into_iter().map(PostDto::from).collect(),
        total_pages,
        current_page: page,
        total,
    }))
}

/// GET /posts/{id}
/// Reading a post counts as a view.
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let id = validation::validate_id(id, "post")?;

    let post = state
        .store
        .get_post_and_touch_views(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", id))?;

    let author = state
        .store
        .get_user(post.author_id)
        .await?
        .map(PublicUserDto::from);

    let replies = state.store.list_post_replies(id).await?;
    let tally = state.store.post_vote_tally(id).await?;

    Ok(Json(PostDetailResponse {
        post: PostDto::from(post),
        author,
        replies: replies.into_iter().map(ReplyDto::from).collect(),
        upvotes: tally.upvotes,
        downvotes: tally.downvotes,
    }))
}

/// POST /posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreatePostPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_post_type(&payload.post_type)?;
    let title = validation::validate_title(&payload.title)?.to_string();
    let content = validation::validate_content(&payload.content)?.to_string();

    if payload.category.trim().is_empty() {
        return Err(ApiError::validation("Category is required"));
    }

    let post = state
        .store
        .create_post(NewPost {
            post_type: payload.post_type,
            title,
            content,
            category: payload.category,
            author_id: current.id,
            tags: tags_to_json(payload.tags)?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

/// PUT /posts/{id}
/// Only the author may edit.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePostPayload>,
) -> Result<Json<PostDto>, ApiError> {
    let id = validation::validate_id(id, "post")?;

    let post = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", id))?;

    if post.author_id != current.id {
        return Err(ApiError::forbidden("Only the author can edit this post"));
    }

    if let Some(title) = &payload.title {
        validation::validate_title(title)?;
    }
    if let Some(content) = &payload.content {
        validation::validate_content(content)?;
    }

    let updated = state
        .store
        .update_post(
            id,
            PostUpdate {
                title: payload.title,
                content: payload.content,
                category: payload.category,
                is_resolved: payload.is_resolved,
                tags: tags_to_json(payload.tags)?,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Post", id))?;

    Ok(Json(PostDto::from(updated)))
}

/// DELETE /posts/{id}
/// Only the author may delete.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let id = validation::validate_id(id, "post")?;

    let post = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", id))?;

    if post.author_id != current.id {
        return Err(ApiError::forbidden("Only the author can delete this post"));
    }

    state.store.delete_post(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /posts/{id}/upvote
/// Voting the same way twice removes the vote; voting the other way
/// flips it.
pub async fn upvote_post(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<VoteResponse>, ApiError> {
    vote(&state, current.id, id, 1).await
}

/// POST /posts/{id}/downvote
pub async fn downvote_post(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<VoteResponse>, ApiError> {
    vote(&state, current.id, id, -1).await
}

async fn vote(
    state: &AppState,
    user_id: i32,
    post_id: i32,
    value: i32,
) -> Result<Json<VoteResponse>, ApiError> {
    let post_id = validation::validate_id(post_id, "post")?;

    state
        .store
        .get_post(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", post_id))?;

    let tally = state.store.vote_post(post_id, user_id, value).await?;

    Ok(Json(VoteResponse::from(tally)))
}

/// POST /posts/{id}/replies
pub async fn add_reply(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<ReplyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let id = validation::validate_id(id, "post")?;
    let content = validation::validate_content(&payload.content)?;

    state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", id))?;

    let reply = state.store.add_post_reply(id, current.id, content).await?;

    Ok((StatusCode::CREATED, Json(ReplyDto::from(reply))))
}
