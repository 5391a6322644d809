use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, AuthResponse, UserDto};
use crate::services::{AuthService, ClientInfo, RegisterRequest};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub country_code: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    /// Email address or username.
    #[serde(alias = "identifier")]
    pub username_or_email: String,
    pub password: String,
}

/// Identity of the signed-in user, inserted by the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub role: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires a valid `Authorization: Bearer <token>` header and loads the
/// token's user into request extensions as [`CurrentUser`].
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let Some(token) = extract_bearer_token(&headers) else {
        return Err(ApiError::Unauthorized(
            "Authentication required".to_string(),
        ));
    };

    let Ok(user_id) = state.tokens.verify(&token) else {
        return Err(ApiError::Unauthorized(
            "Invalid or expired token".to_string(),
        ));
    };

    let user = state
        .store
        .get_user(user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load user: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    tracing::Span::current().record("user_id", user.id);

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
        role: user.role,
    });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;

    Some(token.trim().to_string())
}

/// Best-effort client address for the attempt log. The first entry of
/// `X-Forwarded-For` when present, since the service expects to sit
/// behind a proxy.
pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map_or_else(|| "unknown".to_string(), |ip| ip.trim().to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    ClientInfo {
        ip_address,
        user_agent,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create an account and sign the new user in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let client = client_info(&headers);

    let outcome = state
        .auth
        .register(
            RegisterRequest {
                username: payload.username,
                email: payload.email,
                password: payload.password,
                role: payload.role,
                country_code: payload.country_code,
                phone: payload.phone,
            },
            client,
        )
        .await?;

    tracing::info!(username = %outcome.user.username, "New account registered");

    let body = AuthResponse {
        token: outcome.token,
        user: UserDto::from(outcome.user),
    };

    Ok((StatusCode::CREATED, Json(body)))
}

/// POST /auth/login
/// Authenticate with email or username plus password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    let client = client_info(&headers);

    let outcome = state
        .auth
        .login(&payload.username_or_email, &payload.password, client)
        .await?;

    Ok(Json(AuthResponse {
        token: outcome.token,
        user: UserDto::from(outcome.user),
    }))
}

/// GET /auth/me
/// Profile of the signed-in user.
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    axum::Extension(current): axum::Extension<CurrentUser>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.auth.user_info(current.id).await?;

    Ok(Json(UserDto::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn missing_or_malformed_auth_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn client_ip_prefers_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_info(&headers).ip_address, "203.0.113.9");
    }

    #[test]
    fn client_ip_falls_back_to_unknown() {
        assert_eq!(client_info(&HeaderMap::new()).ip_address, "unknown");
    }
}
