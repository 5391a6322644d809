//! Domain service for registration and login.
//!
//! Every login attempt, successful or not, is recorded to the attempt
//! log; repeated failures for an identifier push it over the throttle
//! threshold and further logins are refused until the window passes.

use thiserror::Error;

use crate::db::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately carries no detail: unknown identifier and wrong
    /// password must be indistinguishable to the caller.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("An account with this email or username already exists")]
    DuplicateAccount,

    #[error("Too many attempts. Please try again later")]
    RateLimited,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Why a login attempt concluded the way it did, as stored in the
/// attempt log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptReason {
    InvalidCredentials,
    InvalidEmail,
    AccountLocked,
    Success,
    Other,
}

impl AttemptReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidEmail => "invalid_email",
            Self::AccountLocked => "account_locked",
            Self::Success => "success",
            Self::Other => "other",
        }
    }
}

/// Request context forwarded into the attempt log.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub country_code: Option<String>,
    pub phone: Option<String>,
}

/// Successful login or registration: a signed token plus the user it
/// belongs to.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub token: String,
    pub user: User,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and signs the new user in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateAccount`] when the email or
    /// username is already taken (case-insensitive), and
    /// [`AuthError::RateLimited`] when registrations are arriving too
    /// fast.
    async fn register(
        &self,
        request: RegisterRequest,
        client: ClientInfo,
    ) -> Result<AuthOutcome, AuthError>;

    /// Verifies credentials and issues a session.
    ///
    /// The identifier may be an email address or a username; matching
    /// is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RateLimited`] when the identifier has too
    /// many recent failures, and [`AuthError::InvalidCredentials`] for
    /// any credential failure.
    async fn login(
        &self,
        identifier: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<AuthOutcome, AuthError>;

    /// Gets profile information for a signed-in user.
    async fn user_info(&self, user_id: i32) -> Result<User, AuthError>;
}
