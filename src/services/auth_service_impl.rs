//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User};
use crate::db::repositories::user::{hash_password_blocking, verify_password};
use crate::services::auth_service::{
    AttemptReason, AuthError, AuthOutcome, AuthService, ClientInfo, RegisterRequest,
};
use crate::services::tokens::TokenSigner;

const VALID_ROLES: &[&str] = &["member", "expert", "employer", "admin"];

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenSigner,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, tokens: TokenSigner, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    /// Attempt logging must never turn a login verdict into a 500, so
    /// failures are logged and swallowed.
    async fn record_attempt(
        &self,
        identifier: &str,
        client: &ClientInfo,
        success: bool,
        reason: AttemptReason,
    ) {
        if let Err(err) = self
            .store
            .record_login_attempt(
                identifier,
                &client.ip_address,
                client.user_agent.as_deref(),
                success,
                reason.as_str(),
            )
            .await
        {
            warn!(identifier, error = %err, "Failed to record login attempt");
        }
    }

    /// True when the identifier has reached the failure threshold
    /// within the throttle window.
    async fn is_blocked(&self, identifier: &str) -> Result<bool, AuthError> {
        let throttle = &self.security.auth_throttle;
        let cutoff =
            (Utc::now() - Duration::minutes(throttle.window_minutes)).to_rfc3339();

        let failures = self
            .store
            .count_recent_login_failures(identifier, &cutoff)
            .await?;

        Ok(failures >= u64::from(throttle.max_attempts))
    }

    async fn issue_session(
        &self,
        user: User,
        client: &ClientInfo,
    ) -> Result<AuthOutcome, AuthError> {
        let (token, expires_at) = self.tokens.issue(user.id)?;

        self.store
            .create_session(
                user.id,
                &token,
                &client.ip_address,
                client.user_agent.as_deref(),
                &expires_at.to_rfc3339(),
            )
            .await?;

        Ok(AuthOutcome { token, user })
    }

    fn validate_registration(request: &RegisterRequest) -> Result<(), AuthError> {
        if request.username.trim().len() < 3 {
            return Err(AuthError::Validation(
                "Username must be at least 3 characters".to_string(),
            ));
        }

        if !is_plausible_email(&request.email) {
            return Err(AuthError::Validation(
                "A valid email address is required".to_string(),
            ));
        }

        if request.password.len() < 8 {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if !VALID_ROLES.contains(&request.role.as_str()) {
            return Err(AuthError::Validation(format!(
                "Role must be one of: {}",
                VALID_ROLES.join(", ")
            )));
        }

        Ok(())
    }
}

/// Good enough to catch typos; real verification happens out of band.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        request: RegisterRequest,
        client: ClientInfo,
    ) -> Result<AuthOutcome, AuthError> {
        Self::validate_registration(&request)?;

        if self
            .store
            .user_identity_taken(&request.email, &request.username)
            .await?
        {
            return Err(AuthError::DuplicateAccount);
        }

        // Coarse global throttle on account creation. 0 disables it.
        let max_per_hour = self.security.auth_throttle.registration_max_per_hour;
        if max_per_hour > 0 {
            let hour_ago = (Utc::now() - Duration::hours(1)).to_rfc3339();
            let recent = self.store.count_users_created_since(&hour_ago).await?;
            if recent >= u64::from(max_per_hour) {
                return Err(AuthError::RateLimited);
            }
        }

        let password_hash = hash_password_blocking(&request.password, &self.security).await?;

        let user = self
            .store
            .create_user(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                role: request.role,
                country_code: request.country_code.unwrap_or_else(|| "KE".to_string()),
                phone: request.phone,
            })
            .await
            .map_err(|err| {
                // A concurrent registration can slip past the pre-check
                // and hit the unique index instead.
                let msg = err.to_string();
                if msg.to_lowercase().contains("unique") {
                    AuthError::DuplicateAccount
                } else {
                    AuthError::Internal(msg)
                }
            })?;

        self.issue_session(user, &client).await
    }

    async fn login(
        &self,
        identifier: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<AuthOutcome, AuthError> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Identifier and password are required".to_string(),
            ));
        }

        let identifier = identifier.trim().to_lowercase();

        if self.is_blocked(&identifier).await? {
            // Refused attempts still count as credential failures, so
            // the window keeps extending while the caller hammers.
            self.record_attempt(&identifier, &client, false, AttemptReason::InvalidCredentials)
                .await;
            return Err(AuthError::RateLimited);
        }

        let Some((user, stored_hash)) = self.store.find_user_for_login(&identifier).await? else {
            self.record_attempt(&identifier, &client, false, AttemptReason::InvalidEmail)
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        let verified = verify_password(password, &stored_hash).await?;

        if !verified {
            self.record_attempt(
                &identifier,
                &client,
                false,
                AttemptReason::InvalidCredentials,
            )
            .await;
            return Err(AuthError::InvalidCredentials);
        }

        self.record_attempt(&identifier, &client, true, AttemptReason::Success)
            .await;

        self.issue_session(user, &client).await
    }

    async fn user_info(&self, user_id: i32) -> Result<User, AuthError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_emails() {
        assert!(is_plausible_email("amina@example.com"));
        assert!(is_plausible_email("a.b+tag@sub.example.org"));
    }

    #[test]
    fn implausible_emails() {
        assert!(!is_plausible_email("not-an-email"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("user@nodot"));
        assert!(!is_plausible_email("user@.com"));
    }
}
