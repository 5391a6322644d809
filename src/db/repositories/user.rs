use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;

/// User data returned from the repository (without the password hash).
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    pub reputation: i32,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub expertise: Option<String>,
    pub location: Option<String>,
    pub country_code: String,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            is_verified: model.is_verified,
            reputation: model.reputation,
            bio: model.bio,
            avatar: model.avatar,
            expertise: model.expertise,
            location: model.location,
            country_code: model.country_code,
            phone: model.phone,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub country_code: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub expertise: Option<String>,
    pub location: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Case-insensitive lookup by email or username, used for login.
    /// Returns the user together with the stored password hash.
    pub async fn find_for_login(&self, identifier: &str) -> Result<Option<(User, String)>> {
        let needle = identifier.to_lowercase();

        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(users::Column::Email)))
                            .eq(needle.clone()),
                    )
                    .add(Expr::expr(Func::lower(Expr::col(users::Column::Username))).eq(needle)),
            )
            .one(&self.conn)
            .await
            .context("Failed to query user by identifier")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    /// Case-insensitive check whether the email or username is taken.
    pub async fn identity_taken(&self, email: &str, username: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(users::Column::Email)))
                            .eq(email.to_lowercase()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(users::Column::Username)))
                            .eq(username.to_lowercase()),
                    ),
            )
            .count(&self.conn)
            .await
            .context("Failed to check identity uniqueness")?;

        Ok(count > 0)
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email.to_lowercase()),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role),
            is_verified: Set(false),
            reputation: Set(0),
            country_code: Set(new_user.country_code),
            phone: Set(new_user.phone),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create user")?;

        Ok(User::from(model))
    }

    /// Accounts created at or after the cutoff. Feeds the coarse
    /// registration throttle.
    pub async fn count_created_since(&self, cutoff: &str) -> Result<u64> {
        let count = users::Entity::find()
            .filter(users::Column::CreatedAt.gte(cutoff))
            .count(&self.conn)
            .await
            .context("Failed to count recent registrations")?;

        Ok(count)
    }

    pub async fn update_profile(&self, user_id: i32, update: ProfileUpdate) -> Result<User> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        if let Some(bio) = update.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(avatar) = update.avatar {
            active.avatar = Set(Some(avatar));
        }
        if let Some(expertise) = update.expertise {
            active.expertise = Set(Some(expertise));
        }
        if let Some(location) = update.location {
            active.location = Set(Some(location));
        }
        if let Some(country_code) = update.country_code {
            active.country_code = Set(country_code);
        }
        if let Some(phone) = update.phone {
            active.phone = Set(Some(phone));
        }
        active.updated_at = Set(now);

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update profile")?;

        Ok(User::from(model))
    }
}

/// Hash a password using Argon2id with params from the security config.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash.
/// Run via `spawn_blocking`; Argon2 is CPU-intensive and would stall the
/// async runtime if run inline.
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();

    let is_valid = task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&stored_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        let argon2 = Argon2::default();
        Ok::<bool, anyhow::Error>(
            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")??;

    Ok(is_valid)
}

/// Hash a password on a blocking thread.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();

    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}
