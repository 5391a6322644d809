use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{conversations, freelancer_reviews, freelancers, jobs, login_attempts,
    messages, post_replies, posts};

pub mod migrator;
pub mod repositories;

pub use repositories::freelancer::{
    FreelancerFilter, FreelancerProfile, ReviewOutcome, UpsertOutcome,
};
pub use repositories::job::{ApplicationOutcome, JobFilter, NewJob};
pub use repositories::message::ConversationOutcome;
pub use repositories::post::{NewPost, PostFilter, PostUpdate, VoteTally};
pub use repositories::user::{NewUser, ProfileUpdate, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn login_attempt_repo(&self) -> repositories::login_attempt::LoginAttemptRepository {
        repositories::login_attempt::LoginAttemptRepository::new(self.conn.clone())
    }

    fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    fn post_repo(&self) -> repositories::post::PostRepository {
        repositories::post::PostRepository::new(self.conn.clone())
    }

    fn job_repo(&self) -> repositories::job::JobRepository {
        repositories::job::JobRepository::new(self.conn.clone())
    }

    fn freelancer_repo(&self) -> repositories::freelancer::FreelancerRepository {
        repositories::freelancer::FreelancerRepository::new(self.conn.clone())
    }

    fn message_repo(&self) -> repositories::message::MessageRepository {
        repositories::message::MessageRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn find_user_for_login(&self, identifier: &str) -> Result<Option<(User, String)>> {
        self.user_repo().find_for_login(identifier).await
    }

    pub async fn user_identity_taken(&self, email: &str, username: &str) -> Result<bool> {
        self.user_repo().identity_taken(email, username).await
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.user_repo().create(new_user).await
    }

    pub async fn count_users_created_since(&self, cutoff: &str) -> Result<u64> {
        self.user_repo().count_created_since(cutoff).await
    }

    pub async fn update_user_profile(&self, user_id: i32, update: ProfileUpdate) -> Result<User> {
        self.user_repo().update_profile(user_id, update).await
    }

    // ========== Login attempts ==========

    pub async fn record_login_attempt(
        &self,
        identifier: &str,
        ip_address: &str,
        user_agent: Option<&str>,
        success: bool,
        reason: &str,
    ) -> Result<()> {
        self.login_attempt_repo()
            .record(identifier, ip_address, user_agent, success, reason)
            .await
    }

    pub async fn count_recent_login_failures(
        &self,
        identifier: &str,
        cutoff: &str,
    ) -> Result<u64> {
        self.login_attempt_repo()
            .count_recent_failures(identifier, cutoff)
            .await
    }

    pub async fn count_login_attempts(&self, identifier: &str) -> Result<u64> {
        self.login_attempt_repo()
            .count_for_identifier(identifier)
            .await
    }

    pub async fn recent_login_attempts(
        &self,
        identifier: &str,
        limit: u64,
    ) -> Result<Vec<login_attempts::Model>> {
        self.login_attempt_repo()
            .recent_for_identifier(identifier, limit)
            .await
    }

    pub async fn prune_login_attempts(&self, cutoff: &str) -> Result<u64> {
        self.login_attempt_repo().prune(cutoff).await
    }

    // ========== Sessions ==========

    pub async fn create_session(
        &self,
        user_id: i32,
        token: &str,
        ip_address: &str,
        user_agent: Option<&str>,
        expires_at: &str,
    ) -> Result<crate::entities::sessions::Model> {
        self.session_repo()
            .create(user_id, token, ip_address, user_agent, expires_at)
            .await
    }

    pub async fn count_active_sessions(&self, user_id: i32) -> Result<u64> {
        self.session_repo().count_active_for_user(user_id).await
    }

    pub async fn deactivate_expired_sessions(&self, now: &str) -> Result<u64> {
        self.session_repo().deactivate_expired(now).await
    }

    // ========== Posts ==========

    pub async fn list_posts(
        &self,
        filter: PostFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<posts::Model>, u64, u64)> {
        self.post_repo().list(filter, page, page_size).await
    }

    pub async fn get_post(&self, id: i32) -> Result<Option<posts::Model>> {
        self.post_repo().get(id).await
    }

    pub async fn get_post_and_touch_views(&self, id: i32) -> Result<Option<posts::Model>> {
        self.post_repo().get_and_touch_views(id).await
    }

    pub async fn create_post(&self, new_post: NewPost) -> Result<posts::Model> {
        self.post_repo().create(new_post).await
    }

    pub async fn update_post(&self, id: i32, update: PostUpdate) -> Result<Option<posts::Model>> {
        self.post_repo().update(id, update).await
    }

    pub async fn delete_post(&self, id: i32) -> Result<bool> {
        self.post_repo().delete(id).await
    }

    pub async fn vote_post(&self, post_id: i32, user_id: i32, value: i32) -> Result<VoteTally> {
        self.post_repo().vote(post_id, user_id, value).await
    }

    pub async fn post_vote_tally(&self, post_id: i32) -> Result<VoteTally> {
        self.post_repo().tally(post_id).await
    }

    pub async fn add_post_reply(
        &self,
        post_id: i32,
        author_id: i32,
        content: &str,
    ) -> Result<post_replies::Model> {
        self.post_repo().add_reply(post_id, author_id, content).await
    }

    pub async fn list_post_replies(&self, post_id: i32) -> Result<Vec<post_replies::Model>> {
        self.post_repo().list_replies(post_id).await
    }

    // ========== Jobs ==========

    pub async fn list_jobs(
        &self,
        filter: JobFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<jobs::Model>, u64, u64)> {
        self.job_repo().list(filter, page, page_size).await
    }

    pub async fn get_job(&self, id: i32) -> Result<Option<jobs::Model>> {
        self.job_repo().get(id).await
    }

    pub async fn create_job(&self, new_job: NewJob) -> Result<jobs::Model> {
        self.job_repo().create(new_job).await
    }

    pub async fn apply_to_job(
        &self,
        job_id: i32,
        applicant_id: i32,
        cover_letter: Option<&str>,
        resume: Option<&str>,
    ) -> Result<ApplicationOutcome> {
        self.job_repo()
            .apply(job_id, applicant_id, cover_letter, resume)
            .await
    }

    // ========== Freelancers ==========

    pub async fn list_freelancers(
        &self,
        filter: FreelancerFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<freelancers::Model>, u64, u64)> {
        self.freelancer_repo().list(filter, page, page_size).await
    }

    pub async fn get_freelancer(&self, id: i32) -> Result<Option<freelancers::Model>> {
        self.freelancer_repo().get(id).await
    }

    pub async fn get_freelancer_by_user(
        &self,
        user_id: i32,
    ) -> Result<Option<freelancers::Model>> {
        self.freelancer_repo().get_by_user(user_id).await
    }

    pub async fn upsert_freelancer(
        &self,
        user_id: i32,
        profile: FreelancerProfile,
    ) -> Result<UpsertOutcome> {
        self.freelancer_repo().upsert(user_id, profile).await
    }

    pub async fn add_freelancer_review(
        &self,
        freelancer_id: i32,
        reviewer_id: i32,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<ReviewOutcome> {
        self.freelancer_repo()
            .add_review(freelancer_id, reviewer_id, rating, comment)
            .await
    }

    pub async fn list_freelancer_reviews(
        &self,
        freelancer_id: i32,
    ) -> Result<Vec<freelancer_reviews::Model>> {
        self.freelancer_repo().list_reviews(freelancer_id).await
    }

    // ========== Messaging ==========

    pub async fn list_conversations(&self, user_id: i32) -> Result<Vec<conversations::Model>> {
        self.message_repo().list_conversations(user_id).await
    }

    pub async fn get_conversation(&self, id: i32) -> Result<Option<conversations::Model>> {
        self.message_repo().get_conversation(id).await
    }

    pub async fn find_or_create_conversation(
        &self,
        user_one: i32,
        user_two: i32,
    ) -> Result<ConversationOutcome> {
        self.message_repo()
            .find_or_create_conversation(user_one, user_two)
            .await
    }

    pub async fn list_messages(&self, conversation_id: i32) -> Result<Vec<messages::Model>> {
        self.message_repo().list_messages(conversation_id).await
    }

    pub async fn send_message(
        &self,
        conversation_id: i32,
        sender_id: i32,
        content: &str,
    ) -> Result<messages::Model> {
        self.message_repo()
            .send(conversation_id, sender_id, content)
            .await
    }
}
