//! Wire DTOs. Field names are camelCase to match the frontend the API
//! serves.

use serde::Serialize;

use crate::db::{User, VoteTally};
use crate::entities::{
    conversations, freelancer_reviews, freelancers, jobs, messages, post_replies, posts,
};

/// Parse a column that stores a JSON array as text. Bad or missing data
/// degrades to an empty array rather than a 500.
fn json_array(raw: Option<&str>) -> serde_json::Value {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    pub reputation: i32,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub expertise: serde_json::Value,
    pub location: Option<String>,
    pub country_code: String,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            is_verified: user.is_verified,
            reputation: user.reputation,
            bio: user.bio,
            avatar: user.avatar,
            expertise: json_array(user.expertise.as_deref()),
            location: user.location,
            country_code: user.country_code,
            phone: user.phone,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Profile shown to other users; contact details stay private.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserDto {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub is_verified: bool,
    pub reputation: i32,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub expertise: serde_json::Value,
    pub location: Option<String>,
    pub country_code: String,
    pub created_at: String,
}

impl From<User> for PublicUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            is_verified: user.is_verified,
            reputation: user.reputation,
            bio: user.bio,
            avatar: user.avatar,
            expertise: json_array(user.expertise.as_deref()),
            location: user.location,
            country_code: user.country_code,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: i32,
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author_id: i32,
    pub views: i32,
    pub is_resolved: bool,
    pub tags: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

impl From<posts::Model> for PostDto {
    fn from(model: posts::Model) -> Self {
        Self {
            id: model.id,
            post_type: model.post_type,
            title: model.title,
            content: model.content,
            category: model.category,
            author_id: model.author_id,
            views: model.views,
            is_resolved: model.is_resolved,
            tags: json_array(model.tags.as_deref()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDto {
    pub id: i32,
    pub post_id: i32,
    pub author_id: i32,
    pub content: String,
    pub created_at: String,
}

impl From<post_replies::Model> for ReplyDto {
    fn from(model: post_replies::Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            author_id: model.author_id,
            content: model.content,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub posts: Vec<PostDto>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostDto,
    pub author: Option<PublicUserDto>,
    pub replies: Vec<ReplyDto>,
    pub upvotes: u64,
    pub downvotes: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub upvotes: u64,
    pub downvotes: u64,
}

impl From<VoteTally> for VoteResponse {
    fn from(tally: VoteTally) -> Self {
        Self {
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub category: String,
    pub description: String,
    pub requirements: serde_json::Value,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub salary_currency: String,
    pub salary_period: String,
    pub posted_by: i32,
    pub is_active: bool,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<jobs::Model> for JobDto {
    fn from(model: jobs::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            company: model.company,
            location: model.location,
            job_type: model.job_type,
            category: model.category,
            description: model.description,
            requirements: json_array(model.requirements.as_deref()),
            salary_min: model.salary_min,
            salary_max: model.salary_max,
            salary_currency: model.salary_currency,
            salary_period: model.salary_period,
            posted_by: model.posted_by,
            is_active: model.is_active,
            expires_at: model.expires_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub jobs: Vec<JobDto>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerDto {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub category: String,
    pub description: String,
    pub skills: serde_json::Value,
    pub rate_min: Option<i32>,
    pub rate_max: Option<i32>,
    pub rate_currency: String,
    pub availability: String,
    pub rating: f64,
    pub completed_projects: i32,
    pub portfolio: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

impl From<freelancers::Model> for FreelancerDto {
    fn from(model: freelancers::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            category: model.category,
            description: model.description,
            skills: json_array(model.skills.as_deref()),
            rate_min: model.rate_min,
            rate_max: model.rate_max,
            rate_currency: model.rate_currency,
            availability: model.availability,
            rating: model.rating,
            completed_projects: model.completed_projects,
            portfolio: json_array(model.portfolio.as_deref()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerListResponse {
    pub freelancers: Vec<FreelancerDto>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: i32,
    pub freelancer_id: i32,
    pub reviewer_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<freelancer_reviews::Model> for ReviewDto {
    fn from(model: freelancer_reviews::Model) -> Self {
        Self {
            id: model.id,
            freelancer_id: model.freelancer_id,
            reviewer_id: model.reviewer_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerDetailResponse {
    #[serde(flatten)]
    pub freelancer: FreelancerDto,
    pub reviews: Vec<ReviewDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub id: i32,
    pub user_a: i32,
    pub user_b: i32,
    pub last_message_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<conversations::Model> for ConversationDto {
    fn from(model: conversations::Model) -> Self {
        Self {
            id: model.id,
            user_a: model.user_a,
            user_b: model.user_b,
            last_message_id: model.last_message_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: i32,
    pub conversation_id: i32,
    pub sender_id: i32,
    pub content: String,
    pub created_at: String,
}

impl From<messages::Model> for MessageDto {
    fn from(model: messages::Model) -> Self {
        Self {
            id: model.id,
            conversation_id: model.conversation_id,
            sender_id: model.sender_id,
            content: model.content,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: u32,
    pub name: &'static str,
    pub slug: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}
