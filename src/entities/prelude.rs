pub use super::conversations::Entity as Conversations;
pub use super::freelancer_reviews::Entity as FreelancerReviews;
pub use super::freelancers::Entity as Freelancers;
pub use super::job_applications::Entity as JobApplications;
pub use super::jobs::Entity as Jobs;
pub use super::login_attempts::Entity as LoginAttempts;
pub use super::messages::Entity as Messages;
pub use super::post_replies::Entity as PostReplies;
pub use super::post_votes::Entity as PostVotes;
pub use super::posts::Entity as Posts;
pub use super::sessions::Entity as Sessions;
pub use super::users::Entity as Users;
