pub mod prelude;

pub mod conversations;
pub mod freelancer_reviews;
pub mod freelancers;
pub mod job_applications;
pub mod jobs;
pub mod login_attempts;
pub mod messages;
pub mod post_replies;
pub mod post_votes;
pub mod posts;
pub mod sessions;
pub mod users;
