pub mod freelancer;
pub mod job;
pub mod login_attempt;
pub mod message;
pub mod post;
pub mod session;
pub mod user;
