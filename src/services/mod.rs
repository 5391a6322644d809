pub mod auth_service;
pub mod auth_service_impl;
pub mod tokens;

pub use auth_service::{
    AttemptReason, AuthError, AuthOutcome, AuthService, ClientInfo, RegisterRequest,
};
pub use auth_service_impl::SeaOrmAuthService;
pub use tokens::TokenSigner;
