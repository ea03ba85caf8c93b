//! HTTP surface: axum router, handlers and bearer-token auth.

pub mod auth;
pub mod error;
pub mod extract;
pub mod health;
pub mod movies;
pub mod reviews;
pub mod router;
pub mod state;

pub use auth::{AuthUser, TokenProvider};
pub use error::AppError;
pub use router::create_router;
pub use state::AppState;
