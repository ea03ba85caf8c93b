use reel_review_sources::TmdbError;
use thiserror::Error;
use crate::store::StoreError;

/// Errors raised by the review and movie services.
///
/// `NotFound` and `Forbidden` are always raised before any write is
/// attempted, so a rejected mutation never leaves partial state behind.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Upstream(#[from] TmdbError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ServiceError {
    pub fn review_not_found() -> Self {
        ServiceError::NotFound("Review not found".to_string())
    }

    pub fn comment_not_found() -> Self {
        ServiceError::NotFound("Comment not found".to_string())
    }

    pub fn movie_not_found() -> Self {
        ServiceError::NotFound("Movie not found".to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
