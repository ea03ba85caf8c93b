pub mod error;
pub mod movies;
pub mod reviews;
pub mod store;

pub use error::{ServiceError, ServiceResult};
pub use movies::{normalize_movie, MovieService};
pub use reviews::{CommentDraft, ReviewDraft, ReviewPatch, ReviewService, ValidReview};
pub use store::{Document, DocumentStore, JsonFileStore, Mutation, StoreError};
