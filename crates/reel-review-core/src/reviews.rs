use chrono::Utc;
use reel_review_models::{Comment, Genre, Review, StarRating, UserRef};
use serde::Deserialize;
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::{Validate, ValidationError};
use crate::error::{ServiceError, ServiceResult};
use crate::store::{DocumentStore, Mutation};

/// Incoming review fields as submitted by a client.
///
/// Everything is optional here so that missing and malformed values are
/// reported by validation instead of failing deserialization. Any `author`
/// field in the body is ignored; the author always comes from the token.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewDraft {
    pub title: Option<String>,
    #[validate(
        required(message = "Path `movie` is required."),
        length(min = 1, message = "Path `movie` is required.")
    )]
    pub movie: Option<String>,
    #[validate(
        required(message = "Path `director` is required."),
        length(min = 1, message = "Path `director` is required.")
    )]
    pub director: Option<String>,
    #[validate(
        required(message = "Path `genre` is required."),
        length(min = 1, message = "Path `genre` is required."),
        custom(function = "valid_genre")
    )]
    pub genre: Option<String>,
    #[validate(
        required(message = "Path `rating` is required."),
        length(min = 1, message = "Path `rating` is required."),
        custom(function = "valid_rating")
    )]
    pub rating: Option<String>,
    #[validate(
        required(message = "Path `review` is required."),
        length(min = 1, message = "Path `review` is required.")
    )]
    pub review: Option<String>,
}

/// Partial update of a review; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewPatch {
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Path `movie` is required."))]
    pub movie: Option<String>,
    #[validate(length(min = 1, message = "Path `director` is required."))]
    pub director: Option<String>,
    #[validate(
        length(min = 1, message = "Path `genre` is required."),
        custom(function = "valid_genre")
    )]
    pub genre: Option<String>,
    #[validate(
        length(min = 1, message = "Path `rating` is required."),
        custom(function = "valid_rating")
    )]
    pub rating: Option<String>,
    #[validate(length(min = 1, message = "Path `review` is required."))]
    pub review: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentDraft {
    #[validate(
        required(message = "Path `text` is required."),
        length(min = 1, message = "Path `text` is required.")
    )]
    pub text: Option<String>,
}

/// Fields of a review that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidReview {
    pub title: Option<String>,
    pub movie: String,
    pub director: String,
    pub genre: Genre,
    pub rating: StarRating,
    pub review: String,
}

fn enum_value<T: FromStr>(field: &'static str, value: &str) -> Result<(), ValidationError> {
    // Empty values are reported by the length rule
    if value.is_empty() || value.parse::<T>().is_ok() {
        return Ok(());
    }
    Err(ValidationError::new("enum").with_message(Cow::Owned(format!(
        "`{}` is not a valid enum value for path `{}`.",
        value, field
    ))))
}

fn valid_genre(value: &str) -> Result<(), ValidationError> {
    enum_value::<Genre>("genre", value)
}

fn valid_rating(value: &str) -> Result<(), ValidationError> {
    enum_value::<StarRating>("rating", value)
}

/// Run the derived rules and render failures as one message,
/// e.g. "Review validation failed: genre: Path `genre` is required."
fn check(model: &str, input: &impl Validate) -> ServiceResult<()> {
    let errors = match input.validate() {
        Ok(()) => return Ok(()),
        Err(errors) => errors,
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let rendered = fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e.message.as_ref().map_or_else(|| e.code.to_string(), |m| m.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect::<Vec<_>>()
        .join(", ");

    Err(ServiceError::Validation(format!("{} validation failed: {}", model, rendered)))
}

fn rejected(model: &str) -> ServiceError {
    ServiceError::Validation(format!("{} validation failed", model))
}

impl ReviewDraft {
    pub fn into_valid(self) -> ServiceResult<ValidReview> {
        check("Review", &self)?;
        let genre = self.genre.as_deref().and_then(|g| g.parse().ok());
        let rating = self.rating.as_deref().and_then(|r| r.parse().ok());

        match (self.movie, self.director, genre, rating, self.review) {
            (Some(movie), Some(director), Some(genre), Some(rating), Some(review)) => Ok(ValidReview {
                title: self.title.filter(|t| !t.is_empty()),
                movie,
                director,
                genre,
                rating,
                review,
            }),
            _ => Err(rejected("Review")),
        }
    }
}

impl ReviewPatch {
    /// Validate the provided fields and apply them to `review`
    pub fn apply_to(self, review: &mut Review) -> ServiceResult<()> {
        check("Review", &self)?;

        if let Some(title) = self.title {
            review.title = Some(title).filter(|t| !t.is_empty());
        }
        if let Some(movie) = self.movie {
            review.movie = movie;
        }
        if let Some(director) = self.director {
            review.director = director;
        }
        if let Some(genre) = self.genre {
            review.genre = genre.parse().map_err(|_| rejected("Review"))?;
        }
        if let Some(rating) = self.rating {
            review.rating = rating.parse().map_err(|_| rejected("Review"))?;
        }
        if let Some(body) = self.review {
            review.review = body;
        }
        Ok(())
    }
}

impl CommentDraft {
    pub fn into_text(self) -> ServiceResult<String> {
        check("Comment", &self)?;
        self.text.ok_or_else(|| rejected("Comment"))
    }
}

fn parse_id(id: &str, not_found: fn() -> ServiceError) -> ServiceResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| not_found())
}

/// Review CRUD with nested comments and author-only mutation
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn DocumentStore<Review>>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn DocumentStore<Review>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, author: &UserRef, draft: ReviewDraft) -> ServiceResult<Review> {
        let valid = draft.into_valid()?;
        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            title: valid.title,
            movie: valid.movie,
            director: valid.director,
            genre: valid.genre,
            rating: valid.rating,
            review: valid.review,
            author: author.clone(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let review = self.store.insert(review).await?;
        info!(operation = "review_created", review_id = %review.id, author = %author.id, "Review created");
        Ok(review)
    }

    /// All reviews, newest first
    pub async fn list(&self) -> ServiceResult<Vec<Review>> {
        let mut reviews = self.store.list().await?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    pub async fn get(&self, review_id: &str) -> ServiceResult<Review> {
        let id = parse_id(review_id, ServiceError::review_not_found)?;
        self.store
            .get(&id.to_string())
            .await?
            .ok_or_else(ServiceError::review_not_found)
    }

    /// Apply `change` to the stored review under the store's write lock
    async fn modify<'a>(&'a self, review_id: &str, change: Mutation<'a, Review>) -> ServiceResult<Review> {
        let id = parse_id(review_id, ServiceError::review_not_found)?.to_string();
        self.store
            .update(&id, change)
            .await?
            .ok_or_else(ServiceError::review_not_found)
    }

    pub async fn update(&self, actor: &UserRef, review_id: &str, patch: ReviewPatch) -> ServiceResult<Review> {
        let review = self
            .modify(
                review_id,
                Box::new(move |review: &mut Review| -> ServiceResult<()> {
                    ensure_review_author(review, actor)?;
                    patch.apply_to(review)?;
                    review.updated_at = Utc::now();
                    Ok(())
                }),
            )
            .await?;
        info!(operation = "review_updated", review_id = %review.id, "Review updated");
        Ok(review)
    }

    /// Delete a review together with its comments
    pub async fn delete(&self, actor: &UserRef, review_id: &str) -> ServiceResult<Review> {
        // The author never changes, so checking before the remove is enough
        let review = self.get(review_id).await?;
        ensure_review_author(&review, actor)?;
        let removed = self
            .store
            .remove(&review.id.to_string())
            .await?
            .ok_or_else(ServiceError::review_not_found)?;
        info!(
            operation = "review_deleted",
            review_id = %removed.id,
            comments = removed.comments.len(),
            "Review deleted"
        );
        Ok(removed)
    }

    pub async fn add_comment(&self, actor: &UserRef, review_id: &str, draft: CommentDraft) -> ServiceResult<Comment> {
        let mut added = None;
        self.modify(
            review_id,
            Box::new(|review: &mut Review| -> ServiceResult<()> {
                let now = Utc::now();
                let comment = Comment {
                    id: Uuid::new_v4(),
                    text: draft.into_text()?,
                    author: actor.clone(),
                    created_at: now,
                    updated_at: now,
                };
                review.comments.push(comment.clone());
                review.updated_at = now;
                added = Some(comment);
                Ok(())
            }),
        )
        .await?;

        let comment = added.ok_or_else(ServiceError::review_not_found)?;
        info!(operation = "comment_created", review_id = %review_id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    pub async fn update_comment(
        &self,
        actor: &UserRef,
        review_id: &str,
        comment_id: &str,
        draft: CommentDraft,
    ) -> ServiceResult<Comment> {
        let comment_id = parse_id(comment_id, ServiceError::comment_not_found)?;
        let review = self
            .modify(
                review_id,
                Box::new(move |review: &mut Review| -> ServiceResult<()> {
                    let comment = review.comment_mut(comment_id).ok_or_else(ServiceError::comment_not_found)?;
                    if !comment.is_authored_by(actor) {
                        return Err(ServiceError::Forbidden(
                            "You are not authorized to edit this comment".to_string(),
                        ));
                    }

                    let now = Utc::now();
                    comment.text = draft.into_text()?;
                    comment.updated_at = now;
                    review.updated_at = now;
                    Ok(())
                }),
            )
            .await?;

        let updated = review
            .comment(comment_id)
            .cloned()
            .ok_or_else(ServiceError::comment_not_found)?;
        info!(operation = "comment_updated", comment_id = %updated.id, "Comment updated");
        Ok(updated)
    }

    pub async fn delete_comment(&self, actor: &UserRef, review_id: &str, comment_id: &str) -> ServiceResult<Comment> {
        let comment_id = parse_id(comment_id, ServiceError::comment_not_found)?;
        let mut removed = None;
        self.modify(
            review_id,
            Box::new(|review: &mut Review| -> ServiceResult<()> {
                let comment = review.comment(comment_id).ok_or_else(ServiceError::comment_not_found)?;
                if !comment.is_authored_by(actor) {
                    return Err(ServiceError::Forbidden(
                        "You are not authorized to delete this comment".to_string(),
                    ));
                }

                removed = review.remove_comment(comment_id);
                review.updated_at = Utc::now();
                Ok(())
            }),
        )
        .await?;

        let removed = removed.ok_or_else(ServiceError::comment_not_found)?;
        info!(operation = "comment_deleted", comment_id = %removed.id, "Comment deleted");
        Ok(removed)
    }
}

fn ensure_review_author(review: &Review, actor: &UserRef) -> ServiceResult<()> {
    if !review.is_authored_by(actor) {
        debug!("User {} denied access to review {}", actor.id, review.id);
        return Err(ServiceError::Forbidden("You're not allowed to do that!".to_string()));
    }
    Ok(())
}
