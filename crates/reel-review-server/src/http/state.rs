use anyhow::Result;
use reel_review_config::{Config, PathManager};
use reel_review_core::{DocumentStore, JsonFileStore, MovieService, ReviewService};
use reel_review_models::{Movie, Review};
use reel_review_sources::{ResponseCache, TmdbClient};
use std::sync::Arc;
use tracing::info;
use crate::http::auth::TokenProvider;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub reviews: ReviewService,
    pub movies: MovieService,
    pub tokens: Arc<TokenProvider>,
}

impl AppState {
    pub fn new(reviews: ReviewService, movies: MovieService, tokens: Arc<TokenProvider>) -> Self {
        Self {
            reviews,
            movies,
            tokens,
        }
    }

    /// Wire stores, cache and upstream client from configuration
    pub fn from_config(config: &Config, paths: &PathManager) -> Result<Self> {
        let review_store: Arc<dyn DocumentStore<Review>>;
        let movie_store: Arc<dyn DocumentStore<Movie>>;
        if config.storage.persist {
            let reviews = JsonFileStore::<Review>::open("reviews", paths.reviews_file())?;
            let movies = JsonFileStore::<Movie>::open("movies", paths.movies_file())?;
            info!(
                "Persisting reviews to {:?} and movies to {:?}",
                reviews.path(),
                movies.path()
            );
            review_store = Arc::new(reviews);
            movie_store = Arc::new(movies);
        } else {
            info!("Storage persistence disabled, collections live in memory");
            review_store = Arc::new(JsonFileStore::<Review>::in_memory("reviews"));
            movie_store = Arc::new(JsonFileStore::<Movie>::in_memory("movies"));
        }

        let cache = Arc::new(ResponseCache::from_config(&config.cache));
        let client = TmdbClient::from_config(&config.tmdb, cache);

        Ok(Self::new(
            ReviewService::new(review_store),
            MovieService::new(client, movie_store, config.movies.refresh_after()),
            Arc::new(TokenProvider::new(&config.auth.jwt_secret)),
        ))
    }
}
