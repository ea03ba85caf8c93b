use chrono::{DateTime, Duration, NaiveDate, Utc};
use reel_review_models::Movie;
use reel_review_sources::{TmdbClient, TmdbMovieDetails};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use crate::error::{ServiceError, ServiceResult};
use crate::store::DocumentStore;

pub const DEFAULT_PAGE: u32 = 1;

/// Movie lookups backed by the upstream client and a local mirror.
///
/// List endpoints pass the upstream JSON through. Detail lookups keep a
/// normalized `Movie` per upstream id: a record younger than
/// `refresh_after` is served locally, anything older (or missing) is fetched
/// again and upserted in place.
#[derive(Clone)]
pub struct MovieService {
    client: TmdbClient,
    store: Arc<dyn DocumentStore<Movie>>,
    refresh_after: Duration,
}

impl MovieService {
    pub fn new(client: TmdbClient, store: Arc<dyn DocumentStore<Movie>>, refresh_after: Duration) -> Self {
        Self {
            client,
            store,
            refresh_after,
        }
    }

    pub fn client(&self) -> &TmdbClient {
        &self.client
    }

    pub async fn popular(&self, page: Option<u32>) -> ServiceResult<Value> {
        Ok(self.client.popular_movies(page.unwrap_or(DEFAULT_PAGE)).await?)
    }

    pub async fn search(&self, query: &str, page: Option<u32>) -> ServiceResult<Value> {
        Ok(self.client.search_movies(query, page.unwrap_or(DEFAULT_PAGE)).await?)
    }

    pub async fn recommendations(&self, movie_id: &str, page: Option<u32>) -> ServiceResult<Value> {
        let movie_id = parse_movie_id(movie_id)?;
        Ok(self
            .client
            .recommendations(movie_id, page.unwrap_or(DEFAULT_PAGE))
            .await?)
    }

    pub async fn get_movie(&self, movie_id: &str) -> ServiceResult<Movie> {
        self.get_movie_at(movie_id, Utc::now()).await
    }

    pub async fn get_movie_at(&self, movie_id: &str, now: DateTime<Utc>) -> ServiceResult<Movie> {
        let tmdb_id = parse_movie_id(movie_id)?;
        let existing = self.store.get(&tmdb_id.to_string()).await?;

        if let Some(movie) = &existing {
            if !movie.is_stale(now, self.refresh_after) {
                debug!("Serving movie {} from local mirror", tmdb_id);
                return Ok(movie.clone());
            }
        }

        let payload = self.client.movie_details(tmdb_id).await?;
        let details = TmdbMovieDetails::from_value(&payload)?;
        let created_at = existing.as_ref().map(|m| m.created_at).unwrap_or(now);
        let movie = normalize_movie(&details, created_at, now);

        let operation = if existing.is_some() { "movie_refreshed" } else { "movie_mirrored" };
        let movie = self.store.upsert(movie).await?;
        info!(
            operation = operation,
            tmdb_id = movie.tmdb_id,
            title = %movie.title,
            "Movie details stored"
        );
        Ok(movie)
    }
}

fn parse_movie_id(movie_id: &str) -> ServiceResult<u64> {
    movie_id.trim().parse::<u64>().map_err(|_| ServiceError::movie_not_found())
}

/// Copy the display fields of an upstream payload into a local record
pub fn normalize_movie(details: &TmdbMovieDetails, created_at: DateTime<Utc>, now: DateTime<Utc>) -> Movie {
    Movie {
        tmdb_id: details.id,
        title: details.title.clone(),
        overview: details.overview.clone().filter(|o| !o.is_empty()),
        poster_path: details.poster_path.clone(),
        backdrop_path: details.backdrop_path.clone(),
        release_date: details
            .release_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        vote_average: details.vote_average,
        vote_count: details.vote_count,
        genres: details.genre_names(),
        runtime: details.runtime,
        director: details.director(),
        credits: details.credits.clone(),
        created_at,
        updated_at: now,
    }
}
