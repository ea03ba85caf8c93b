use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Local mirror of upstream movie details.
///
/// Display fields are copied from the upstream payload at fetch time; the
/// upstream remains the source of truth and `updated_at` records when the
/// copy was last refreshed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub tmdb_id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub director: Option<String>,
    /// Raw upstream credits (cast and crew), kept as returned
    #[serde(default)]
    pub credits: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    pub fn is_stale(&self, now: DateTime<Utc>, refresh_after: chrono::Duration) -> bool {
        now - self.updated_at >= refresh_after
    }
}
