use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::TmdbError;

pub const SEARCH_PATH: &str = "/search/movie";
pub const POPULAR_PATH: &str = "/movie/popular";
pub const DETAILS_APPEND: &str = "credits,videos,similar";
pub const DETAILS_LANGUAGE: &str = "en-US";
pub const DEFAULT_IMAGE_SIZE: &str = "w500";

pub fn details_path(movie_id: u64) -> String {
    format!("/movie/{}", movie_id)
}

pub fn recommendations_path(movie_id: u64) -> String {
    format!("/movie/{}/recommendations", movie_id)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbGenre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<Value>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

/// Movie details as returned by `/movie/{id}` with credits appended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// "YYYY-MM-DD", or empty for unreleased titles
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub credits: Option<Value>,
}

impl TmdbMovieDetails {
    pub fn from_value(value: &Value) -> Result<Self, TmdbError> {
        serde_json::from_value(value.clone()).map_err(|e| TmdbError::Decode {
            operation: "fetching movie details",
            message: e.to_string(),
        })
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name.clone()).collect()
    }

    /// Typed view of the appended credits; malformed credits read as empty
    pub fn parsed_credits(&self) -> TmdbCredits {
        self.credits
            .as_ref()
            .and_then(|c| serde_json::from_value(c.clone()).ok())
            .unwrap_or_default()
    }

    /// First crew member credited with the "Director" job
    pub fn director(&self) -> Option<String> {
        self.parsed_credits()
            .crew
            .into_iter()
            .find(|member| member.job.as_deref() == Some("Director"))
            .map(|member| member.name)
    }
}

/// Pull the human-readable message out of a TMDB error body.
///
/// TMDB answers failures with `{"status_code": 7, "status_message": "..."}`;
/// anything else is returned trimmed as-is.
pub fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("status_message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
