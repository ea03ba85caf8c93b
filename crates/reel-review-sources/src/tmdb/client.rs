use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use reel_review_config::TmdbConfig;
use crate::cache::ResponseCache;
use crate::error::TmdbError;
use crate::tmdb::api;
use crate::tmdb::transport::ReqwestTransport;
use crate::traits::Transport;

/// Upstream movie metadata client with a read-through response cache.
///
/// Every operation consults the cache first. A hit is returned unchanged
/// without touching the transport; a miss issues exactly one request, stores
/// the full body under the same key and returns it.
#[derive(Clone)]
pub struct TmdbClient {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    api_key: Option<String>,
    image_base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: Option<String>, transport: Arc<dyn Transport>, cache: Arc<ResponseCache>) -> Self {
        Self {
            transport,
            cache,
            api_key: api_key.filter(|k| !k.is_empty()),
            image_base_url: reel_review_config::DEFAULT_TMDB_IMAGE_BASE_URL.to_string(),
        }
    }

    pub fn from_config(config: &TmdbConfig, cache: Arc<ResponseCache>) -> Self {
        let transport = ReqwestTransport::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        );

        match config.api_key.as_deref() {
            Some(key) if !key.is_empty() => {
                let prefix: String = key.chars().take(4).collect();
                info!("TMDB API key is set: {}...", prefix);
            }
            _ => error!("TMDB API key is not set!"),
        }

        Self::new(config.api_key.clone(), Arc::new(transport), cache)
            .with_image_base_url(config.image_base_url.clone())
    }

    pub fn with_image_base_url(mut self, image_base_url: String) -> Self {
        self.image_base_url = image_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn search_movies(&self, query: &str, page: u32) -> Result<Value, TmdbError> {
        self.fetch_cached(
            "searching movies",
            "search",
            json!({ "query": query, "page": page }),
            api::SEARCH_PATH,
            vec![
                ("query".to_string(), query.to_string()),
                ("page".to_string(), page.to_string()),
            ],
        )
        .await
    }

    /// Details with credits, videos and similar titles appended
    pub async fn movie_details(&self, movie_id: u64) -> Result<Value, TmdbError> {
        debug!("Fetching movie details from TMDB for ID: {}", movie_id);
        self.fetch_cached(
            "fetching movie details",
            "movie",
            json!({ "movieId": movie_id }),
            &api::details_path(movie_id),
            vec![
                ("append_to_response".to_string(), api::DETAILS_APPEND.to_string()),
                ("language".to_string(), api::DETAILS_LANGUAGE.to_string()),
            ],
        )
        .await
    }

    pub async fn popular_movies(&self, page: u32) -> Result<Value, TmdbError> {
        self.fetch_cached(
            "fetching popular movies",
            "popular",
            json!({ "page": page }),
            api::POPULAR_PATH,
            vec![("page".to_string(), page.to_string())],
        )
        .await
    }

    pub async fn recommendations(&self, movie_id: u64, page: u32) -> Result<Value, TmdbError> {
        self.fetch_cached(
            "fetching movie recommendations",
            "recommendations",
            json!({ "movieId": movie_id, "page": page }),
            &api::recommendations_path(movie_id),
            vec![("page".to_string(), page.to_string())],
        )
        .await
    }

    /// Absolute image URL for a relative upstream path, or `None` for no image
    pub fn image_url(&self, path: Option<&str>, size: &str) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        Some(format!("{}/{}{}", self.image_base_url, size, path))
    }

    async fn fetch_cached(
        &self,
        operation: &'static str,
        endpoint: &str,
        params: Value,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<Value, TmdbError> {
        if let Some(cached) = self.cache.lookup(endpoint, &params) {
            return Ok(cached);
        }

        let api_key = self.api_key.as_ref().ok_or(TmdbError::MissingApiKey)?;

        let mut full_query = Vec::with_capacity(query.len() + 1);
        full_query.push(("api_key".to_string(), api_key.clone()));
        full_query.extend(query);

        let body = self
            .transport
            .get_json(path, &full_query)
            .await
            .map_err(|e| {
                error!(operation = operation, error = %e, "TMDB API Error");
                TmdbError::Request {
                    operation,
                    message: e.to_string(),
                }
            })?;

        self.cache.store(endpoint, &params, body.clone());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that answers every request with a fixed result and counts calls
    struct StubTransport {
        calls: AtomicUsize,
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
        fail_with: Option<u16>,
    }

    impl StubTransport {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                fail_with: None,
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                fail_with: Some(status),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> (String, Vec<(String, String)>) {
            self.requests.lock().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, TransportError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.requests.lock().push((path.to_string(), query.to_vec()));
            if let Some(status) = self.fail_with {
                return Err(TransportError::Status {
                    status,
                    message: "Invalid API key: You must be granted a valid key.".to_string(),
                });
            }
            Ok(json!({ "path": path, "call": n, "results": [{"id": 1}] }))
        }
    }

    fn client(transport: Arc<StubTransport>) -> TmdbClient {
        let cache = Arc::new(ResponseCache::new(ChronoDuration::hours(1), 100));
        TmdbClient::new(Some("test-key".to_string()), transport, cache)
    }

    fn query_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn test_cache_hit_skips_transport() {
        let transport = StubTransport::ok();
        let client = client(transport.clone());

        let first = client.popular_movies(1).await.unwrap();
        let second = client.popular_movies(1).await.unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(second["call"], 1);
    }

    #[tokio::test]
    async fn test_different_params_miss() {
        let transport = StubTransport::ok();
        let client = client(transport.clone());

        client.popular_movies(1).await.unwrap();
        client.popular_movies(2).await.unwrap();
        client.search_movies("heat", 1).await.unwrap();
        client.search_movies("heat", 1).await.unwrap();
        client.search_movies("heat", 2).await.unwrap();

        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test]
    async fn test_request_merges_api_key_and_params() {
        let transport = StubTransport::ok();
        let client = client(transport.clone());

        client.search_movies("blade runner", 3).await.unwrap();
        let (path, query) = transport.last_request();
        assert_eq!(path, "/search/movie");
        assert_eq!(query_value(&query, "api_key"), Some("test-key"));
        assert_eq!(query_value(&query, "query"), Some("blade runner"));
        assert_eq!(query_value(&query, "page"), Some("3"));

        client.recommendations(78, 2).await.unwrap();
        let (path, query) = transport.last_request();
        assert_eq!(path, "/movie/78/recommendations");
        assert_eq!(query_value(&query, "page"), Some("2"));
    }

    #[tokio::test]
    async fn test_details_request_expands_credits() {
        let transport = StubTransport::ok();
        let client = client(transport.clone());

        client.movie_details(550).await.unwrap();
        client.movie_details(550).await.unwrap();

        assert_eq!(transport.calls(), 1);
        let (path, query) = transport.last_request();
        assert_eq!(path, "/movie/550");
        assert_eq!(query_value(&query, "append_to_response"), Some("credits,videos,similar"));
        assert_eq!(query_value(&query, "language"), Some("en-US"));
    }

    #[tokio::test]
    async fn test_miss_stores_full_body() {
        let transport = StubTransport::ok();
        let client = client(transport.clone());

        let body = client.recommendations(11, 1).await.unwrap();
        let cached = client
            .cache()
            .lookup("recommendations", &json!({"page": 1, "movieId": 11}))
            .unwrap();
        assert_eq!(cached, body);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_single_error() {
        let transport = StubTransport::failing(401);
        let client = client(transport.clone());

        let err = client.search_movies("heat", 1).await.unwrap_err();
        match &err {
            TmdbError::Request { operation, message } => {
                assert_eq!(*operation, "searching movies");
                assert!(message.contains("Invalid API key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().starts_with("Error searching movies:"));

        // Failures are not cached and not retried
        assert_eq!(transport.calls(), 1);
        assert!(client.cache().is_empty());
        client.search_movies("heat", 1).await.unwrap_err();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_transport() {
        let transport = StubTransport::ok();
        let cache = Arc::new(ResponseCache::new(ChronoDuration::hours(1), 100));
        let client = TmdbClient::new(Some(String::new()), transport.clone(), cache);

        assert!(!client.has_api_key());
        let err = client.movie_details(1).await.unwrap_err();
        assert!(matches!(err, TmdbError::MissingApiKey));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_cached_value_served_without_api_key() {
        let transport = StubTransport::ok();
        let cache = Arc::new(ResponseCache::new(ChronoDuration::hours(1), 100));
        cache.store("popular", &json!({"page": 1}), json!({"results": []}));
        let client = TmdbClient::new(None, transport.clone(), cache);

        assert_eq!(client.popular_movies(1).await.unwrap(), json!({"results": []}));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_image_url() {
        let client = client(StubTransport::ok());
        assert_eq!(
            client.image_url(Some("/kqjL17yufvn9OVLyXYpvtyrFfak.jpg"), "w500").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/kqjL17yufvn9OVLyXYpvtyrFfak.jpg")
        );
        assert_eq!(client.image_url(Some(""), "w500"), None);
        assert_eq!(client.image_url(None, "original"), None);

        let client = client.with_image_base_url("http://images.local/t/p/".to_string());
        assert_eq!(
            client.image_url(Some("/a.jpg"), "original").as_deref(),
            Some("http://images.local/t/p/original/a.jpg")
        );
    }
}
