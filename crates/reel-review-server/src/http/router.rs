use axum::{http::HeaderValue, middleware, Router};
use reel_review_config::ServerConfig;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use crate::http::auth::auth_middleware;
use crate::http::state::AppState;
use crate::http::{health, movies, reviews};

/// Build the application router
pub fn create_router(state: AppState, server_config: &ServerConfig) -> Router {
    let cors = create_cors_layer(server_config);

    let router = Router::new()
        .merge(health::router())
        .nest("/movies", movies::router())
        .nest("/reviews", reviews::router())
        .layer(middleware::from_fn_with_state(state.tokens.clone(), auth_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Router created with /movies, /reviews and /health");
    router
}

fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if server_config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::auth::TokenProvider;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::Duration;
    use http_body_util::BodyExt;
    use reel_review_config::Config;
    use reel_review_core::{JsonFileStore, MovieService, ReviewService};
    use reel_review_models::{Movie, Review, UserRef};
    use reel_review_sources::{ResponseCache, TmdbClient, Transport, TransportError};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    #[derive(Default)]
    struct StubTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if path == "/movie/popular" || path == "/search/movie" || path.ends_with("/recommendations") {
                let page = query
                    .iter()
                    .find(|(k, _)| k == "page")
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default();
                return Ok(json!({ "path": path, "page": page, "results": [] }));
            }
            let id: u64 = path.trim_start_matches("/movie/").parse().map_err(|_| TransportError::Status {
                status: 404,
                message: "The resource you requested could not be found.".to_string(),
            })?;
            Ok(json!({
                "id": id,
                "title": "Fight Club",
                "genres": [{"id": 18, "name": "Drama"}],
                "release_date": "1999-10-15",
                "poster_path": "/fight.jpg",
                "credits": {"cast": [], "crew": [{"name": "David Fincher", "job": "Director"}]}
            }))
        }
    }

    struct Harness {
        router: Router,
        transport: Arc<StubTransport>,
        tokens: Arc<TokenProvider>,
    }

    impl Harness {
        fn new(api_key: Option<&str>) -> Self {
            Self::with_server(api_key, &Config::default().server)
        }

        fn with_server(api_key: Option<&str>, server_config: &ServerConfig) -> Self {
            let transport = Arc::new(StubTransport::default());
            let cache = Arc::new(ResponseCache::new(Duration::hours(1), 100));
            let client = TmdbClient::new(api_key.map(str::to_string), transport.clone(), cache);
            let tokens = Arc::new(TokenProvider::new(SECRET));
            let state = AppState::new(
                ReviewService::new(Arc::new(JsonFileStore::<Review>::in_memory("reviews"))),
                MovieService::new(client, Arc::new(JsonFileStore::<Movie>::in_memory("movies")), Duration::hours(24)),
                tokens.clone(),
            );
            Self {
                router: create_router(state, server_config),
                transport,
                tokens,
            }
        }

        fn token(&self, id: &str, username: &str) -> String {
            self.tokens.issue(&UserRef::new(id, username), Some(Duration::hours(1))).unwrap()
        }

        async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }
    }

    fn valid_review() -> Value {
        json!({
            "title": "A classic",
            "movie": "Blade Runner",
            "director": "Ridley Scott",
            "genre": "Science Fiction",
            "rating": "⭐️⭐️⭐️⭐️⭐️",
            "review": "Still holds up."
        })
    }

    #[tokio::test]
    async fn test_health() {
        let h = Harness::new(Some("key"));
        let (status, body) = h.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cachedResponses"], 0);
    }

    #[tokio::test]
    async fn test_create_requires_token() {
        let h = Harness::new(Some("key"));
        let (status, body) = h.send(Method::POST, "/reviews", None, Some(valid_review())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "err": "Invalid token." }));

        let forged = TokenProvider::new("wrong-secret")
            .issue(&UserRef::new("u1", "alice"), None)
            .unwrap();
        let (status, _) = h.send(Method::POST, "/reviews", Some(&forged), Some(valid_review())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, list) = h.send(Method::GET, "/reviews", None, None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_create_and_read_review() {
        let h = Harness::new(Some("key"));
        let token = h.token("u1", "alice");

        let (status, created) = h.send(Method::POST, "/reviews", Some(&token), Some(valid_review())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["author"]["_id"], "u1");
        assert_eq!(created["genre"], "Science Fiction");

        let id = created["_id"].as_str().unwrap().to_string();
        let (status, fetched) = h.send(Method::GET, &format!("/reviews/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["movie"], "Blade Runner");

        let (_, list) = h.send(Method::GET, "/reviews", None, None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_review_is_not_created() {
        let h = Harness::new(Some("key"));
        let token = h.token("u1", "alice");

        let mut body = valid_review();
        body.as_object_mut().unwrap().remove("genre");
        let (status, err) = h.send(Method::POST, "/reviews", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err["err"].as_str().unwrap().contains("Path `genre` is required."));

        let (_, list) = h.send(Method::GET, "/reviews", None, None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_only_author_may_mutate_review() {
        let h = Harness::new(Some("key"));
        let alice = h.token("u1", "alice");
        let bob = h.token("u2", "bob");

        let (_, created) = h.send(Method::POST, "/reviews", Some(&alice), Some(valid_review())).await;
        let uri = format!("/reviews/{}", created["_id"].as_str().unwrap());

        let (status, body) = h.send(Method::PUT, &uri, Some(&bob), Some(json!({ "review": "Nope" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "message": "You're not allowed to do that!" }));

        let (status, _) = h.send(Method::DELETE, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, updated) = h.send(Method::PUT, &uri, Some(&alice), Some(json!({ "review": "Even better" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["review"], "Even better");
        assert_eq!(updated["author"]["_id"], "u1");

        let (status, body) = h.send(Method::DELETE, &uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Review deleted successfully" }));

        let (status, body) = h.send(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Review not found" }));
    }

    #[tokio::test]
    async fn test_missing_review_is_not_found() {
        let h = Harness::new(Some("key"));
        let token = h.token("u1", "alice");
        let missing = format!("/reviews/{}", uuid_like());

        let (status, _) = h.send(Method::DELETE, &missing, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = h.send(Method::GET, "/reviews/not-an-id", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_comment_lifecycle() {
        let h = Harness::new(Some("key"));
        let alice = h.token("u1", "alice");
        let bob = h.token("u2", "bob");

        let (_, review) = h.send(Method::POST, "/reviews", Some(&alice), Some(valid_review())).await;
        let comments_uri = format!("/reviews/{}/comments", review["_id"].as_str().unwrap());

        let (status, comment) = h.send(Method::POST, &comments_uri, Some(&bob), Some(json!({ "text": "Agreed" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(comment["author"]["username"], "bob");
        let comment_uri = format!("{}/{}", comments_uri, comment["_id"].as_str().unwrap());

        let (status, body) = h.send(Method::PUT, &comment_uri, Some(&alice), Some(json!({ "text": "Edited" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "message": "You are not authorized to edit this comment" }));

        let (status, body) = h.send(Method::PUT, &comment_uri, Some(&bob), Some(json!({ "text": "Edited" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Comment updated successfully" }));

        let (status, body) = h.send(Method::DELETE, &comment_uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Comment deleted successfully" }));

        let (status, body) = h.send(Method::DELETE, &comment_uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Comment not found" }));
    }

    #[tokio::test]
    async fn test_comment_on_missing_review() {
        let h = Harness::new(Some("key"));
        let token = h.token("u1", "alice");
        let uri = format!("/reviews/{}/comments", uuid_like());
        let (status, body) = h.send(Method::POST, &uri, Some(&token), Some(json!({ "text": "Hi" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Review not found" }));
    }

    #[tokio::test]
    async fn test_popular_is_served_from_cache() {
        let h = Harness::new(Some("key"));

        let (status, first) = h.send(Method::GET, "/movies/popular", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["page"], "1");

        let (_, second) = h.send(Method::GET, "/movies/popular?page=1", None, None).await;
        assert_eq!(first, second);
        assert_eq!(h.transport.calls.load(Ordering::SeqCst), 1);

        let (_, third) = h.send(Method::GET, "/movies/popular?page=2", None, None).await;
        assert_eq!(third["page"], "2");
        assert_eq!(h.transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_search_and_recommendations() {
        let h = Harness::new(Some("key"));

        let (status, body) = h.send(Method::GET, "/movies/search?query=alien", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], "/search/movie");

        let (status, body) = h.send(Method::GET, "/movies/550/recommendations?page=3", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], "/movie/550/recommendations");
        assert_eq!(body["page"], "3");
    }

    #[tokio::test]
    async fn test_movie_details_are_mirrored() {
        let h = Harness::new(Some("key"));

        let (status, movie) = h.send(Method::GET, "/movies/550", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(movie["tmdbId"], 550);
        assert_eq!(movie["director"], "David Fincher");
        assert_eq!(movie["posterUrl"], "https://image.tmdb.org/t/p/w500/fight.jpg");
        assert_eq!(movie["backdropUrl"], Value::Null);

        let (_, again) = h.send(Method::GET, "/movies/550", None, None).await;
        assert_eq!(again["createdAt"], movie["createdAt"]);
        assert_eq!(h.transport.calls.load(Ordering::SeqCst), 1);

        let (status, body) = h.send(Method::GET, "/movies/abc", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Movie not found" }));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_server_error() {
        let h = Harness::new(None);
        let (status, body) = h.send(Method::GET, "/movies/popular", None, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "err": "TMDB API key is not set" }));
        assert_eq!(h.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_page_is_treated_as_absent() {
        let h = Harness::new(Some("key"));

        let (status, first) = h.send(Method::GET, "/movies/popular?page=", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["page"], "1");

        let (_, second) = h.send(Method::GET, "/movies/popular", None, None).await;
        assert_eq!(first, second);
        assert_eq!(h.transport.calls.load(Ordering::SeqCst), 1);

        let (status, body) = h.send(Method::GET, "/movies/search?query=alien&page=", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], "1");
    }

    #[tokio::test]
    async fn test_unparseable_page_is_json_error() {
        let h = Harness::new(Some("key"));

        let (status, body) = h.send(Method::GET, "/movies/popular?page=abc", None, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["err"].as_str().unwrap().contains("invalid page `abc`"), "{}", body);
        assert_eq!(h.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let h = Harness::new(Some("key"));
        let token = h.token("u1", "alice");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/reviews")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = h.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["err"].is_string(), "{}", body);

        let (_, list) = h.send(Method::GET, "/reviews", None, None).await;
        assert_eq!(list, json!([]));
    }

    async fn preflight(h: &Harness, origin: &str) -> axum::response::Response {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/reviews")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        h.router.clone().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_cors_with_explicit_origins() {
        let mut config = Config::default().server;
        // Invalid entries are skipped rather than failing startup
        config.cors_origins = vec!["http://localhost:5173".to_string(), "bad\norigin".to_string()];
        let h = Harness::with_server(Some("key"), &config);

        let allowed = preflight(&h, "http://localhost:5173").await;
        assert_eq!(
            allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );

        let denied = preflight(&h, "http://evil.example").await;
        assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_cors_wildcard_allows_any_origin() {
        let h = Harness::new(Some("key"));
        let response = preflight(&h, "http://anywhere.example").await;
        assert_eq!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }

    fn uuid_like() -> &'static str {
        "6f1c2d3e-4a5b-4c6d-8e9f-0a1b2c3d4e5f"
    }
}
