use async_trait::async_trait;
use serde_json::Value;
use crate::error::TransportError;

/// Issues a single GET against the upstream API and returns the JSON body.
///
/// `path` is relative to the transport's base URL (e.g. `/movie/popular`).
/// Implementations must not cache; caching lives in the client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, TransportError>;
}
