use chrono::Duration;
use color_eyre::eyre::{eyre, Result};
use reel_review_config::Config;
use reel_review_models::UserRef;
use serde_json::json;
use crate::http::TokenProvider;
use crate::output::{Output, OutputFormat};

/// Mint a bearer token signed with the configured secret, for local testing
/// against a running server
pub fn run_token(
    config: &Config,
    user_id: String,
    username: String,
    expires_in_hours: Option<i64>,
    output: &Output,
) -> Result<()> {
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;

    let user = UserRef::new(user_id, username);
    let ttl = expires_in_hours.map(Duration::hours);
    let token = TokenProvider::new(&config.auth.jwt_secret)
        .issue(&user, ttl)
        .map_err(|e| eyre!("{}", e))?;

    match output.format() {
        OutputFormat::Human => println!("{}", token),
        _ => output.json(&json!({
            "token": token,
            "user": user,
            "expiresInHours": expires_in_hours,
        })),
    }
    Ok(())
}
