use color_eyre::eyre::{eyre, Result};
use reel_review_config::{Config, PathManager};
use std::path::PathBuf;
use crate::output::Output;

const PLACEHOLDER_SECRET: &str = "YOUR_JWT_SECRET";

pub fn show_config(config: &Config, config_path: &PathBuf, paths: &PathManager, full: bool, output: &Output) -> Result<()> {
    if !config_path.exists() {
        output.warn(format!(
            "Configuration file not found at: {} (showing defaults; run 'reel-review config init' to create it)",
            config_path.display()
        ));
    }

    output.settings("Configuration", &config_rows(config, config_path, paths, full));

    if let Err(e) = config.validate() {
        output.warn(format!("Configuration is not valid yet: {}", e));
    }
    Ok(())
}

fn config_rows(config: &Config, config_path: &PathBuf, paths: &PathManager, full: bool) -> Vec<(&'static str, String)> {
    let secret = |value: &str| if full { value.to_string() } else { mask_secret(value) };
    let api_key = config.tmdb.api_key.as_deref().unwrap_or_default();

    vec![
        ("Config file", config_path.display().to_string()),
        ("Config directory", paths.config_dir().display().to_string()),
        ("Data directory", paths.data_dir().display().to_string()),
        ("Log directory", paths.log_dir().display().to_string()),
        ("Listen address", config.bind_address()),
        ("CORS origins", config.server.cors_origins.join(", ")),
        ("TMDB API key", secret(api_key)),
        ("TMDB base URL", config.tmdb.base_url.clone()),
        ("TMDB image base URL", config.tmdb.image_base_url.clone()),
        ("Request timeout", format!("{}s", config.tmdb.request_timeout_secs)),
        ("Cache TTL", format!("{}s", config.cache.ttl_secs)),
        ("Cache capacity", config.cache.capacity.to_string()),
        ("JWT secret", secret(&config.auth.jwt_secret)),
        ("Persist storage", config.storage.persist.to_string()),
        ("Movie refresh", format!("{}h", config.movies.refresh_after_hours)),
        ("Log level", config.logging.level.clone()),
        (
            "JSON logs",
            config
                .logging
                .json
                .map(|json| json.to_string())
                .unwrap_or_else(|| "auto".to_string()),
        ),
    ]
}

/// Write a default config file; an existing file is kept unless `force` is set
pub fn init_config(config_path: &PathBuf, force: bool, output: &Output) -> Result<()> {
    if config_path.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_path.display()
        ));
        return Ok(());
    }

    Config::default()
        .save_to_file(config_path)
        .map_err(|e| eyre!("Failed to write config to {}: {}", config_path.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_path.display()));
    output.info("Set TMDB_API_KEY and JWT_SECRET (or edit the file) before running 'reel-review serve'.");
    Ok(())
}

fn mask_secret(s: &str) -> String {
    if s.is_empty() || s == PLACEHOLDER_SECRET {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
