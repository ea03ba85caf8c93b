pub mod config;
pub mod paths;

pub use config::{AuthConfig, CacheConfig, Config, LoggingConfig, MovieMirrorConfig, ServerConfig, StorageConfig, TmdbConfig, DEFAULT_TMDB_BASE_URL, DEFAULT_TMDB_IMAGE_BASE_URL};
pub use paths::{PathManager, container_base_path};
