pub mod cache;
pub mod error;
pub mod tmdb;
pub mod traits;

pub use cache::{CacheEntry, ResponseCache};
pub use error::{TmdbError, TransportError};
pub use tmdb::{TmdbClient, TmdbMovieDetails, ReqwestTransport};
pub use traits::Transport;
