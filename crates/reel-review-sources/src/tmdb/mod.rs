pub mod api;
pub mod client;
pub mod transport;

pub use api::{TmdbCredits, TmdbCrewMember, TmdbGenre, TmdbMovieDetails};
pub use client::TmdbClient;
pub use transport::ReqwestTransport;
