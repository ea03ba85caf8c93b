pub mod genre;
pub mod movie;
pub mod rating;
pub mod review;
pub mod user;

pub use genre::Genre;
pub use movie::Movie;
pub use rating::StarRating;
pub use review::{Comment, Review};
pub use user::UserRef;
