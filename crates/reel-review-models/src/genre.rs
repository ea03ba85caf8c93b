use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Genres a review can be filed under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Genre {
    Action,
    Animation,
    Comedy,
    Drama,
    Fantasy,
    Mystery,
    #[serde(rename = "Science Fiction")]
    ScienceFiction,
}

impl Genre {
    pub const ALL: [Genre; 7] = [
        Genre::Action,
        Genre::Animation,
        Genre::Comedy,
        Genre::Drama,
        Genre::Fantasy,
        Genre::Mystery,
        Genre::ScienceFiction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::Mystery => "Mystery",
            Genre::ScienceFiction => "Science Fiction",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .iter()
            .find(|genre| genre.as_str() == s)
            .copied()
            .ok_or_else(|| format!("`{}` is not a valid genre", s))
    }
}
