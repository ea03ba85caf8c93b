use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Star rating attached to a review, stored as the star string itself
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StarRating {
    #[serde(rename = "⭐️")]
    One,
    #[serde(rename = "⭐️⭐️")]
    Two,
    #[serde(rename = "⭐️⭐️⭐️")]
    Three,
    #[serde(rename = "⭐️⭐️⭐️⭐️")]
    Four,
    #[serde(rename = "⭐️⭐️⭐️⭐️⭐️")]
    Five,
}

impl StarRating {
    pub const ALL: [StarRating; 5] = [
        StarRating::One,
        StarRating::Two,
        StarRating::Three,
        StarRating::Four,
        StarRating::Five,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StarRating::One => "⭐️",
            StarRating::Two => "⭐️⭐️",
            StarRating::Three => "⭐️⭐️⭐️",
            StarRating::Four => "⭐️⭐️⭐️⭐️",
            StarRating::Five => "⭐️⭐️⭐️⭐️⭐️",
        }
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StarRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StarRating::ALL
            .iter()
            .find(|rating| rating.as_str() == s)
            .copied()
            .ok_or_else(|| format!("`{}` is not a valid rating", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_rating_from_string() {
        assert_eq!("⭐️⭐️⭐️".parse::<StarRating>().unwrap(), StarRating::Three);
        assert!("3".parse::<StarRating>().is_err());
        assert!("⭐️⭐️⭐️⭐️⭐️⭐️".parse::<StarRating>().is_err());
    }

    #[test]
    fn test_star_rating_serde_uses_star_strings() {
        let json = serde_json::to_string(&StarRating::Two).unwrap();
        assert_eq!(json, "\"⭐️⭐️\"");
        let parsed: StarRating = serde_json::from_str("\"⭐️⭐️⭐️⭐️\"").unwrap();
        assert_eq!(parsed, StarRating::Four);
        assert_eq!(parsed.to_string(), "⭐️⭐️⭐️⭐️");
    }
}
