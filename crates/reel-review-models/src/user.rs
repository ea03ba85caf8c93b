use serde::{Deserialize, Serialize};

/// The acting user as carried by a verified bearer token.
///
/// Reviews and comments keep a copy of this as their author so that
/// responses can show who wrote them without a user lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

impl UserRef {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }

    /// Ownership checks compare ids only; usernames can change
    pub fn is_same_user(&self, other: &UserRef) -> bool {
        self.id == other.id
    }
}
