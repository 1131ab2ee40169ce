use serde::{Deserialize, Serialize};

/// User resource as served by the placeholder API. Fields the API nests
/// (address, company) are not used and are skipped on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
}

impl User {
    // "Name (email)" line used when copying a user's details
    pub fn contact_line(&self) -> String {
        format!("{} ({})", self.name, self.email)
    }
}
