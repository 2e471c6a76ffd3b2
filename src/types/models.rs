use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2id PHC string. Never leaves the process.
    #[serde(skip)]
    pub password_hash: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub index: Option<u8>,
    pub user_id: String,
    pub name: Option<String>,
    pub image_path: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artefact {
    pub id: String,
    pub index: u16,
    pub user_id: String,
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub image_path: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// A category together with the artefacts filed under it, fetched in one go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithArtefacts {
    #[serde(flatten)]
    pub category: Category,
    pub artefacts: Vec<Artefact>,
}
