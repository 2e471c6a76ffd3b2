use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Artefact, CategoryWithArtefacts, User};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub guardian_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_key: Option<String>,
    pub categories: Vec<CategoryView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub category_id: String,
    pub category_index: Option<u8>,
    pub user_id: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub modified_date: Option<DateTime<Utc>>,
    pub artefacts: Vec<ArtefactView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtefactView {
    pub artefact_id: String,
    pub artefact_index: u16,
    pub user_id: String,
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub modified_date: Option<DateTime<Utc>>,
}

/// Turns stored rows into wire views, resolving image paths against the
/// public origin of the server.
pub struct ViewMapper {
    base_url: String,
}

impl ViewMapper {
    /// Uses the configured public base URL when present, otherwise the
    /// origin the client reached us on.
    #[must_use]
    pub fn new(public_base_url: Option<&str>, headers: &HeaderMap) -> Self {
        let base_url = match public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => get_host_from_headers(headers),
        };
        Self { base_url }
    }

    fn image_url(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| format!("{}{p}", self.base_url))
    }

    #[must_use]
    pub fn artefact(&self, artefact: Artefact) -> ArtefactView {
        ArtefactView {
            image_url: self.image_url(artefact.image_path.as_deref()),
            artefact_id: artefact.id,
            artefact_index: artefact.index,
            user_id: artefact.user_id,
            category_id: artefact.category_id,
            name: artefact.name,
            modified_date: artefact.modified_at,
        }
    }

    #[must_use]
    pub fn category(&self, entry: CategoryWithArtefacts) -> CategoryView {
        let CategoryWithArtefacts {
            category,
            artefacts,
        } = entry;
        CategoryView {
            image_url: self.image_url(category.image_path.as_deref()),
            category_id: category.id,
            category_index: category.index,
            user_id: category.user_id,
            name: category.name,
            modified_date: category.modified_at,
            artefacts: artefacts.into_iter().map(|a| self.artefact(a)).collect(),
        }
    }

    #[must_use]
    pub fn user(&self, user: User, categories: Vec<CategoryWithArtefacts>) -> UserView {
        UserView {
            id: user.id,
            username: user.username,
            name: user.name,
            guardian_key: user.guardian_key,
            categories: categories.into_iter().map(|c| self.category(c)).collect(),
        }
    }
}

fn get_host_from_headers(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    format!("{scheme}://{host}")
}
