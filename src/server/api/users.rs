use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;

use super::images::remove_image;
use crate::assets::AssetKind;
use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{AuthResponse, LoginRequest, SignUpRequest, ViewMapper};
use crate::server::form::JsonBody;
use crate::server::ids::insert_with_fresh_id;
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::server::validation::{
    validate_display_name, validate_guardian_key, validate_password, validate_username,
};
use crate::store::{ArtefactStore, CategoryStore, UserStore};
use crate::types::User;

/// The same answer for an unknown username and a wrong password.
fn invalid_credentials() -> ApiError {
    ApiError::not_found("Invalid username or password")
}

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<SignUpRequest>,
) -> impl IntoResponse {
    validate_username(&req.username)?;
    validate_password(&req.password)?;
    validate_display_name(&req.name)?;
    let guardian_key = req
        .guardian_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty());
    if let Some(key) = &guardian_key {
        validate_guardian_key(key)?;
    }

    let store = state.store.as_ref();
    if store
        .get_user_by_username(&req.username)
        .api_err("Failed to check username")?
        .is_some()
    {
        return Err(ApiError::conflict("Username already taken"));
    }

    let password_hash = state
        .passwords
        .hash(&req.password)
        .api_err("Failed to hash password")?;
    let name = req.name.trim().to_string();
    let created_at = Utc::now();

    let user = insert_with_fresh_id(
        |id| User {
            id,
            username: req.username.clone(),
            password_hash: password_hash.clone(),
            name: name.clone(),
            guardian_key: guardian_key.clone(),
            created_at,
        },
        |user| store.create_user(user),
    )?;

    tracing::info!(user_id = %user.id, "User signed up");

    let token = state
        .tokens
        .issue(&user.id, &user.name)
        .api_err("Failed to issue token")?;

    Ok::<_, ApiError>(Json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user_by_username(&req.username)
        .api_err("Failed to get user")?;

    let Some(user) = user else {
        state.passwords.verify_dummy(&req.password);
        return Err(invalid_credentials());
    };

    let valid = state
        .passwords
        .verify(&req.password, &user.password_hash)
        .api_err("Failed to verify password")?;
    if !valid {
        return Err(invalid_credentials());
    }

    let token = state
        .tokens
        .issue(&user.id, &user.name)
        .api_err("Failed to issue token")?;

    Ok::<_, ApiError>(Json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

pub async fn get_self(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let categories = state
        .store
        .list_categories(auth.id())
        .api_err("Failed to list categories")?;

    let mapper = ViewMapper::new(state.public_base_url.as_deref(), &headers);
    Ok::<_, ApiError>(Json(mapper.user(auth.user, categories)))
}

pub async fn delete_user(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let user = store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    if user.id != auth.id() {
        return Err(ApiError::forbidden("Users can only delete themselves"));
    }

    let artefacts = store
        .list_artefacts(&user.id)
        .api_err("Failed to list artefacts")?;
    for artefact in &artefacts {
        remove_image(
            &state.assets,
            AssetKind::Artefacts,
            &artefact.id,
            artefact.image_path.is_some(),
        )
        .await?;
    }

    let categories = store
        .list_categories(&user.id)
        .api_err("Failed to list categories")?;
    for entry in &categories {
        remove_image(
            &state.assets,
            AssetKind::Categories,
            &entry.category.id,
            entry.category.image_path.is_some(),
        )
        .await?;
    }

    if !store.delete_user(&user.id).api_err("Failed to delete user")? {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(
        user_id = %user.id,
        categories = categories.len(),
        artefacts = artefacts.len(),
        "User deleted"
    );

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
