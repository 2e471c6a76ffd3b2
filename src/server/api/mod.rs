//! Resource handlers. Everything except sign-up and login requires a bearer
//! token; ownership is checked in [`access`] before any mutation.

mod access;
mod artefacts;
mod assets;
mod categories;
mod images;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::server::AppState;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Users
        .route("/Users", get(users::get_self))
        .route("/Users/SignUp", post(users::sign_up))
        .route("/Users/Login", post(users::login))
        .route("/Users/{id}", delete(users::delete_user))
        // Categories
        .route(
            "/Users/Categories",
            get(categories::list_categories)
                .post(categories::create_category)
                .patch(categories::patch_category),
        )
        .route(
            "/Users/Categories/{id}",
            get(categories::get_category).delete(categories::delete_category),
        )
        // Artefacts
        .route(
            "/Users/Artefacts",
            get(artefacts::list_artefacts)
                .post(artefacts::create_artefact)
                .patch(artefacts::patch_artefact),
        )
        .route(
            "/Users/Artefacts/{id}",
            get(artefacts::get_artefact).delete(artefacts::delete_artefact),
        )
        // Images
        .route("/Assets/{kind}/{file_name}", get(assets::get_asset))
}
