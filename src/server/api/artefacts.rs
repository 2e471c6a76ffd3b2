use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;

use super::access::{owned_artefact, owned_category, require_self, visible_artefact};
use super::images::{remove_image, replace_image, write_new_image};
use crate::assets::{AssetKind, AssetStore};
use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{ArtefactView, ViewMapper};
use crate::server::form::EntityForm;
use crate::server::ids::insert_with_fresh_id;
use crate::server::response::{ApiError, StoreResultExt};
use crate::server::validation::{parse_artefact_index, parse_entity_id, parse_entity_name};
use crate::store::ArtefactStore;
use crate::types::{Artefact, Patch};

pub async fn list_artefacts(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let artefacts = state
        .store
        .list_artefacts(auth.id())
        .api_err("Failed to list artefacts")?;

    let mapper = ViewMapper::new(state.public_base_url.as_deref(), &headers);
    let views: Vec<ArtefactView> = artefacts.into_iter().map(|a| mapper.artefact(a)).collect();

    Ok::<_, ApiError>(Json(views))
}

pub async fn get_artefact(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let artefact = visible_artefact(state.store.as_ref(), auth.id(), &id)?;

    let mapper = ViewMapper::new(state.public_base_url.as_deref(), &headers);
    Ok::<_, ApiError>(Json(mapper.artefact(artefact)))
}

pub async fn create_artefact(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut form = EntityForm::read(&mut multipart, state.max_upload_bytes).await?;

    let user_id = form.take_required("UserId")?;
    require_self(auth.id(), &user_id)?;

    let category_id = Patch::from_form(form.take("CategoryId"), parse_entity_id)?.into_value();
    let index = Patch::from_form(form.take("ArtefactIndex"), parse_artefact_index)?
        .into_value()
        .unwrap_or(0);
    let name = Patch::from_form(form.take("Name"), parse_entity_name)?.into_value();
    let image = form
        .take_image()
        .ok_or_else(|| ApiError::bad_request("Image is required"))?;

    let store = state.store.as_ref();
    if let Some(category_id) = &category_id {
        owned_category(store, auth.id(), category_id)?;
    }

    let modified_at = Some(Utc::now());
    let artefact = insert_with_fresh_id(
        |id| Artefact {
            image_path: Some(AssetStore::public_path(AssetKind::Artefacts, &id, &image)),
            id,
            index,
            user_id: user_id.clone(),
            category_id: category_id.clone(),
            name: name.clone(),
            modified_at,
        },
        |artefact| store.create_artefact(artefact),
    )?;

    write_new_image(
        &state.assets,
        AssetKind::Artefacts,
        &artefact.id,
        Some(&image),
        || store.delete_artefact(&artefact.id),
    )
    .await?;

    tracing::info!(artefact_id = %artefact.id, user_id = %artefact.user_id, "Artefact created");

    let mapper = ViewMapper::new(state.public_base_url.as_deref(), &headers);
    Ok::<_, ApiError>(Json(mapper.artefact(artefact)))
}

pub async fn patch_artefact(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut form = EntityForm::read(&mut multipart, state.max_upload_bytes).await?;

    let id = parse_entity_id(&form.take_required("ArtefactId")?)?;
    let index = Patch::from_form(form.take("ArtefactIndex"), parse_artefact_index)?;
    let category_id = Patch::from_form(form.take("CategoryId"), parse_entity_id)?;
    let name = Patch::from_form(form.take("Name"), parse_entity_name)?;
    let image = form.take_image();

    let store = state.store.as_ref();
    let mut artefact = owned_artefact(store, auth.id(), &id)?;

    if let Patch::Set(category_id) = &category_id {
        owned_category(store, auth.id(), category_id)?;
    }

    index.apply_required(&mut artefact.index, "ArtefactIndex")?;
    category_id.apply_to(&mut artefact.category_id);
    name.apply_to(&mut artefact.name);
    if let Some(image) = &image {
        let path = replace_image(&state.assets, AssetKind::Artefacts, &artefact.id, image).await?;
        artefact.image_path = Some(path);
    }
    artefact.modified_at = Some(Utc::now());

    store.update_artefact(&artefact)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn delete_artefact(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let artefact = owned_artefact(store, auth.id(), &id)?;

    remove_image(
        &state.assets,
        AssetKind::Artefacts,
        &artefact.id,
        artefact.image_path.is_some(),
    )
    .await?;

    if !store
        .delete_artefact(&artefact.id)
        .api_err("Failed to delete artefact")?
    {
        return Err(ApiError::not_found("Artefact not found"));
    }

    tracing::info!(artefact_id = %artefact.id, "Artefact deleted");

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
