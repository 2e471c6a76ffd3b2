use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;

use super::access::{owned_category, require_self, visible_category};
use super::images::{remove_image, replace_image, write_new_image};
use crate::assets::{AssetKind, AssetStore};
use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{CategoryView, ViewMapper};
use crate::server::form::EntityForm;
use crate::server::ids::insert_with_fresh_id;
use crate::server::response::{ApiError, StoreResultExt};
use crate::server::validation::{parse_category_index, parse_entity_id, parse_entity_name};
use crate::store::{ArtefactStore, CategoryStore};
use crate::types::{Category, CategoryWithArtefacts, Patch};

pub async fn list_categories(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let categories = state
        .store
        .list_categories(auth.id())
        .api_err("Failed to list categories")?;

    let mapper = ViewMapper::new(state.public_base_url.as_deref(), &headers);
    let views: Vec<CategoryView> = categories.into_iter().map(|c| mapper.category(c)).collect();

    Ok::<_, ApiError>(Json(views))
}

pub async fn get_category(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let entry = visible_category(state.store.as_ref(), auth.id(), &id)?;

    let mapper = ViewMapper::new(state.public_base_url.as_deref(), &headers);
    Ok::<_, ApiError>(Json(mapper.category(entry)))
}

pub async fn create_category(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut form = EntityForm::read(&mut multipart, state.max_upload_bytes).await?;

    let user_id = form.take_required("UserId")?;
    require_self(auth.id(), &user_id)?;

    let index = Patch::from_form(form.take("CategoryIndex"), parse_category_index)?.into_value();
    let name = Patch::from_form(form.take("Name"), parse_entity_name)?.into_value();
    let image = form.take_image();
    let modified_at = Some(Utc::now());

    let store = state.store.as_ref();
    let category = insert_with_fresh_id(
        |id| Category {
            image_path: image
                .as_ref()
                .map(|image| AssetStore::public_path(AssetKind::Categories, &id, image)),
            id,
            index,
            user_id: user_id.clone(),
            name: name.clone(),
            modified_at,
        },
        |category| store.create_category(category),
    )?;

    write_new_image(
        &state.assets,
        AssetKind::Categories,
        &category.id,
        image.as_ref(),
        || store.delete_category(&category.id),
    )
    .await?;

    tracing::info!(category_id = %category.id, user_id = %category.user_id, "Category created");

    let mapper = ViewMapper::new(state.public_base_url.as_deref(), &headers);
    Ok::<_, ApiError>(Json(mapper.category(CategoryWithArtefacts {
        category,
        artefacts: Vec::new(),
    })))
}

pub async fn patch_category(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut form = EntityForm::read(&mut multipart, state.max_upload_bytes).await?;

    let id = parse_entity_id(&form.take_required("CategoryId")?)?;
    let index = Patch::from_form(form.take("CategoryIndex"), parse_category_index)?;
    let name = Patch::from_form(form.take("Name"), parse_entity_name)?;
    let image = form.take_image();

    let store = state.store.as_ref();
    let mut category = owned_category(store, auth.id(), &id)?;

    index.apply_to(&mut category.index);
    name.apply_to(&mut category.name);
    if let Some(image) = &image {
        let path = replace_image(&state.assets, AssetKind::Categories, &category.id, image).await?;
        category.image_path = Some(path);
    }
    category.modified_at = Some(Utc::now());

    store.update_category(&category)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn delete_category(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let category = owned_category(store, auth.id(), &id)?;

    let artefacts = store
        .list_category_artefacts(&category.id)
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
    remove_image(
        &state.assets,
        AssetKind::Categories,
        &category.id,
        category.image_path.is_some(),
    )
    .await?;

    if !store
        .delete_category(&category.id)
        .api_err("Failed to delete category")?
    {
        return Err(ApiError::not_found("Category not found"));
    }

    tracing::info!(category_id = %category.id, artefacts = artefacts.len(), "Category deleted");

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
