use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::store::{ArtefactStore, CategoryStore, Store};
use crate::types::{Artefact, Category, CategoryWithArtefacts};

/// Loads a category the caller is about to change.
/// Missing rows are 404; rows owned by someone else are 403.
pub fn owned_category(store: &dyn Store, caller_id: &str, id: &str) -> Result<Category, ApiError> {
    let category = store
        .get_category(id)
        .api_err("Failed to get category")?
        .or_not_found("Category not found")?;

    if category.user_id != caller_id {
        return Err(ApiError::forbidden("Category belongs to another user"));
    }
    Ok(category)
}

/// Loads an artefact the caller is about to change. Same rules as
/// [`owned_category`].
pub fn owned_artefact(store: &dyn Store, caller_id: &str, id: &str) -> Result<Artefact, ApiError> {
    let artefact = store
        .get_artefact(id)
        .api_err("Failed to get artefact")?
        .or_not_found("Artefact not found")?;

    if artefact.user_id != caller_id {
        return Err(ApiError::forbidden("Artefact belongs to another user"));
    }
    Ok(artefact)
}

/// Reads are scoped to the caller: someone else's category looks missing.
pub fn visible_category(
    store: &dyn Store,
    caller_id: &str,
    id: &str,
) -> Result<CategoryWithArtefacts, ApiError> {
    store
        .get_category_with_artefacts(id)
        .api_err("Failed to get category")?
        .filter(|entry| entry.category.user_id == caller_id)
        .or_not_found("Category not found")
}

pub fn visible_artefact(store: &dyn Store, caller_id: &str, id: &str) -> Result<Artefact, ApiError> {
    store
        .get_artefact(id)
        .api_err("Failed to get artefact")?
        .filter(|artefact| artefact.user_id == caller_id)
        .or_not_found("Artefact not found")
}

/// Rejects requests that claim to act on behalf of a different user.
pub fn require_self(caller_id: &str, claimed_id: &str) -> Result<(), ApiError> {
    if caller_id != claimed_id {
        return Err(ApiError::forbidden("Cannot act on behalf of another user"));
    }
    Ok(())
}
