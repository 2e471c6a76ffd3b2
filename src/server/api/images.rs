use crate::assets::{AssetKind, AssetStore, ImageUpload};
use crate::error::Result as StoreResult;
use crate::server::response::ApiError;

/// Writes the image of a freshly inserted row. If the write fails the row is
/// removed again through `rollback` so no row points at a missing file.
pub async fn write_new_image<F>(
    assets: &AssetStore,
    kind: AssetKind,
    entity_id: &str,
    image: Option<&ImageUpload>,
    rollback: F,
) -> Result<(), ApiError>
where
    F: FnOnce() -> StoreResult<bool>,
{
    let Some(image) = image else {
        return Ok(());
    };

    if let Err(e) = assets.store(kind, entity_id, image).await {
        tracing::error!("Failed to store image for {kind} {entity_id}: {e}");
        if let Err(e) = rollback() {
            tracing::error!("Failed to remove {kind} {entity_id} after image failure: {e}");
        }
        return Err(ApiError::internal("Failed to store image"));
    }
    Ok(())
}

/// Swaps the stored image of an existing entity and returns the new public path.
pub async fn replace_image(
    assets: &AssetStore,
    kind: AssetKind,
    entity_id: &str,
    image: &ImageUpload,
) -> Result<String, ApiError> {
    assets.delete(kind, entity_id).await?;
    assets
        .store(kind, entity_id, image)
        .await?
        .ok_or_else(|| ApiError::bad_request("Image is empty"))
}

/// Removes the image of an entity that is about to be deleted.
pub async fn remove_image(
    assets: &AssetStore,
    kind: AssetKind,
    entity_id: &str,
    expected: bool,
) -> Result<(), ApiError> {
    let deleted = assets.delete(kind, entity_id).await?;
    if expected && !deleted {
        tracing::warn!("No image file found for {kind} {entity_id}");
    }
    Ok(())
}
