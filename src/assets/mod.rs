//! Filesystem storage for uploaded images.
//!
//! Images live under `<data-dir>/Assets/<kind>/<entity-id>.<ext>` and are
//! addressed by the owning entity's id, so no database lookup is needed to
//! find or remove them.

mod storage;

pub use storage::{AssetError, AssetKind, AssetStore, ImageUpload, content_type_for};
