use uuid::Uuid;

use crate::error::{Error, Result};

/// Attempts before giving up on finding an unused id.
pub const MAX_ID_ATTEMPTS: usize = 5;

#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builds an entity around a fresh id and inserts it, regenerating the id
/// whenever the store reports a collision.
pub fn insert_with_fresh_id<T, B, I>(build: B, insert: I) -> Result<T>
where
    B: Fn(String) -> T,
    I: Fn(&T) -> Result<()>,
{
    for attempt in 1..=MAX_ID_ATTEMPTS {
        let entity = build(new_id());
        match insert(&entity) {
            Ok(()) => return Ok(entity),
            Err(Error::IdCollision) => {
                tracing::warn!(attempt, "Generated id already in use, retrying");
            }
            Err(e) => return Err(e),
        }
    }
    Err(Error::Conflict("Could not allocate a unique id".to_string()))
}
