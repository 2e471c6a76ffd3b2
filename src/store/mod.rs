mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Persistence for user accounts.
pub trait UserStore: Send + Sync {
    /// Fails with [`Error::IdCollision`](crate::error::Error::IdCollision) when the id is
    /// taken and [`Error::AlreadyExists`](crate::error::Error::AlreadyExists) when the
    /// username is.
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Removes the user row; categories and artefacts go with it.
    fn delete_user(&self, id: &str) -> Result<bool>;
}

/// Persistence for categories.
pub trait CategoryStore: Send + Sync {
    fn create_category(&self, category: &Category) -> Result<()>;
    fn get_category(&self, id: &str) -> Result<Option<Category>>;
    fn get_category_with_artefacts(&self, id: &str) -> Result<Option<CategoryWithArtefacts>>;
    fn list_categories(&self, user_id: &str) -> Result<Vec<CategoryWithArtefacts>>;
    fn update_category(&self, category: &Category) -> Result<()>;
    /// Removes the category row; its artefacts go with it.
    fn delete_category(&self, id: &str) -> Result<bool>;
}

/// Persistence for artefacts.
pub trait ArtefactStore: Send + Sync {
    fn create_artefact(&self, artefact: &Artefact) -> Result<()>;
    fn get_artefact(&self, id: &str) -> Result<Option<Artefact>>;
    fn list_artefacts(&self, user_id: &str) -> Result<Vec<Artefact>>;
    fn list_category_artefacts(&self, category_id: &str) -> Result<Vec<Artefact>>;
    fn update_artefact(&self, artefact: &Artefact) -> Result<()>;
    fn delete_artefact(&self, id: &str) -> Result<bool>;
}

/// Store defines the database interface.
pub trait Store: UserStore + CategoryStore + ArtefactStore {
    fn initialize(&self) -> Result<()>;
}
