use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::schema::SCHEMA;
use super::{ArtefactStore, CategoryStore, Store, UserStore};
use crate::error::{Error, Result};
use crate::types::*;

const CATEGORY_COLUMNS: &str = "c.id, c.category_index, c.user_id, c.name, c.image_path, c.modified_at";
const ARTEFACT_COLUMNS: &str =
    "a.id, a.artefact_index, a.user_id, a.category_id, a.name, a.image_path, a.modified_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database. Mostly useful for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Maps an INSERT failure onto the store's conflict errors.
fn map_insert_error(err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            match e.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Error::IdCollision,
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => Error::AlreadyExists,
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Error::NotFound,
                _ => Error::Database(err),
            }
        }
        _ => Error::Database(err),
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        guardian_key: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        index: row.get(1)?,
        user_id: row.get(2)?,
        name: row.get(3)?,
        image_path: row.get(4)?,
        modified_at: row
            .get::<_, Option<String>>(5)?
            .as_deref()
            .map(parse_datetime),
    })
}

/// Reads artefact columns starting at `offset`. Returns `None` when the id
/// column is NULL, which happens for categories without artefacts in a LEFT JOIN.
fn artefact_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Option<Artefact>> {
    let Some(id) = row.get::<_, Option<String>>(offset)? else {
        return Ok(None);
    };
    Ok(Some(Artefact {
        id,
        index: row.get(offset + 1)?,
        user_id: row.get(offset + 2)?,
        category_id: row.get(offset + 3)?,
        name: row.get(offset + 4)?,
        image_path: row.get(offset + 5)?,
        modified_at: row
            .get::<_, Option<String>>(offset + 6)?
            .as_deref()
            .map(parse_datetime),
    }))
}

fn artefact_from_row(row: &Row<'_>) -> rusqlite::Result<Artefact> {
    artefact_at(row, 0)?.ok_or(rusqlite::Error::InvalidColumnType(
        0,
        "id".to_string(),
        rusqlite::types::Type::Null,
    ))
}

/// Folds joined category/artefact rows into one entry per category,
/// preserving the query order.
fn group_categories(
    rows: Vec<(Category, Option<Artefact>)>,
) -> Vec<CategoryWithArtefacts> {
    let mut grouped: Vec<CategoryWithArtefacts> = Vec::new();
    for (category, artefact) in rows {
        match grouped.last_mut() {
            Some(last) if last.category.id == category.id => {
                last.artefacts.extend(artefact);
            }
            _ => grouped.push(CategoryWithArtefacts {
                category,
                artefacts: artefact.into_iter().collect(),
            }),
        }
    }
    grouped
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }
}

impl UserStore for SqliteStore {
    fn create_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, username, password_hash, name, guardian_key, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.id,
                    user.username,
                    user.password_hash,
                    user.name,
                    user.guardian_key,
                    format_datetime(&user.created_at),
                ],
            )
            .map_err(map_insert_error)?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password_hash, name, guardian_key, created_at
             FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password_hash, name, guardian_key, created_at
             FROM users WHERE username = ?1",
            params![username],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

impl CategoryStore for SqliteStore {
    fn create_category(&self, category: &Category) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO categories (id, category_index, user_id, name, image_path, modified_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    category.id,
                    category.index,
                    category.user_id,
                    category.name,
                    category.image_path,
                    category.modified_at.as_ref().map(format_datetime),
                ],
            )
            .map_err(map_insert_error)?;
        Ok(())
    }

    fn get_category(&self, id: &str) -> Result<Option<Category>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.id = ?1"),
            params![id],
            category_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_category_with_artefacts(&self, id: &str) -> Result<Option<CategoryWithArtefacts>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS}, {ARTEFACT_COLUMNS}
             FROM categories c LEFT JOIN artefacts a ON a.category_id = c.id
             WHERE c.id = ?1
             ORDER BY a.artefact_index, a.id"
        ))?;

        let rows = stmt
            .query_map(params![id], |row| {
                Ok((category_from_row(row)?, artefact_at(row, 6)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(group_categories(rows).into_iter().next())
    }

    fn list_categories(&self, user_id: &str) -> Result<Vec<CategoryWithArtefacts>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS}, {ARTEFACT_COLUMNS}
             FROM categories c LEFT JOIN artefacts a ON a.category_id = c.id
             WHERE c.user_id = ?1
             ORDER BY c.category_index IS NULL, c.category_index, c.id, a.artefact_index, a.id"
        ))?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((category_from_row(row)?, artefact_at(row, 6)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(group_categories(rows))
    }

    fn update_category(&self, category: &Category) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE categories SET category_index = ?1, name = ?2, image_path = ?3, modified_at = ?4
             WHERE id = ?5",
            params![
                category.index,
                category.name,
                category.image_path,
                category.modified_at.as_ref().map(format_datetime),
                category.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_category(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

impl ArtefactStore for SqliteStore {
    fn create_artefact(&self, artefact: &Artefact) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO artefacts
                 (id, artefact_index, user_id, category_id, name, image_path, modified_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    artefact.id,
                    artefact.index,
                    artefact.user_id,
                    artefact.category_id,
                    artefact.name,
                    artefact.image_path,
                    artefact.modified_at.as_ref().map(format_datetime),
                ],
            )
            .map_err(map_insert_error)?;
        Ok(())
    }

    fn get_artefact(&self, id: &str) -> Result<Option<Artefact>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {ARTEFACT_COLUMNS} FROM artefacts a WHERE a.id = ?1"),
            params![id],
            artefact_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_artefacts(&self, user_id: &str) -> Result<Vec<Artefact>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ARTEFACT_COLUMNS} FROM artefacts a
             WHERE a.user_id = ?1 ORDER BY a.artefact_index, a.id"
        ))?;

        let rows = stmt.query_map(params![user_id], artefact_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_category_artefacts(&self, category_id: &str) -> Result<Vec<Artefact>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ARTEFACT_COLUMNS} FROM artefacts a
             WHERE a.category_id = ?1 ORDER BY a.artefact_index, a.id"
        ))?;

        let rows = stmt.query_map(params![category_id], artefact_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_artefact(&self, artefact: &Artefact) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE artefacts SET artefact_index = ?1, category_id = ?2, name = ?3,
                 image_path = ?4, modified_at = ?5
                 WHERE id = ?6",
                params![
                    artefact.index,
                    artefact.category_id,
                    artefact.name,
                    artefact.image_path,
                    artefact.modified_at.as_ref().map(format_datetime),
                    artefact.id,
                ],
            )
            .map_err(map_insert_error)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_artefact(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM artefacts WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}
