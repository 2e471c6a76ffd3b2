//! # Curio
//!
//! A REST backend for a personal collection app: users own categories, and
//! categories group artefacts that each carry an image. Usable both as a
//! standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use curio::config::{AuthConfig, ServerConfig, decode_secret};
//! use curio::server::{AppState, create_router};
//! use curio::store::{SqliteStore, Store};
//!
//! let auth = AuthConfig::new(decode_secret(&std::fs::read_to_string("./data/.signing_secret")?)?)?;
//! let config = ServerConfig::new(PathBuf::from("./data"), auth);
//!
//! let store = SqliteStore::new(config.db_path())?;
//! store.initialize()?;
//!
//! let state = Arc::new(AppState::new(Arc::new(store), &config));
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod assets;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
