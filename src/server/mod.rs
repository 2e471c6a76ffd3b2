mod api;
pub mod dto;
pub mod form;
pub mod ids;
pub mod response;
mod router;
pub mod validation;

pub use router::{AppState, create_router};
