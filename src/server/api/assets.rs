use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::assets::{AssetKind, content_type_for};
use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::response::ApiError;

pub async fn get_asset(
    _auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path((kind, file_name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind: AssetKind = kind.parse()?;
    let (reader, size) = state.assets.open(kind, &file_name).await?;

    let stream = ReaderStream::new(reader);
    let body = Body::from_stream(stream);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&file_name))
        .header(header::CONTENT_LENGTH, size)
        .header("X-Content-Type-Options", "nosniff")
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}
