use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};
use tower::ServiceBuilder;

use super::api::api_router;
use crate::assets::AssetStore;
use crate::auth::{PasswordHasher, TokenIssuer};
use crate::config::ServerConfig;
use crate::store::Store;

/// Multipart framing on top of the largest allowed image.
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub assets: AssetStore,
    pub tokens: TokenIssuer,
    pub passwords: PasswordHasher,
    /// Public base URL for external access. Used for absolute image URLs.
    pub public_base_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig) -> Self {
        Self {
            store,
            assets: AssetStore::new(&config.data_dir),
            tokens: TokenIssuer::new(config.auth.clone()),
            passwords: PasswordHasher::new(),
            public_base_url: config.public_base_url.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(BODY_LIMIT_OVERHEAD);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_request))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
