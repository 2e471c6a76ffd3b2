use std::collections::HashMap;

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;

use super::response::ApiError;
use crate::assets::ImageUpload;

const IMAGE_FIELD: &str = "image";

/// A JSON request body whose rejections use the API error shape instead of
/// axum's plain-text responses.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!("Rejected JSON body: {}", rejection.body_text());
                Err(json_rejection(&rejection))
            }
        }
    }
}

fn json_rejection(rejection: &JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => ApiError {
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            message: "Expected a JSON request body".to_string(),
        },
        _ if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::payload_too_large("Request body too large")
        }
        _ => ApiError::bad_request("Invalid request body"),
    }
}

/// A parsed multipart form: text parts keyed by lower-cased name, plus the
/// optional image part.
#[derive(Debug, Default)]
pub struct EntityForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl EntityForm {
    pub async fn read(multipart: &mut Multipart, max_upload_bytes: usize) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_ascii_lowercase) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let mut data = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    if data.len() + chunk.len() > max_upload_bytes {
                        return Err(ApiError::payload_too_large(format!(
                            "Image exceeds maximum allowed size ({max_upload_bytes} bytes)"
                        )));
                    }
                    data.extend_from_slice(&chunk);
                }
                form.image = Some(ImageUpload { file_name, data });
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Removes a text field, matching its name case-insensitively.
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(&name.to_ascii_lowercase())
    }

    /// Removes a text field that must be present and non-blank.
    pub fn take_required(&mut self, name: &str) -> Result<String, ApiError> {
        match self.take(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ApiError::bad_request(format!("{name} is required"))),
        }
    }

    /// The uploaded image, if one with content was sent.
    pub fn take_image(&mut self) -> Option<ImageUpload> {
        self.image.take().filter(|image| !image.is_empty())
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    let status = err.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large("Request body too large");
    }
    ApiError {
        status,
        message: format!("Failed to read multipart: {}", err.body_text()),
    }
}
