use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use base64::Engine as _;
use serde::Deserialize;

use crate::error::ApiError;

/// Raw image bytes pulled from whichever encoding the client chose:
/// a multipart `file` field, a JSON `image` (optionally a data URL) or
/// `file` string in base64, or the request body itself.
pub struct ImagePayload(pub Vec<u8>);

#[derive(Deserialize)]
struct JsonPayload {
    image: Option<String>,
    file: Option<String>,
}

impl<S> FromRequest<S> for ImagePayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?
            {
                if field.name() == Some("file") {
                    let data = field.bytes().await.map_err(|e| ApiError::BadRequest(e.body_text()))?;
                    return non_empty(data.to_vec());
                }
            }
            return Err(ApiError::MissingImage);
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        if content_type.starts_with("application/json") {
            let json: JsonPayload = serde_json::from_slice(&body)
                .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;
            let encoded = match (json.image, json.file) {
                (Some(image), _) => strip_data_url(&image).to_string(),
                (None, Some(file)) => file,
                (None, None) => return Err(ApiError::MissingImage),
            };
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| ApiError::BadRequest(format!("Invalid base64 image: {e}")))?;
            return non_empty(bytes);
        }

        non_empty(decode_raw(&body))
    }
}

fn non_empty(bytes: Vec<u8>) -> Result<ImagePayload, ApiError> {
    if bytes.is_empty() {
        Err(ApiError::MissingImage)
    } else {
        Ok(ImagePayload(bytes))
    }
}

/// `data:image/png;base64,AAAA` → `AAAA`.
fn strip_data_url(value: &str) -> &str {
    match value.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => value,
    }
}

/// A raw body is base64 text when it decodes as such, image bytes otherwise.
fn decode_raw(body: &[u8]) -> Vec<u8> {
    let trimmed = body.trim_ascii();
    base64::engine::general_purpose::STANDARD
        .decode(trimmed)
        .unwrap_or_else(|_| body.to_vec())
}
