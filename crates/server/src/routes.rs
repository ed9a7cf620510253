use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::routing::{get, post};
use axum::{Json, Router};
use docgate_core::ClassifyResponse;
use docgate_ocr::Extractor;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::payload::ImagePayload;
use crate::scoring::{classify_image, MAX_IMAGE_BYTES};

pub const SERVICE_NAME: &str = "academic-document-classifier";

/// Base64 inflates uploads by a third; leave room for it above the image cap.
const BODY_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub extractor: Extractor,
    pub min_matches: usize,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/classify", post(classify))
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %req.method(),
                uri = %req.uri(),
            )
        }))
        .layer(cors)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    recognizer: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        recognizer: state.extractor.recognizer_name(),
    })
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": SERVICE_NAME,
        "endpoints": {
            "POST /classify": "Classify an image (multipart `file`, JSON base64 `image`/`file`, or raw body)",
            "GET /health": "Health check",
            "GET /": "This listing",
        }
    }))
}

async fn classify(
    State(state): State<AppState>,
    ImagePayload(bytes): ImagePayload,
) -> Result<Json<ClassifyResponse>, ApiError> {
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::TooLarge);
    }
    tracing::debug!(len = bytes.len(), "Received upload");

    let AppState { extractor, min_matches } = state;
    let response = tokio::task::spawn_blocking(move || classify_image(&extractor, &bytes, min_matches))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use base64::Engine as _;
    use docgate_ocr::{MockFaceDetector, MockRecognizer};
    use image::{DynamicImage, ImageBuffer, Rgb};
    use std::io::Cursor;
    use std::sync::Arc;
    use tower::ServiceExt;

    const GRADE_CARD: &str = "Bangalore University\nGrade Card\nSemester III  SGPA 7.9  Result: PASS";

    fn app(text: &str) -> Router {
        let extractor = Extractor::new(
            Arc::new(MockRecognizer::new(text)),
            Arc::new(MockFaceDetector::with_faces(0)),
        );
        router(AppState { extractor, min_matches: 2 })
    }

    fn png() -> Vec<u8> {
        let img = ImageBuffer::from_fn(64, 48, |x, y| Rgb([(x * 4) as u8, (y * 5) as u8, 128u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_classify(content_type: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/classify")
            .header(CONTENT_TYPE, content_type)
            .body(body.into())
            .unwrap()
    }

    fn encoded(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(app(""), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], SERVICE_NAME);
        assert_eq!(json["recognizer"], "mock");
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, json) = send(app(""), req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["endpoints"]["POST /classify"].is_string());
    }

    #[tokio::test]
    async fn empty_body_is_missing_image() {
        let (status, json) = send(app(GRADE_CARD), post_classify("application/octet-stream", Body::empty())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No image data provided");
        assert_eq!(json["is_academic"], false);
        assert_eq!(json["score"], 0);
    }

    #[tokio::test]
    async fn json_without_image_is_missing_image() {
        let (status, json) = send(app(GRADE_CARD), post_classify("application/json", r#"{"other":1}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["reason"], "No image data provided");
    }

    #[tokio::test]
    async fn json_image_is_classified() {
        let body = serde_json::json!({ "image": encoded(&png()) }).to_string();
        let (status, json) = send(app(GRADE_CARD), post_classify("application/json", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_academic"], true);
        assert!(json["score"].as_u64().unwrap() >= 2);
        assert!(json["reason"].as_str().unwrap().starts_with("Document classified as academic"));
    }

    #[tokio::test]
    async fn json_data_url_and_file_field_are_accepted() {
        let data_url = format!("data:image/png;base64,{}", encoded(&png()));
        for body in [
            serde_json::json!({ "image": data_url }),
            serde_json::json!({ "file": encoded(&png()) }),
        ] {
            let (status, json) = send(app(GRADE_CARD), post_classify("application/json", body.to_string())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["is_academic"], true);
        }
    }

    #[tokio::test]
    async fn invalid_base64_is_bad_request() {
        let body = serde_json::json!({ "image": "!!not base64!!" }).to_string();
        let (status, json) = send(app(GRADE_CARD), post_classify("application/json", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["is_academic"], false);
    }

    #[tokio::test]
    async fn multipart_file_is_classified() {
        let boundary = "docgate-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"card.png\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&png());
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let req = post_classify(&format!("multipart/form-data; boundary={boundary}"), body);
        let (status, json) = send(app(GRADE_CARD), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_academic"], true);
    }

    #[tokio::test]
    async fn raw_bytes_and_raw_base64_are_classified() {
        for body in [png(), encoded(&png()).into_bytes()] {
            let (status, json) = send(app(GRADE_CARD), post_classify("application/octet-stream", body)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["is_academic"], true);
        }
    }

    #[tokio::test]
    async fn oversized_upload_is_refused() {
        let body = vec![0u8; MAX_IMAGE_BYTES + 1];
        let (status, json) = send(app(GRADE_CARD), post_classify("application/octet-stream", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["reason"], "Image too large");
        assert_eq!(json["error"], "Image too large. Maximum size is 10MB.");
    }

    #[tokio::test]
    async fn unreadable_image_reports_no_text() {
        let (status, json) = send(app(""), post_classify("application/octet-stream", png())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_academic"], false);
        assert_eq!(json["error"], "No text extracted");
    }

    #[tokio::test]
    async fn undecodable_upload_is_a_failed_classification() {
        let (status, json) = send(app(GRADE_CARD), post_classify("application/octet-stream", b"\x00\x01garbage".to_vec())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_academic"], false);
        assert!(json["reason"].as_str().unwrap().starts_with("Classification failed"));
    }

    #[tokio::test]
    async fn preflight_allows_any_origin() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/classify")
            .header("origin", "https://portal.example.edu")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = app("").oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
