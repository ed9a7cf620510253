mod error;
mod payload;
mod routes;
mod scoring;

use docgate_core::Thresholds;
use docgate_ocr::{Extractor, MockFaceDetector, TextRecognizer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::routes::{router, AppState, SERVICE_NAME};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docgate_server=info,tower_http=info")),
        )
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);

    let min_matches = Thresholds::default().min_academic_matches;
    let extractor = Extractor::new(recognizer(), Arc::new(MockFaceDetector::with_faces(0)));
    tracing::info!(recognizer = extractor.recognizer_name(), min_matches, "Starting {SERVICE_NAME}");

    let app = router(AppState { extractor, min_matches });
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "tesseract")]
fn recognizer() -> Arc<dyn TextRecognizer> {
    let data_path = std::env::var("TESSDATA_PREFIX").ok();
    let lang = std::env::var("OCR_LANG").unwrap_or_else(|_| "eng".to_string());
    Arc::new(docgate_ocr::recognizer::tesseract_backend::TesseractRecognizer::new(data_path, &lang))
}

#[cfg(not(feature = "tesseract"))]
fn recognizer() -> Arc<dyn TextRecognizer> {
    tracing::warn!("Built without the `tesseract` feature; every upload will read as blank");
    Arc::new(docgate_ocr::MockRecognizer::new(""))
}
