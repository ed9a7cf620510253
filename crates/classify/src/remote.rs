use base64::Engine as _;
use docgate_core::{ClassificationResult, ClassifyResponse};
use futures_util::stream;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::config::{PayloadEncoding, RemoteConfig};
use crate::error::{ClassifyError, RemoteError};

/// Keyword matches at which remote confidence reaches 1.0.
pub const SCORE_SATURATION: u32 = 5;

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Client for an HTTP classification endpoint.
pub struct RemoteClassifier {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl RemoteClassifier {
    /// `send_timeout` bounds connecting plus uploading the image;
    /// `response_timeout` bounds the whole exchange.
    pub fn new(config: RemoteConfig) -> Result<Self, ClassifyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.send_timeout())
            .build()
            .map_err(|e| ClassifyError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Never fails: every transport or protocol problem is a rejection.
    pub async fn classify(&self, image_bytes: &[u8]) -> ClassificationResult {
        match self.request(image_bytes).await {
            Ok(response) => into_result(response),
            Err(e) => {
                tracing::warn!(endpoint = %self.config.endpoint, "Remote classification failed: {e}");
                ClassificationResult::rejected(e.to_string())
            }
        }
    }

    async fn request(&self, image_bytes: &[u8]) -> Result<ClassifyResponse, RemoteError> {
        let (sent_tx, sent_rx) = oneshot::channel();
        let builder = self
            .client
            .post(&self.config.endpoint)
            .timeout(self.config.response_timeout());

        let builder = match self.config.encoding {
            PayloadEncoding::Multipart => {
                let len = image_bytes.len() as u64;
                let part = Part::stream_with_length(upload_body(image_bytes.to_vec(), sent_tx), len)
                    .file_name("document");
                builder.multipart(Form::new().part("file", part))
            }
            PayloadEncoding::Base64Json => {
                // The base64 alphabet needs no JSON escaping.
                let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);
                let json = format!(r#"{{"image":"{encoded}"}}"#);
                builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(upload_body(json.into_bytes(), sent_tx))
            }
        };

        let send = builder.send();
        tokio::pin!(send);
        let response = tokio::select! {
            sent = &mut send => sent?,
            _ = upload_deadline(sent_rx, self.config.send_timeout()) => {
                return Err(RemoteError::UploadTimeout);
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Parse(e.to_string()))
    }
}

/// Request body that signals `sent` once its last chunk has been taken by the
/// transport.
fn upload_body(payload: Vec<u8>, sent: oneshot::Sender<()>) -> Body {
    let chunks: Vec<Vec<u8>> = payload.chunks(UPLOAD_CHUNK_BYTES).map(<[u8]>::to_vec).collect();
    let stream = stream::unfold((chunks.into_iter(), Some(sent)), |(mut chunks, mut sent)| async move {
        match chunks.next() {
            Some(chunk) => Some((Ok::<_, std::io::Error>(chunk), (chunks, sent))),
            None => {
                if let Some(sent) = sent.take() {
                    let _ = sent.send(());
                }
                None
            }
        }
    });
    Body::wrap_stream(stream)
}

/// Resolves only when the upload is still unfinished after `limit`.
async fn upload_deadline(sent: oneshot::Receiver<()>, limit: Duration) {
    if tokio::time::timeout(limit, sent).await.is_ok() {
        std::future::pending::<()>().await;
    }
}

fn into_result(response: ClassifyResponse) -> ClassificationResult {
    let confidence = (response.score as f32 / SCORE_SATURATION as f32).min(1.0);
    let rationale = match (&response.error, response.reason.is_empty()) {
        (Some(error), true) => error.clone(),
        _ => response.reason.clone(),
    };
    tracing::debug!(accepted = response.is_academic, score = response.score, "Remote classification");
    ClassificationResult {
        accepted: response.is_academic,
        confidence,
        score: Some(response.score),
        rationale,
        extracted_text: (!response.text.is_empty()).then_some(response.text),
        matched_keywords: response.matched_keywords,
    }
}
