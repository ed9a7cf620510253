use docgate_core::{ClassifyResponse, RejectionReason};
use docgate_ocr::Extractor;
use docgate_validate::academic_matches;

/// Uploads larger than this are refused before decoding.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// Characters of recognised text echoed back in the response.
pub const TEXT_PREVIEW_CHARS: usize = 500;
/// Below this much text the image is reported as unreadable.
pub const MIN_TEXT_CHARS: usize = 5;
/// Keywords quoted in an acceptance reason.
const REASON_KEYWORDS: usize = 5;

/// Markup some recognizers leave in their output.
const SPECIAL_TOKENS: [&str; 3] = ["<s_cord-v2>", "</s>", "<pad>"];

/// Decode, recognise and score one upload.
pub fn classify_image(extractor: &Extractor, bytes: &[u8], min_matches: usize) -> ClassifyResponse {
    let image = match image::load_from_memory(bytes) {
        Ok(image) => image,
        Err(e) => {
            tracing::debug!("Upload did not decode: {e}");
            return ClassifyResponse::failure(format!("Classification failed: {e}"), e.to_string());
        }
    };
    let text = extractor.extract_text(&image, Some(bytes));
    classify_text(&text, min_matches)
}

/// Keyword scoring over recognised text.
pub fn classify_text(raw: &str, min_matches: usize) -> ClassifyResponse {
    let mut text = raw.to_lowercase();
    for token in SPECIAL_TOKENS {
        text = text.replace(token, "");
    }
    let text = text.trim();

    if text.chars().count() < MIN_TEXT_CHARS {
        return ClassifyResponse::failure("Failed to extract text from image.", "No text extracted");
    }

    let matched = academic_matches(text);
    let is_academic = matched.len() >= min_matches;
    let reason = if is_academic {
        let quoted: Vec<&str> = matched.iter().take(REASON_KEYWORDS).copied().collect();
        format!(
            "Document classified as academic (matched {} keywords: {})",
            matched.len(),
            quoted.join(", ")
        )
    } else {
        RejectionReason::NonAcademicContent.to_string()
    };
    tracing::info!(is_academic, score = matched.len(), "Classified upload");

    ClassifyResponse {
        is_academic,
        score: matched.len() as u32,
        text: text.chars().take(TEXT_PREVIEW_CHARS).collect(),
        reason,
        matched_keywords: matched.iter().map(|k| k.to_string()).collect(),
        error: None,
    }
}
