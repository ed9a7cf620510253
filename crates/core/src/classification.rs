use serde::{Deserialize, Serialize};

/// Decision from a classification strategy for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub accepted: bool,
    /// 0.0–1.0.
    pub confidence: f32,
    /// Keyword match count, when the strategy scores keywords.
    pub score: Option<u32>,
    pub rationale: String,
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
}

impl ClassificationResult {
    /// A fail-closed result: not accepted, zero confidence.
    pub fn rejected(rationale: impl Into<String>) -> Self {
        Self {
            accepted: false,
            confidence: 0.0,
            score: None,
            rationale: rationale.into(),
            extracted_text: None,
            matched_keywords: vec![],
        }
    }
}

/// JSON body returned by the remote classification endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub is_academic: bool,
    pub score: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassifyResponse {
    pub fn failure(reason: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            is_academic: false,
            score: 0,
            text: String::new(),
            reason: reason.into(),
            matched_keywords: vec![],
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_is_fail_closed() {
        let r = ClassificationResult::rejected("timeout");
        assert!(!r.accepted);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.rationale, "timeout");
    }

    #[test]
    fn response_parses_minimal_body() {
        let body = r#"{"is_academic": true, "score": 3}"#;
        let r: ClassifyResponse = serde_json::from_str(body).unwrap();
        assert!(r.is_academic);
        assert_eq!(r.score, 3);
        assert!(r.matched_keywords.is_empty());
        assert!(r.error.is_none());
    }

    #[test]
    fn failure_omits_keywords_when_serialized() {
        let json = serde_json::to_value(ClassifyResponse::failure("no text", "No text extracted")).unwrap();
        assert_eq!(json["is_academic"], false);
        assert_eq!(json["error"], "No text extracted");
        assert!(json.get("matched_keywords").is_none());
    }
}
