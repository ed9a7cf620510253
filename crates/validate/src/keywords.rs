use std::sync::OnceLock;

use docgate_core::category::{ROLL_NUMBER_PATTERN, USN_PATTERN};
use regex::Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_usn, USN_PATTERN);
re!(re_roll_number, ROLL_NUMBER_PATTERN);

// ── Term lists ───────────────────────────────────────────────────────────────

/// Indicator terms for academic content. Matched as lowercase substrings, so
/// "class" also fires on "classification"; the threshold of two distinct terms
/// absorbs most of that noise.
pub const ACADEMIC_KEYWORDS: &[&str] = &[
    "grade",
    "marks",
    "certificate",
    "university",
    "college",
    "board",
    "percentage",
    "subject",
    "credits",
    "sgpa",
    "cgpa",
    "register",
    "usn",
    "student",
    "id card",
    "exam",
    "semester",
    "marksheet",
    "degree",
    "diploma",
    "transcript",
    "academic",
    "institute",
    "education",
    "result",
    "score",
    "pass",
    "fail",
    "division",
    "class",
    "roll",
    "admission",
];

/// Names of issuing bodies. Long text without any of these is not from an
/// institution.
pub const INSTITUTION_MARKERS: &[&str] = &[
    "university",
    "college",
    "school",
    "board",
    "institute",
    "institution",
    "academy",
    "council",
    "polytechnic",
    "vidyalaya",
    "department of",
    "examination",
    "education",
];

/// Terms printed on identity cards.
pub const ID_KEYWORDS: &[&str] = &[
    "identity card",
    "id card",
    "student id",
    "usn",
    "roll no",
    "register no",
    "registration no",
    "enrollment no",
    "admission no",
    "valid upto",
    "valid till",
    "blood group",
];

// ── Scoring ──────────────────────────────────────────────────────────────────

/// Distinct academic terms found in `text`, in list order.
pub fn academic_matches(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    ACADEMIC_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(k))
        .collect()
}

pub fn has_institution_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    INSTITUTION_MARKERS.iter().any(|m| lower.contains(m))
}

/// An ID keyword, a university seat number or a labelled roll number.
pub fn has_id_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    ID_KEYWORDS.iter().any(|k| lower.contains(k))
        || re_usn().is_match(text)
        || re_roll_number().is_match(text)
}
