use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    #[default]
    Document,
    /// Card-sized identity documents: a printed photo is expected and the
    /// text floor is lower.
    IdentityCard,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Document => write!(f, "document"),
            CategoryKind::IdentityCard => write!(f, "identity_card"),
        }
    }
}

/// A user-selectable document category and the rule its text must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub kind: CategoryKind,
    /// Terms matched case-insensitively on word boundaries, so `class x`
    /// does not fire inside `class xii`.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Terms that fail the category outright, whatever else matches.
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    #[serde(default = "default_min_keyword_matches")]
    pub min_keyword_matches: usize,
    /// Regular expressions; any match satisfies the category on its own.
    #[serde(default)]
    pub id_patterns: Vec<String>,
}

fn default_min_keyword_matches() -> usize {
    1
}

impl CategoryDescriptor {
    pub fn is_identity_card(&self) -> bool {
        self.kind == CategoryKind::IdentityCard
    }

    fn excluding(mut self, terms: &[&str]) -> Self {
        self.exclude_keywords = terms.iter().map(|t| t.to_string()).collect();
        self
    }
}

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Duplicate category id: '{0}'")]
    DuplicateId(String),
    #[error("Category '{0}' has neither keywords nor id patterns")]
    EmptyPredicate(String),
    #[error("Category registry is empty")]
    Empty,
    #[error("Failed to parse category TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// University seat number, e.g. `1RV20CS001`.
pub const USN_PATTERN: &str = r"\b[1-4][A-Z]{2}\d{2}[A-Z]{2,3}\d{3}\b";
/// A labelled roll / register / enrolment number.
pub const ROLL_NUMBER_PATTERN: &str =
    r"(?i)\b(?:roll|reg(?:istration|ister)?|enrol(?:l)?ment)\s*(?:no|number)\.?\s*[:\-]?\s*[a-z0-9/\-]{4,}";

fn descriptor(
    id: &str,
    label: &str,
    kind: CategoryKind,
    keywords: &[&str],
    min_keyword_matches: usize,
    id_patterns: &[&str],
) -> CategoryDescriptor {
    CategoryDescriptor {
        id: id.to_string(),
        label: label.to_string(),
        kind,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        exclude_keywords: Vec::new(),
        min_keyword_matches,
        id_patterns: id_patterns.iter().map(|p| p.to_string()).collect(),
    }
}

/// The built-in category table.
pub fn builtin_categories() -> Vec<CategoryDescriptor> {
    vec![
        descriptor(
            "sslc_marks_card",
            "10th / SSLC Marks Card",
            CategoryKind::Document,
            &[
                "sslc",
                "secondary school leaving",
                "secondary education examination board",
                "central board of secondary education",
                "cbse",
                "icse",
                "council for the indian school certificate",
                "class x",
                "matriculation",
                "secondary school certificate",
            ],
            1,
            &[],
        )
        .excluding(&[
            "class xii",
            "class 12",
            "12th",
            "senior school certificate",
            "higher secondary",
            "senior secondary",
            "pre-university",
            "pre university",
            "puc",
        ]),
        descriptor(
            "puc_marks_card",
            "12th / PUC Marks Card",
            CategoryKind::Document,
            &[
                "pre-university",
                "pre university",
                "puc",
                "higher secondary",
                "senior secondary",
                "class xii",
                "class 12",
                "senior school certificate",
                "intermediate examination",
                "hsc",
            ],
            1,
            &[],
        ),
        descriptor(
            "degree_marks_card",
            "Degree Marks Card",
            CategoryKind::Document,
            &[
                "semester",
                "sgpa",
                "cgpa",
                "credits",
                "bachelor of",
                "master of",
                "b.e",
                "b.tech",
                "grade card",
                "university",
            ],
            2,
            &[USN_PATTERN],
        ),
        descriptor(
            "student_id_card",
            "Student ID Card",
            CategoryKind::IdentityCard,
            &[
                "identity card",
                "id card",
                "student id",
                "valid upto",
                "valid till",
                "blood group",
                "usn",
                "roll no",
                "register no",
            ],
            1,
            &[USN_PATTERN, ROLL_NUMBER_PATTERN],
        ),
        descriptor(
            "certificate",
            "Certificate",
            CategoryKind::Document,
            &[
                "certificate",
                "certify",
                "certified that",
                "awarded",
                "conferred",
                "successfully completed",
                "diploma",
                "provisional",
            ],
            2,
            &[],
        ),
    ]
}

/// Lookup table of categories. Ids are unique by construction.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<CategoryDescriptor>,
}

#[derive(Deserialize)]
struct RegistryFile {
    categories: Vec<CategoryDescriptor>,
}

impl CategoryRegistry {
    pub fn new(categories: Vec<CategoryDescriptor>) -> Result<Self, CategoryError> {
        if categories.is_empty() {
            return Err(CategoryError::Empty);
        }
        let mut seen = HashSet::new();
        for c in &categories {
            if !seen.insert(c.id.as_str()) {
                return Err(CategoryError::DuplicateId(c.id.clone()));
            }
            if c.keywords.is_empty() && c.id_patterns.is_empty() {
                return Err(CategoryError::EmptyPredicate(c.id.clone()));
            }
        }
        Ok(Self { categories })
    }

    pub fn builtin() -> Self {
        Self { categories: builtin_categories() }
    }

    /// Parse a `[[categories]]` table list.
    pub fn from_toml(toml_content: &str) -> Result<Self, CategoryError> {
        let file: RegistryFile = toml::from_str(toml_content)?;
        Self::new(file.categories)
    }

    pub fn get(&self, id: &str) -> Option<&CategoryDescriptor> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryDescriptor> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
