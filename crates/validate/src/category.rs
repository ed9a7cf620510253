use docgate_core::{CategoryDescriptor, CategoryRegistry};
use regex::Regex;

/// A descriptor paired with its precompiled terms and ID patterns.
struct CompiledCategory {
    descriptor: CategoryDescriptor,
    keywords: Vec<Regex>,
    exclusions: Vec<Regex>,
    patterns: Vec<Regex>,
}

/// Evaluates category predicates against extracted text.
pub struct CategoryMatcher {
    categories: Vec<CompiledCategory>,
}

impl CategoryMatcher {
    /// Compile every term and pattern up front; a bad pattern names its category.
    pub fn new(registry: &CategoryRegistry) -> Result<Self, (String, regex::Error)> {
        let categories = registry
            .iter()
            .map(|descriptor| {
                let compile = || -> Result<CompiledCategory, regex::Error> {
                    Ok(CompiledCategory {
                        descriptor: descriptor.clone(),
                        keywords: term_regexes(&descriptor.keywords)?,
                        exclusions: term_regexes(&descriptor.exclude_keywords)?,
                        patterns: descriptor
                            .id_patterns
                            .iter()
                            .map(|p| Regex::new(p))
                            .collect::<Result<Vec<_>, _>>()?,
                    })
                };
                compile().map_err(|e| (descriptor.id.clone(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { categories })
    }

    /// True when no exclusion term appears and either enough keywords appear
    /// or any ID pattern matches. Unknown ids never match.
    pub fn matches(&self, category_id: &str, text: &str) -> bool {
        let Some(compiled) = self.categories.iter().find(|c| c.descriptor.id == category_id) else {
            return false;
        };
        let d = &compiled.descriptor;

        if let Some(term) = compiled.exclusions.iter().find(|re| re.is_match(text)) {
            tracing::trace!(category = %d.id, term = term.as_str(), "Category excluded");
            return false;
        }

        let hits = compiled.keywords.iter().filter(|re| re.is_match(text)).count();
        if !d.keywords.is_empty() && hits >= d.min_keyword_matches.max(1) {
            tracing::trace!(category = %d.id, hits, "Category keywords matched");
            return true;
        }

        compiled.patterns.iter().any(|re| re.is_match(text))
    }
}

fn term_regexes(terms: &[String]) -> Result<Vec<Regex>, regex::Error> {
    terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| term_regex(t))
        .collect()
}

/// Case-insensitive regex for a literal term. Word-character ends are
/// anchored on word boundaries and inner spaces match any whitespace run.
fn term_regex(term: &str) -> Result<Regex, regex::Error> {
    let term = term.trim().to_lowercase();
    let body = term
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let start = if is_word(term.chars().next()) { r"\b" } else { "" };
    let end = if is_word(term.chars().last()) { r"\b" } else { "" };
    Regex::new(&format!("(?i){start}{body}{end}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgate_core::CategoryKind;

    fn matcher() -> CategoryMatcher {
        CategoryMatcher::new(&CategoryRegistry::builtin()).unwrap()
    }

    #[test]
    fn sslc_single_keyword_is_enough() {
        let m = matcher();
        assert!(m.matches("sslc_marks_card", "KARNATAKA SECONDARY EDUCATION EXAMINATION BOARD\nSSLC MARKS CARD"));
        assert!(!m.matches("sslc_marks_card", "Bachelor of Engineering, Semester 5"));
    }

    #[test]
    fn degree_needs_two_keywords() {
        let m = matcher();
        assert!(!m.matches("degree_marks_card", "University of Mysore"));
        assert!(m.matches("degree_marks_card", "University of Mysore  Semester III  SGPA 7.9"));
    }

    #[test]
    fn degree_accepts_seat_number_alone() {
        assert!(matcher().matches("degree_marks_card", "Name: Asha K\nUSN 1RV20CS001"));
    }

    #[test]
    fn student_id_by_roll_number() {
        assert!(matcher().matches("student_id_card", "Name Ravi   Reg No: 19BCE1234"));
    }

    #[test]
    fn unknown_category_never_matches() {
        assert!(!matcher().matches("passport", "certificate certified awarded"));
    }

    #[test]
    fn class_x_does_not_match_class_xii() {
        let m = matcher();
        assert!(m.matches("sslc_marks_card", "SECONDARY SCHOOL EXAMINATION CLASS X"));
        assert!(!m.matches("sslc_marks_card", "EXAMINATION CLASS XII"));
        assert!(m.matches("puc_marks_card", "EXAMINATION CLASS XII"));
    }

    #[test]
    fn exclusion_overrides_board_keywords() {
        let text = "CENTRAL BOARD OF SECONDARY EDUCATION\nSENIOR SCHOOL CERTIFICATE EXAMINATION";
        let m = matcher();
        assert!(!m.matches("sslc_marks_card", text));
        assert!(m.matches("puc_marks_card", text));
        assert!(m.matches("sslc_marks_card", "CENTRAL BOARD OF SECONDARY EDUCATION\nSECONDARY SCHOOL EXAMINATION"));
    }

    #[test]
    fn keywords_are_word_bounded() {
        let m = matcher();
        // "puc" inside an unrelated word is not a hit.
        assert!(!m.matches("puc_marks_card", "Pucca house, ward 4"));
        assert!(m.matches("puc_marks_card", "II PUC Annual Examination"));
    }

    #[test]
    fn configured_keywords_match_regardless_of_case() {
        let registry = CategoryRegistry::from_toml(
            r#"
            [[categories]]
            id = "hall_ticket"
            label = "Hall Ticket"
            keywords = ["Hall Ticket", "ADMIT Card"]
            exclude_keywords = ["Duplicate"]
            "#,
        )
        .unwrap();
        let m = CategoryMatcher::new(&registry).unwrap();
        assert!(m.matches("hall_ticket", "hall   ticket no 4411"));
        assert!(m.matches("hall_ticket", "ADMIT CARD"));
        assert!(!m.matches("hall_ticket", "DUPLICATE hall ticket"));
    }

    #[test]
    fn term_regex_handles_punctuated_terms() {
        assert!(term_regex("b.e").unwrap().is_match("Degree: B.E (CSE)"));
        assert!(!term_regex("b.e").unwrap().is_match("bye"));
        assert!(term_regex("pre-university").unwrap().is_match("Department of Pre-University Education"));
    }

    #[test]
    fn invalid_pattern_is_reported_with_category() {
        let registry = CategoryRegistry::new(vec![CategoryDescriptor {
            id: "broken".into(),
            label: "Broken".into(),
            kind: CategoryKind::Document,
            keywords: vec![],
            exclude_keywords: vec![],
            min_keyword_matches: 1,
            id_patterns: vec!["(unclosed".into()],
        }])
        .unwrap();
        let err = CategoryMatcher::new(&registry).err().unwrap();
        assert_eq!(err.0, "broken");
    }
}
