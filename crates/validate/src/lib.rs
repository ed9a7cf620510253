//! The rejection cascade: file signature, resolution, extraction, heuristic
//! rules, academic scoring and category matching, in that order.

pub mod category;
pub mod engine;
pub mod keywords;
pub mod rules;
pub mod signature;

pub use category::CategoryMatcher;
pub use engine::{check_signature, ValidateError, ValidationEngine};
pub use keywords::{academic_matches, ACADEMIC_KEYWORDS};
pub use rules::{rejection_rules, Rule, RuleContext};
pub use signature::sniff_format;
