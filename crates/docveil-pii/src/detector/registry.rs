//! Fixed registry of PII categories, their patterns and validators

use crate::detector::PIICategory;
use docveil_core::Result;
use once_cell::sync::Lazy;
use regex::Regex;

/// Optional whitespace then a decimal digit (Unicode `Nd`)
static DIGIT_AHEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A\s*\d").unwrap());

/// Post-match check: `(text, match_start, match_end) -> accepted`
pub type Validator = fn(&str, usize, usize) -> bool;

/// Recognition rule for one category
#[derive(Debug, Clone)]
pub struct CategorySpec {
    pub category: PIICategory,
    pub pattern: Regex,
    pub validator: Option<Validator>,
}

impl CategorySpec {
    /// Whether a raw pattern match passes this category's validator
    pub fn accepts(&self, text: &str, start: usize, end: usize) -> bool {
        self.validator
            .is_none_or(|validate| validate(text, start, end))
    }
}

/// Immutable category registry, built once and shared by reference
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    specs: Vec<CategorySpec>,
}

impl CategoryRegistry {
    /// Registry holding every known category
    pub fn standard() -> Result<Self> {
        Self::with_categories(&PIICategory::ALL)
    }

    /// Registry restricted to the given categories
    ///
    /// Specs are kept in scan order regardless of the order requested.
    pub fn with_categories(categories: &[PIICategory]) -> Result<Self> {
        let mut specs = Vec::new();
        for category in PIICategory::ALL {
            if categories.contains(&category) {
                specs.push(Self::spec_for(category)?);
            }
        }
        Ok(Self { specs })
    }

    fn spec_for(category: PIICategory) -> Result<CategorySpec> {
        let (pattern, validator): (&str, Option<Validator>) = match category {
            // 1234 5678 9012
            PIICategory::Aadhaar => (
                r"\b\d{4}\s\d{4}\s\d{4}\b",
                Some(aadhaar_not_followed_by_digit as Validator),
            ),
            // ABCDE1234F
            PIICategory::Pan => (r"\b[A-Z]{5}\d{4}[A-Z]\b", None),
            PIICategory::PhoneNumber => (r"\b\d{10}\b", None),
            PIICategory::Email => (r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}", None),
        };

        Ok(CategorySpec {
            category,
            pattern: Regex::new(pattern)?,
            validator,
        })
    }

    pub fn get(&self, category: PIICategory) -> Option<&CategorySpec> {
        self.specs.iter().find(|spec| spec.category == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategorySpec> {
        self.specs.iter()
    }

    pub fn categories(&self) -> Vec<PIICategory> {
        self.specs.iter().map(|spec| spec.category).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Reject an Aadhaar candidate whose next non-whitespace character is a digit
///
/// Such a match is a 4-4-4 slice of a longer digit run (e.g. a 16-digit card
/// number printed in groups), not a standalone Aadhaar number.
pub fn aadhaar_not_followed_by_digit(text: &str, _start: usize, end: usize) -> bool {
    !DIGIT_AHEAD.is_match(text.get(end..).unwrap_or_default())
}
