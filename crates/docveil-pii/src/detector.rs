//! PII detectors

mod regex_detector;
mod registry;

pub use regex_detector::RegexPIIDetector;
pub use registry::{CategoryRegistry, CategorySpec, Validator, aadhaar_not_followed_by_digit};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Categories of PII that can be detected
///
/// The set is closed. Ordering follows declaration order, which is also the
/// order categories are scanned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PIICategory {
    /// Aadhaar number: three space-separated groups of four digits
    Aadhaar,

    /// Permanent Account Number: `AAAAA9999A`
    #[serde(rename = "PAN")]
    Pan,

    /// Ten-digit phone number
    #[serde(alias = "Phone Number")]
    PhoneNumber,

    /// Email address
    Email,
}

impl PIICategory {
    /// All categories, in scan order
    pub const ALL: [PIICategory; 4] = [
        PIICategory::Aadhaar,
        PIICategory::Pan,
        PIICategory::PhoneNumber,
        PIICategory::Email,
    ];

    /// Stable identifier used in requests, configuration and output
    pub fn as_str(&self) -> &'static str {
        match self {
            PIICategory::Aadhaar => "Aadhaar",
            PIICategory::Pan => "PAN",
            PIICategory::PhoneNumber => "PhoneNumber",
            PIICategory::Email => "Email",
        }
    }
}

impl fmt::Display for PIICategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown PII category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for PIICategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // "Phone Number" is the label the upload form used
        if trimmed.eq_ignore_ascii_case("phone number") {
            return Ok(PIICategory::PhoneNumber);
        }

        PIICategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A single validated match with its position in the scanned text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Category of PII detected
    pub category: PIICategory,

    /// Start byte offset in the text
    pub start: usize,

    /// End byte offset in the text
    pub end: usize,

    /// The detected text
    pub text: String,
}

/// Validated literal matches per category
///
/// A category is present only when it has at least one validated match.
/// Values keep scan order and multiplicity: a literal occurring twice is
/// listed twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionResult {
    entries: Vec<(PIICategory, Vec<String>)>,
}

impl DetectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the matches for a category; empty match lists are dropped
    pub fn insert(&mut self, category: PIICategory, values: Vec<String>) {
        if values.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((category, values)),
        }
    }

    pub fn get(&self, category: PIICategory) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, values)| values.as_slice())
    }

    pub fn contains(&self, category: PIICategory) -> bool {
        self.get(category).is_some()
    }

    /// Categories with at least one match, in scan order
    pub fn categories(&self) -> Vec<PIICategory> {
        self.entries.iter().map(|(c, _)| *c).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PIICategory, &[String])> {
        self.entries.iter().map(|(c, values)| (*c, values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of categories present
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of matched values across all categories, duplicates included
    pub fn total_matches(&self) -> usize {
        self.entries.iter().map(|(_, values)| values.len()).sum()
    }
}

impl Serialize for DetectionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, values) in &self.entries {
            map.serialize_entry(category.as_str(), values)?;
        }
        map.end()
    }
}

/// Trait for detecting PII in text
pub trait PIIDetector: Send + Sync {
    /// Detect PII in the given text
    fn detect(&self, text: &str) -> DetectionResult;

    /// Detect PII and keep match positions
    fn detect_spans(&self, text: &str) -> Vec<Detection>;

    /// Get the categories this detector can find
    fn supported_categories(&self) -> Vec<PIICategory>;
}
