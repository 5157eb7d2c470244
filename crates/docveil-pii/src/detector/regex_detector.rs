//! Regex-based PII detector implementation

use crate::detector::{CategoryRegistry, Detection, DetectionResult, PIICategory, PIIDetector};
use docveil_core::Result;
use std::sync::Arc;

/// Regex-based PII detector
///
/// Each registered category is scanned independently over the whole text.
/// A substring matching more than one category is reported under each.
#[derive(Debug, Clone)]
pub struct RegexPIIDetector {
    registry: Arc<CategoryRegistry>,
}

impl RegexPIIDetector {
    /// Create a detector over a shared category registry
    pub fn new(registry: Arc<CategoryRegistry>) -> Self {
        Self { registry }
    }

    /// Create a detector over every known category
    pub fn standard() -> Result<Self> {
        Ok(Self::new(Arc::new(CategoryRegistry::standard()?)))
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }
}

impl PIIDetector for RegexPIIDetector {
    fn detect(&self, text: &str) -> DetectionResult {
        let mut result = DetectionResult::new();

        for spec in self.registry.iter() {
            let values: Vec<String> = spec
                .pattern
                .find_iter(text)
                .filter(|m| spec.accepts(text, m.start(), m.end()))
                .map(|m| m.as_str().to_string())
                .collect();

            result.insert(spec.category, values);
        }

        result
    }

    fn detect_spans(&self, text: &str) -> Vec<Detection> {
        let mut detections = Vec::new();

        for spec in self.registry.iter() {
            for m in spec.pattern.find_iter(text) {
                if spec.accepts(text, m.start(), m.end()) {
                    detections.push(Detection {
                        category: spec.category,
                        start: m.start(),
                        end: m.end(),
                        text: m.as_str().to_string(),
                    });
                }
            }
        }

        detections
    }

    fn supported_categories(&self) -> Vec<PIICategory> {
        self.registry.categories()
    }
}
