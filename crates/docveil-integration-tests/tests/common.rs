//! Common test utilities for integration tests

use docveil_pii::{
    DocumentRedactor, RedactionOutcome, RedactionRequest, RedactorConfig, RegexPIIDetector,
};
use docveil_textdoc::{PAGE_BREAK, TextDocumentBackend};
use std::path::PathBuf;
use tempfile::TempDir;

/// A document written into its own temporary directory
#[allow(dead_code)]
pub struct Fixture {
    pub dir: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
}

#[allow(dead_code)]
impl Fixture {
    /// Write `pages` joined by form feeds to `<tmp>/input.txt`
    pub fn new(pages: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.txt");
        let output = dir.path().join("redacted_input.txt");
        std::fs::write(&input, pages.join(&PAGE_BREAK.to_string())).unwrap();

        Self { dir, input, output }
    }

    pub fn request(&self, categories: &[&str]) -> RedactionRequest {
        RedactionRequest::new(&self.input, &self.output, categories.iter().copied())
    }

    pub fn output_pages(&self) -> Vec<String> {
        std::fs::read_to_string(&self.output)
            .unwrap()
            .split(PAGE_BREAK)
            .map(str::to_string)
            .collect()
    }
}

/// Run a full redaction pass over the text backend
#[allow(dead_code)]
pub fn redact(
    request: &RedactionRequest,
    config: RedactorConfig,
) -> docveil_core::Result<RedactionOutcome> {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, config);
    redactor.redact(&TextDocumentBackend::new(), request)
}

#[allow(dead_code)]
pub fn masked(len: usize) -> String {
    docveil_textdoc::MASK_GLYPH.to_string().repeat(len)
}
