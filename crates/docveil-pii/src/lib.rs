//! Docveil PII Detection and Redaction
//!
//! This crate provides PII detection and document redaction:
//! - Aadhaar, PAN, phone number and email detection with post-match validation
//! - Whole-document scans listing the categories available to redact
//! - Per-page search-then-redact passes over any `DocumentHandle`

pub mod detector;
pub mod redactor;
pub mod scan;

pub use detector::{
    CategoryRegistry, CategorySpec, Detection, DetectionResult, PIICategory, PIIDetector,
    RegexPIIDetector, UnknownCategory, Validator,
};
pub use redactor::{
    CommitPolicy, DocumentRedactor, PageOutcome, RedactionOutcome, RedactionRequest,
    RedactorConfig,
};
pub use scan::{scan_document, scan_path};
