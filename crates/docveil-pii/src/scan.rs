//! Whole-document scans
//!
//! A scan answers "which categories are available to redact in this
//! document". It runs the detector once over the text of all pages. The
//! redactor never reuses a scan result: it detects again on each page's text.

use crate::detector::{DetectionResult, PIIDetector};
use docveil_core::{DocumentBackend, DocumentHandle, Result, ScopedDocument};
use std::path::Path;
use tracing::{debug, info};

/// Detect PII across the concatenated text of every page
///
/// Pages are joined with a newline so that a value at the end of one page
/// and a value at the start of the next never merge into one token.
pub fn scan_document(
    detector: &dyn PIIDetector,
    doc: &dyn DocumentHandle,
) -> Result<DetectionResult> {
    let page_count = doc.page_count()?;
    let mut pages = Vec::with_capacity(page_count);

    for page_index in 0..page_count {
        pages.push(doc.page_text(page_index)?);
    }
    debug!("Scanning {} page(s)", page_count);

    Ok(detector.detect(&pages.join("\n")))
}

/// Open `path`, scan it, and close it again
pub fn scan_path(
    detector: &dyn PIIDetector,
    backend: &dyn DocumentBackend,
    path: &Path,
) -> Result<DetectionResult> {
    let doc = ScopedDocument::open(backend, path)?;
    let result = scan_document(detector, doc.handle())?;
    doc.close()?;

    info!(
        "Scanned {}: {} categories available ({:?})",
        path.display(),
        result.len(),
        result.categories()
    );

    Ok(result)
}
