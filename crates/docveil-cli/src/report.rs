//! Human- and machine-readable command output

use docveil_pii::{DetectionResult, PIICategory, RedactionOutcome, RedactionRequest};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

/// Categories available to redact from a scanned document
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub input: String,
    pub categories: Vec<PIICategory>,
    pub counts: BTreeMap<PIICategory, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<DetectionResult>,
}

impl ScanReport {
    pub fn new(input: &Path, result: &DetectionResult, show_values: bool) -> Self {
        Self {
            input: input.display().to_string(),
            categories: result.categories(),
            counts: result
                .iter()
                .map(|(category, values)| (category, values.len()))
                .collect(),
            values: show_values.then(|| result.clone()),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.categories.is_empty() {
            let _ = writeln!(out, "No PII detected in {}", self.input);
            return out;
        }

        let _ = writeln!(out, "PII detected in {}:", self.input);
        for category in &self.categories {
            let count = self.counts.get(category).copied().unwrap_or_default();
            let _ = writeln!(out, "  {:<12} {}", category.as_str(), count);
            if let Some(values) = self.values.as_ref().and_then(|v| v.get(*category)) {
                for value in values {
                    let _ = writeln!(out, "    {}", value);
                }
            }
        }
        out
    }
}

/// Value-free summary of a redaction pass for `redact --json`
#[derive(Debug, Serialize)]
pub struct RedactReport {
    pub input: String,
    pub output: String,
    pub pages_processed: usize,
    pub total_marked: usize,
    pub marked_by_category: BTreeMap<PIICategory, usize>,
    pub pages: Vec<PageReport>,
    pub categories_without_regions: Vec<PIICategory>,
    pub unknown_categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<PageValues>>,
}

#[derive(Debug, Serialize)]
pub struct PageReport {
    pub page_index: usize,
    pub detected: BTreeMap<PIICategory, usize>,
    pub marked: usize,
    pub unlocated: Vec<PIICategory>,
}

/// Matched literals for one page, only emitted with `--show-values`
#[derive(Debug, Serialize)]
pub struct PageValues {
    pub page_index: usize,
    pub detected: DetectionResult,
    pub unlocated: Vec<(PIICategory, String)>,
}

impl RedactReport {
    pub fn new(request: &RedactionRequest, outcome: &RedactionOutcome, show_values: bool) -> Self {
        let pages = outcome
            .pages
            .iter()
            .map(|page| PageReport {
                page_index: page.page_index,
                detected: page
                    .detected
                    .iter()
                    .map(|(category, values)| (category, values.len()))
                    .collect(),
                marked: page.marked,
                unlocated: page.unlocated.iter().map(|(category, _)| *category).collect(),
            })
            .collect();

        let values = show_values.then(|| {
            outcome
                .pages
                .iter()
                .map(|page| PageValues {
                    page_index: page.page_index,
                    detected: page.detected.clone(),
                    unlocated: page.unlocated.clone(),
                })
                .collect()
        });

        Self {
            input: request.input.display().to_string(),
            output: request.output.display().to_string(),
            pages_processed: outcome.pages_processed,
            total_marked: outcome.total_marked(),
            marked_by_category: outcome.marked_by_category.clone(),
            pages,
            categories_without_regions: outcome.categories_without_regions.clone(),
            unknown_categories: outcome.unknown_categories.clone(),
            values,
        }
    }
}

pub fn render_outcome(request: &RedactionRequest, outcome: &RedactionOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Redacted {} region(s) across {} page(s) -> {}",
        outcome.total_marked(),
        outcome.pages_processed,
        request.output.display()
    );

    for (category, marked) in &outcome.marked_by_category {
        let _ = writeln!(out, "  {:<12} {}", category.as_str(), marked);
    }

    for (page_index, category, _) in outcome.unlocated() {
        let _ = writeln!(
            out,
            "warning: a detected {} value on page {} could not be located",
            category,
            page_index + 1
        );
    }
    if !outcome.categories_without_regions.is_empty() {
        let names: Vec<&str> = outcome
            .categories_without_regions
            .iter()
            .map(PIICategory::as_str)
            .collect();
        let _ = writeln!(out, "note: nothing redacted for {}", names.join(", "));
    }
    if !outcome.unknown_categories.is_empty() {
        let _ = writeln!(
            out,
            "note: unknown categories ignored: {}",
            outcome.unknown_categories.join(", ")
        );
    }
    out
}
