//! Document redaction

mod document_redactor;

pub use document_redactor::DocumentRedactor;

use crate::detector::{DetectionResult, PIICategory};
use docveil_core::RedactionFill;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// When marked regions on a page are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Commit after each literal value's regions are marked
    ///
    /// Later searches on the same page see the already-redacted text.
    #[default]
    PerValue,

    /// Mark every region on the page, then commit once
    ///
    /// All searches on a page run against the unredacted text. Only safe when
    /// the backend's search results stay valid while marks are pending.
    PerPage,
}

/// Configuration for document redaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedactorConfig {
    /// Commit discipline within a page
    #[serde(default)]
    pub commit_policy: CommitPolicy,

    /// Fill drawn over redacted regions
    #[serde(default)]
    pub fill: RedactionFill,
}

/// A caller's request to redact categories from one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionRequest {
    /// Source document
    pub input: PathBuf,

    /// Where the redacted document is written
    pub output: PathBuf,

    /// Category identifiers to redact
    pub categories: Vec<String>,
}

impl RedactionRequest {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Split requested identifiers into known categories and unknown names
    ///
    /// Unknown names never match anything; they are returned for reporting.
    pub fn resolve_categories(&self) -> (HashSet<PIICategory>, Vec<String>) {
        let mut known = HashSet::new();
        let mut unknown = Vec::new();

        for name in &self.categories {
            match name.parse::<PIICategory>() {
                Ok(category) => {
                    known.insert(category);
                }
                Err(_) => {
                    if !unknown.contains(name) {
                        unknown.push(name.clone());
                    }
                }
            }
        }

        (known, unknown)
    }
}

/// Result of redacting a single page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageOutcome {
    /// Zero-based page index
    pub page_index: usize,

    /// Requested categories detected in this page's text
    pub detected: DetectionResult,

    /// Regions marked for redaction
    pub marked: usize,

    /// Detected values that could not be located on the page
    pub unlocated: Vec<(PIICategory, String)>,
}

impl PageOutcome {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            ..Self::default()
        }
    }
}

/// Result of a full redaction pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RedactionOutcome {
    /// Number of pages visited
    pub pages_processed: usize,

    /// Per-page details, in document order
    pub pages: Vec<PageOutcome>,

    /// Regions marked per requested category
    pub marked_by_category: BTreeMap<PIICategory, usize>,

    /// Requested categories for which no region was marked anywhere
    pub categories_without_regions: Vec<PIICategory>,

    /// Requested identifiers that name no known category
    pub unknown_categories: Vec<String>,
}

impl RedactionOutcome {
    /// Total regions marked across the document
    pub fn total_marked(&self) -> usize {
        self.pages.iter().map(|page| page.marked).sum()
    }

    /// Every detected value that could not be located, with its page
    pub fn unlocated(&self) -> impl Iterator<Item = (usize, PIICategory, &str)> {
        self.pages.iter().flat_map(|page| {
            page.unlocated
                .iter()
                .map(move |(category, value)| (page.page_index, *category, value.as_str()))
        })
    }

    /// Pages on which at least one region was marked
    pub fn redacted_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|page| page.marked > 0)
            .map(|page| page.page_index)
            .collect()
    }
}

#[cfg(test)]
mod tests;
