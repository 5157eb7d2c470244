//! Page-by-page search-then-redact pass

use crate::detector::{PIICategory, PIIDetector};
use crate::redactor::{
    CommitPolicy, PageOutcome, RedactionOutcome, RedactionRequest, RedactorConfig,
};
use docveil_core::{DocumentBackend, DocumentHandle, Rect, Result, ScopedDocument};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Redacts requested PII categories from documents
///
/// Each page is detected and redacted on its own: the page's extracted text
/// is scanned, and every accepted literal of a requested category is located
/// on that page and overlaid. Nothing carries over between pages.
pub struct DocumentRedactor<'a> {
    detector: &'a dyn PIIDetector,
    config: RedactorConfig,
}

impl<'a> DocumentRedactor<'a> {
    pub fn new(detector: &'a dyn PIIDetector, config: RedactorConfig) -> Self {
        Self { detector, config }
    }

    pub fn config(&self) -> &RedactorConfig {
        &self.config
    }

    /// Run a full pass: open the input, redact, save to the output
    ///
    /// The handle is closed exactly once whatever happens. An error while
    /// redacting aborts the pass before anything is saved.
    pub fn redact(
        &self,
        backend: &dyn DocumentBackend,
        request: &RedactionRequest,
    ) -> Result<RedactionOutcome> {
        let (categories, unknown) = request.resolve_categories();
        for name in &unknown {
            warn!("Ignoring unknown category '{}'", name);
        }

        info!(
            "Redacting {:?} from {} into {}",
            request.categories,
            request.input.display(),
            request.output.display()
        );

        let mut doc = ScopedDocument::open(backend, &request.input)?;
        let mut outcome = self.redact_document(doc.handle_mut(), &categories)?;
        outcome.unknown_categories = unknown;

        doc.handle_mut().save(&request.output)?;
        doc.close()?;

        info!(
            "Redaction complete: {} regions marked over {} pages",
            outcome.total_marked(),
            outcome.pages_processed
        );

        Ok(outcome)
    }

    /// Redact `categories` from every page of an open document
    pub fn redact_document(
        &self,
        doc: &mut dyn DocumentHandle,
        categories: &HashSet<PIICategory>,
    ) -> Result<RedactionOutcome> {
        let page_count = doc.page_count()?;
        let mut outcome = RedactionOutcome::default();

        for &category in categories {
            outcome.marked_by_category.insert(category, 0);
        }

        for page_index in 0..page_count {
            let page =
                self.redact_page(doc, page_index, categories, &mut outcome.marked_by_category)?;
            debug!(
                "Page {}: {} requested value(s) detected, {} region(s) marked",
                page_index,
                page.detected.total_matches(),
                page.marked
            );

            outcome.pages.push(page);
            outcome.pages_processed += 1;
        }

        outcome.categories_without_regions = outcome
            .marked_by_category
            .iter()
            .filter(|(_, marked)| **marked == 0)
            .map(|(category, _)| *category)
            .collect();

        Ok(outcome)
    }

    fn redact_page(
        &self,
        doc: &mut dyn DocumentHandle,
        page_index: usize,
        categories: &HashSet<PIICategory>,
        tally: &mut BTreeMap<PIICategory, usize>,
    ) -> Result<PageOutcome> {
        let text = doc.page_text(page_index)?;
        let detected = self.detector.detect(&text);
        let mut page = PageOutcome::new(page_index);

        // (category, rect) pairs already marked on this page
        let mut marked: Vec<(PIICategory, Rect)> = Vec::new();
        let mut located: HashSet<(PIICategory, &str)> = HashSet::new();

        for (category, values) in detected.iter() {
            if !categories.contains(&category) {
                continue;
            }
            page.detected.insert(category, values.to_vec());

            for value in values {
                let regions = doc.search_text(page_index, value)?;
                debug!(
                    "Page {}: {} value located in {} region(s)",
                    page_index,
                    category,
                    regions.len()
                );

                if regions.is_empty() {
                    // A repeated value may already be gone after an earlier commit
                    if !located.contains(&(category, value.as_str()))
                        && !page
                            .unlocated
                            .iter()
                            .any(|(c, v)| *c == category && v == value)
                    {
                        warn!(
                            "Page {}: detected {} value could not be located",
                            page_index, category
                        );
                        page.unlocated.push((category, value.clone()));
                    }
                    continue;
                }
                located.insert((category, value.as_str()));

                let mut newly_marked = 0;
                for region in &regions {
                    if marked.contains(&(category, region.rect)) {
                        continue;
                    }
                    doc.mark_redaction(page_index, region.rect, self.config.fill)?;
                    marked.push((category, region.rect));
                    newly_marked += 1;
                }
                page.marked += newly_marked;
                *tally.entry(category).or_default() += newly_marked;

                if self.config.commit_policy == CommitPolicy::PerValue && newly_marked > 0 {
                    doc.commit_redactions(page_index)?;
                }
            }
        }

        if self.config.commit_policy == CommitPolicy::PerPage && page.marked > 0 {
            doc.commit_redactions(page_index)?;
        }

        Ok(page)
    }
}
