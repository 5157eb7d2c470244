//! Tests for document redaction

use super::*;
use crate::detector::RegexPIIDetector;
use docveil_core::{DocumentBackend, DocumentHandle, Error, PageRegion, Rect, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    PageText(usize),
    Search(usize, String),
    Mark(usize, Rect, RedactionFill),
    Commit(usize),
    Save,
    Close,
}

#[derive(Default)]
struct Shared {
    calls: Vec<Call>,
    saved: Option<Vec<String>>,
}

/// In-memory paged document with a one-cell-per-character grid
///
/// Committing a region overwrites its characters, so later searches no
/// longer see them.
struct MemoryDocument {
    pages: Vec<String>,
    pending: Vec<(usize, Rect)>,
    hidden: Vec<String>,
    fail_page_text_at: Option<usize>,
    fail_save: bool,
    shared: Arc<Mutex<Shared>>,
}

impl MemoryDocument {
    fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            pending: Vec::new(),
            hidden: Vec::new(),
            fail_page_text_at: None,
            fail_save: false,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    fn record(&self, call: Call) {
        self.shared.lock().unwrap().calls.push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.shared.lock().unwrap().calls.clone()
    }

    fn check_page(&self, page_index: usize) -> Result<()> {
        if page_index >= self.pages.len() {
            return Err(Error::PageOutOfRange {
                index: page_index,
                count: self.pages.len(),
            });
        }
        Ok(())
    }
}

impl DocumentHandle for MemoryDocument {
    fn page_count(&self) -> Result<usize> {
        Ok(self.pages.len())
    }

    fn page_text(&self, page_index: usize) -> Result<String> {
        self.check_page(page_index)?;
        self.record(Call::PageText(page_index));
        if self.fail_page_text_at == Some(page_index) {
            return Err(Error::Io(std::io::Error::other("extraction failed")));
        }
        Ok(self.pages[page_index].clone())
    }

    fn search_text(&self, page_index: usize, literal: &str) -> Result<Vec<PageRegion>> {
        self.check_page(page_index)?;
        self.record(Call::Search(page_index, literal.to_string()));
        if self.hidden.iter().any(|h| h == literal) {
            return Ok(Vec::new());
        }

        let mut regions = Vec::new();
        for (line_no, line) in self.pages[page_index].lines().enumerate() {
            for (offset, _) in line.match_indices(literal) {
                let col = line[..offset].chars().count() as f32;
                let width = literal.chars().count() as f32;
                regions.push(PageRegion {
                    page_index,
                    rect: Rect::new(col, line_no as f32, col + width, line_no as f32 + 1.0),
                    value: literal.to_string(),
                });
            }
        }
        Ok(regions)
    }

    fn mark_redaction(&mut self, page_index: usize, rect: Rect, fill: RedactionFill) -> Result<()> {
        self.check_page(page_index)?;
        self.record(Call::Mark(page_index, rect, fill));
        self.pending.push((page_index, rect));
        Ok(())
    }

    fn commit_redactions(&mut self, page_index: usize) -> Result<usize> {
        self.check_page(page_index)?;
        self.record(Call::Commit(page_index));

        let (ours, rest): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|(page, _)| *page == page_index);
        self.pending = rest;

        let lines: Vec<String> = self.pages[page_index]
            .lines()
            .enumerate()
            .map(|(line_no, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, c)| {
                        let covered = ours.iter().any(|(_, r)| {
                            r.y0 as usize == line_no
                                && col >= r.x0 as usize
                                && col < r.x1 as usize
                        });
                        if covered { '#' } else { c }
                    })
                    .collect()
            })
            .collect();
        self.pages[page_index] = lines.join("\n");

        Ok(ours.len())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.record(Call::Save);
        if self.fail_save {
            return Err(Error::DocumentWrite {
                path: path.to_path_buf(),
                reason: "read-only destination".to_string(),
            });
        }
        self.shared.lock().unwrap().saved = Some(self.pages.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.record(Call::Close);
        Ok(())
    }
}

/// Hands out a pre-built `MemoryDocument` once
struct MemoryBackend {
    doc: Mutex<Option<MemoryDocument>>,
}

impl MemoryBackend {
    fn new(doc: MemoryDocument) -> Self {
        Self {
            doc: Mutex::new(Some(doc)),
        }
    }
}

impl DocumentBackend for MemoryBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>> {
        match self.doc.lock().unwrap().take() {
            Some(doc) => Ok(Box::new(doc)),
            None => Err(Error::DocumentOpen {
                path: path.to_path_buf(),
                reason: "no such document".to_string(),
            }),
        }
    }
}

fn set(categories: &[PIICategory]) -> HashSet<PIICategory> {
    categories.iter().copied().collect()
}

fn marks(calls: &[Call]) -> Vec<(usize, Rect)> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::Mark(page, rect, _) => Some((*page, *rect)),
            _ => None,
        })
        .collect()
}

fn searched(calls: &[Call]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::Search(_, literal) => Some(literal.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_commit_policy_default_and_serialization() {
    assert_eq!(CommitPolicy::default(), CommitPolicy::PerValue);
    assert_eq!(
        serde_json::to_string(&CommitPolicy::PerPage).unwrap(),
        "\"per_page\""
    );
    let policy: CommitPolicy = serde_json::from_str("\"per_value\"").unwrap();
    assert_eq!(policy, CommitPolicy::PerValue);
}

#[test]
fn test_redactor_config_default() {
    let config = RedactorConfig::default();
    assert_eq!(config.commit_policy, CommitPolicy::PerValue);
    assert_eq!(config.fill, RedactionFill::BLACK);

    let parsed: RedactorConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_request_resolves_categories() {
    let request = RedactionRequest::new(
        "in.txt",
        "out.txt",
        ["PAN", "email", "Passport", "Phone Number", "Passport"],
    );
    let (known, unknown) = request.resolve_categories();

    assert_eq!(
        known,
        set(&[PIICategory::Pan, PIICategory::Email, PIICategory::PhoneNumber])
    );
    assert_eq!(unknown, vec!["Passport".to_string()]);
}

#[test]
fn test_only_requested_category_is_marked() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["a@example.com b@example.org ABCDE1234F"]);

    let outcome = redactor
        .redact_document(&mut doc, &set(&[PIICategory::Pan]))
        .unwrap();

    let calls = doc.calls();
    assert_eq!(marks(&calls), vec![(0, Rect::new(28.0, 0.0, 38.0, 1.0))]);
    assert_eq!(searched(&calls), vec!["ABCDE1234F".to_string()]);
    assert_eq!(outcome.total_marked(), 1);
    assert_eq!(doc.pages[0], "a@example.com b@example.org ##########");
}

#[test]
fn test_unrequested_category_never_located() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["jane@example.com 9876543210"]);

    let outcome = redactor
        .redact_document(&mut doc, &set(&[PIICategory::PhoneNumber]))
        .unwrap();

    let calls = doc.calls();
    assert!(!searched(&calls).iter().any(|s| s.contains('@')));
    assert!(!outcome.pages[0].detected.contains(PIICategory::Email));
    assert_eq!(
        outcome.pages[0].detected.get(PIICategory::PhoneNumber).unwrap(),
        &["9876543210".to_string()]
    );
}

#[test]
fn test_pages_redacted_independently() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&[
        "Page one: call 9876543210",
        "Page two: nothing to see",
        "Page three\nstill 9876543210",
    ]);

    let outcome = redactor
        .redact_document(&mut doc, &set(&[PIICategory::PhoneNumber]))
        .unwrap();

    assert_eq!(outcome.pages_processed, 3);
    assert_eq!(outcome.redacted_pages(), vec![0, 2]);
    assert!(outcome.pages[1].detected.is_empty());
    assert_eq!(outcome.pages[1].marked, 0);

    let mark_pages: Vec<usize> = marks(&doc.calls()).iter().map(|(p, _)| *p).collect();
    assert_eq!(mark_pages, vec![0, 2]);
    assert_eq!(
        marks(&doc.calls())[1].1,
        Rect::new(6.0, 1.0, 16.0, 2.0)
    );
    assert_eq!(outcome.marked_by_category[&PIICategory::PhoneNumber], 2);
}

#[test]
fn test_pages_processed_in_order() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["ABCDE1234F", "", "ZZZZZ9999Z"]);

    redactor
        .redact_document(&mut doc, &set(&[PIICategory::Pan]))
        .unwrap();

    let page_reads: Vec<usize> = doc
        .calls()
        .iter()
        .filter_map(|call| match call {
            Call::PageText(page) => Some(*page),
            _ => None,
        })
        .collect();
    assert_eq!(page_reads, vec![0, 1, 2]);
}

#[test]
fn test_per_value_commit_sequencing() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["ABCDE1234F and a@example.com"]);

    redactor
        .redact_document(&mut doc, &set(&[PIICategory::Pan, PIICategory::Email]))
        .unwrap();

    let fill = RedactionFill::BLACK;
    assert_eq!(
        doc.calls(),
        vec![
            Call::PageText(0),
            Call::Search(0, "ABCDE1234F".into()),
            Call::Mark(0, Rect::new(0.0, 0.0, 10.0, 1.0), fill),
            Call::Commit(0),
            Call::Search(0, "a@example.com".into()),
            Call::Mark(0, Rect::new(15.0, 0.0, 28.0, 1.0), fill),
            Call::Commit(0),
        ]
    );
}

#[test]
fn test_per_page_commit_sequencing() {
    let detector = RegexPIIDetector::standard().unwrap();
    let config = RedactorConfig {
        commit_policy: CommitPolicy::PerPage,
        fill: RedactionFill(10, 20, 30),
    };
    let redactor = DocumentRedactor::new(&detector, config);
    let mut doc = MemoryDocument::new(&["ABCDE1234F and a@example.com", "no pii"]);

    redactor
        .redact_document(&mut doc, &set(&[PIICategory::Pan, PIICategory::Email]))
        .unwrap();

    let fill = RedactionFill(10, 20, 30);
    assert_eq!(
        doc.calls(),
        vec![
            Call::PageText(0),
            Call::Search(0, "ABCDE1234F".into()),
            Call::Mark(0, Rect::new(0.0, 0.0, 10.0, 1.0), fill),
            Call::Search(0, "a@example.com".into()),
            Call::Mark(0, Rect::new(15.0, 0.0, 28.0, 1.0), fill),
            Call::Commit(0),
            Call::PageText(1),
        ]
    );
}

#[test]
fn test_duplicate_values_marked_once_per_region() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["9876543210 or 9876543210"]);

    let outcome = redactor
        .redact_document(&mut doc, &set(&[PIICategory::PhoneNumber]))
        .unwrap();

    let calls = doc.calls();
    // Both occurrences are looked up; the second lookup finds nothing left
    assert_eq!(searched(&calls).len(), 2);
    assert_eq!(marks(&calls).len(), 2);
    assert_eq!(outcome.pages[0].marked, 2);
    assert!(outcome.pages[0].unlocated.is_empty());
    assert_eq!(doc.pages[0], "########## or ##########");
}

#[test]
fn test_duplicate_values_with_per_page_commit() {
    let detector = RegexPIIDetector::standard().unwrap();
    let config = RedactorConfig {
        commit_policy: CommitPolicy::PerPage,
        ..RedactorConfig::default()
    };
    let redactor = DocumentRedactor::new(&detector, config);
    let mut doc = MemoryDocument::new(&["9876543210 or 9876543210"]);

    let outcome = redactor
        .redact_document(&mut doc, &set(&[PIICategory::PhoneNumber]))
        .unwrap();

    let calls = doc.calls();
    assert_eq!(marks(&calls).len(), 2);
    assert_eq!(
        calls.iter().filter(|c| matches!(c, Call::Commit(_))).count(),
        1
    );
    assert_eq!(outcome.pages[0].marked, 2);
}

#[test]
fn test_unlocated_value_is_reported() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["PAN ABCDE1234F phone 9876543210"]);
    doc.hidden.push("ABCDE1234F".to_string());

    let outcome = redactor
        .redact_document(&mut doc, &set(&[PIICategory::Pan, PIICategory::PhoneNumber]))
        .unwrap();

    assert_eq!(
        outcome.pages[0].unlocated,
        vec![(PIICategory::Pan, "ABCDE1234F".to_string())]
    );
    assert_eq!(
        outcome.unlocated().collect::<Vec<_>>(),
        vec![(0, PIICategory::Pan, "ABCDE1234F")]
    );
    assert_eq!(outcome.categories_without_regions, vec![PIICategory::Pan]);
    assert_eq!(outcome.marked_by_category[&PIICategory::PhoneNumber], 1);
    assert_eq!(doc.pages[0], "PAN ABCDE1234F phone ##########");
}

#[test]
fn test_requested_category_without_matches_is_skipped() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["nothing sensitive here"]);

    let outcome = redactor
        .redact_document(&mut doc, &set(&[PIICategory::Aadhaar]))
        .unwrap();

    assert_eq!(outcome.total_marked(), 0);
    assert_eq!(outcome.categories_without_regions, vec![PIICategory::Aadhaar]);
    assert!(
        !doc.calls()
            .iter()
            .any(|c| matches!(c, Call::Search(..) | Call::Commit(_)))
    );
}

#[test]
fn test_overlapping_categories_marked_independently() {
    let detector = RegexPIIDetector::standard().unwrap();
    let config = RedactorConfig {
        commit_policy: CommitPolicy::PerPage,
        ..RedactorConfig::default()
    };
    let redactor = DocumentRedactor::new(&detector, config);
    let mut doc = MemoryDocument::new(&["sms 9876543210@sms.example.com"]);

    let outcome = redactor
        .redact_document(
            &mut doc,
            &set(&[PIICategory::PhoneNumber, PIICategory::Email]),
        )
        .unwrap();

    assert_eq!(outcome.marked_by_category[&PIICategory::PhoneNumber], 1);
    assert_eq!(outcome.marked_by_category[&PIICategory::Email], 1);
    let rects = marks(&doc.calls());
    assert!(rects[0].1.intersects(&rects[1].1));
    assert_eq!(doc.pages[0], format!("sms {}", "#".repeat(26)));
}

#[test]
fn test_per_value_commit_hides_overlapping_literal() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["sms 9876543210@sms.example.com"]);

    let outcome = redactor
        .redact_document(
            &mut doc,
            &set(&[PIICategory::PhoneNumber, PIICategory::Email]),
        )
        .unwrap();

    // The phone number is committed first, so the email no longer matches
    assert_eq!(outcome.marked_by_category[&PIICategory::PhoneNumber], 1);
    assert_eq!(outcome.marked_by_category[&PIICategory::Email], 0);
    assert_eq!(
        outcome.pages[0].unlocated,
        vec![(PIICategory::Email, "9876543210@sms.example.com".to_string())]
    );
    assert_eq!(doc.pages[0], "sms ##########@sms.example.com");
}

#[test]
fn test_redact_full_pass_saves_and_closes() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let doc = MemoryDocument::new(&[
        "Contact: jane.doe@example.com, PAN ABCDE1234F, phone 9876543210",
    ]);
    let shared = doc.shared.clone();
    let backend = MemoryBackend::new(doc);

    let request = RedactionRequest::new("in.txt", "out.txt", ["Email", "PAN", "Passport"]);
    let outcome = redactor.redact(&backend, &request).unwrap();

    assert_eq!(outcome.unknown_categories, vec!["Passport".to_string()]);
    assert_eq!(outcome.total_marked(), 2);

    let shared = shared.lock().unwrap();
    assert_eq!(
        shared.saved.as_ref().unwrap()[0],
        format!(
            "Contact: {}, PAN {}, phone 9876543210",
            "#".repeat(20),
            "#".repeat(10)
        )
    );
    let tail: Vec<&Call> = shared.calls.iter().rev().take(2).collect();
    assert_eq!(tail, vec![&Call::Close, &Call::Save]);
    assert_eq!(
        shared.calls.iter().filter(|c| **c == Call::Close).count(),
        1
    );
}

#[test]
fn test_redact_open_failure() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let backend = MemoryBackend {
        doc: Mutex::new(None),
    };

    let request = RedactionRequest::new("missing.txt", "out.txt", ["PAN"]);
    let err = redactor.redact(&backend, &request).unwrap_err();
    assert!(err.is_open_failure());
}

#[test]
fn test_redact_aborts_without_saving_on_page_error() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["ABCDE1234F", "ZZZZZ9999Z"]);
    doc.fail_page_text_at = Some(1);
    let shared = doc.shared.clone();
    let backend = MemoryBackend::new(doc);

    let request = RedactionRequest::new("in.txt", "out.txt", ["PAN"]);
    assert!(redactor.redact(&backend, &request).is_err());

    let shared = shared.lock().unwrap();
    assert!(shared.saved.is_none());
    assert!(!shared.calls.contains(&Call::Save));
    assert_eq!(
        shared.calls.iter().filter(|c| **c == Call::Close).count(),
        1
    );
}

#[test]
fn test_redact_write_failure_still_closes() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["ABCDE1234F"]);
    doc.fail_save = true;
    let shared = doc.shared.clone();
    let backend = MemoryBackend::new(doc);

    let request = RedactionRequest::new("in.txt", "/read-only/out.txt", ["PAN"]);
    let err = redactor.redact(&backend, &request).unwrap_err();
    assert!(err.is_write_failure());

    let shared = shared.lock().unwrap();
    assert_eq!(
        shared.calls.iter().filter(|c| **c == Call::Close).count(),
        1
    );
}

#[test]
fn test_outcome_serialization() {
    let detector = RegexPIIDetector::standard().unwrap();
    let redactor = DocumentRedactor::new(&detector, RedactorConfig::default());
    let mut doc = MemoryDocument::new(&["ABCDE1234F"]);

    let outcome = redactor
        .redact_document(&mut doc, &set(&[PIICategory::Pan]))
        .unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["pages_processed"], 1);
    assert_eq!(json["marked_by_category"]["PAN"], 1);
    assert_eq!(json["pages"][0]["detected"]["PAN"][0], "ABCDE1234F");
}
