//! Text document backend

use crate::atomic_writer::AtomicWriter;
use docveil_core::{
    DocumentBackend, DocumentHandle, Error, PageRegion, Rect, RedactionFill, Result,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Separator between pages in a text document
pub const PAGE_BREAK: char = '\u{000C}';

/// Glyph written over every redacted character cell
pub const MASK_GLYPH: char = '\u{2588}';

/// Opens UTF-8 text files as paged documents
#[derive(Debug, Clone, Default)]
pub struct TextDocumentBackend;

impl TextDocumentBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentBackend for TextDocumentBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>> {
        Ok(Box::new(TextDocument::open(path)?))
    }
}

#[derive(Debug, Clone)]
struct PendingMark {
    page_index: usize,
    rect: Rect,
    fill: RedactionFill,
}

/// An open text document
#[derive(Debug)]
pub struct TextDocument {
    path: PathBuf,
    pages: Vec<String>,
    pending: Vec<PendingMark>,
    closed: bool,
}

impl TextDocument {
    /// Read and split a text document
    ///
    /// # Errors
    /// - `Error::DocumentOpen` if the file is missing, is a directory, or is not UTF-8
    pub fn open(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::DocumentOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self::from_text(path, &contents))
    }

    /// Build a document from in-memory text
    pub fn from_text(path: impl Into<PathBuf>, contents: &str) -> Self {
        let pages: Vec<String> = contents.split(PAGE_BREAK).map(str::to_string).collect();
        let path = path.into();
        debug!("Opened {} with {} page(s)", path.display(), pages.len());

        Self {
            path,
            pages,
            pending: Vec::new(),
            closed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents, pages joined by form feeds
    pub fn contents(&self) -> String {
        let mut joined = String::new();
        for (i, page) in self.pages.iter().enumerate() {
            if i > 0 {
                joined.push(PAGE_BREAK);
            }
            joined.push_str(page);
        }
        joined
    }

    /// Marks queued but not yet committed
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::DocumentClosed);
        }
        Ok(())
    }

    fn page(&self, page_index: usize) -> Result<&str> {
        self.ensure_open()?;
        self.pages
            .get(page_index)
            .map(String::as_str)
            .ok_or(Error::PageOutOfRange {
                index: page_index,
                count: self.pages.len(),
            })
    }
}

/// Locate every occurrence of `literal` in `page` as grid rectangles
///
/// Occurrences are found left to right without overlap. An occurrence that
/// spans line breaks yields one rectangle per non-empty line segment.
fn locate(page: &str, page_index: usize, literal: &str) -> Vec<PageRegion> {
    let mut regions = Vec::new();
    if literal.is_empty() {
        return regions;
    }

    for (offset, _) in page.match_indices(literal) {
        let before = &page[..offset];
        let mut line = before.matches('\n').count();
        let mut col = before.rsplit('\n').next().unwrap_or_default().chars().count();

        for (i, segment) in literal.split('\n').enumerate() {
            if i > 0 {
                line += 1;
                col = 0;
            }
            let width = segment.chars().count();
            if width == 0 {
                continue;
            }
            regions.push(PageRegion {
                page_index,
                rect: Rect::new(
                    col as f32,
                    line as f32,
                    (col + width) as f32,
                    (line + 1) as f32,
                ),
                value: literal.to_string(),
            });
        }
    }

    regions
}

/// Overwrite every character cell covered by `rects`
fn mask(page: &str, rects: &[Rect]) -> String {
    page.split('\n')
        .enumerate()
        .map(|(line_no, line)| {
            let row = line_no as f32;
            line.chars()
                .enumerate()
                .map(|(col, c)| {
                    let cell = Rect::new(col as f32, row, col as f32 + 1.0, row + 1.0);
                    // Keep carriage returns so line endings survive
                    if c != '\r' && rects.iter().any(|r| r.intersects(&cell)) {
                        MASK_GLYPH
                    } else {
                        c
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl DocumentHandle for TextDocument {
    fn page_count(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.pages.len())
    }

    fn page_text(&self, page_index: usize) -> Result<String> {
        self.page(page_index).map(str::to_string)
    }

    fn search_text(&self, page_index: usize, literal: &str) -> Result<Vec<PageRegion>> {
        let page = self.page(page_index)?;
        Ok(locate(page, page_index, literal))
    }

    fn mark_redaction(
        &mut self,
        page_index: usize,
        rect: Rect,
        fill: RedactionFill,
    ) -> Result<()> {
        self.page(page_index)?;
        self.pending.push(PendingMark {
            page_index,
            rect,
            fill,
        });
        Ok(())
    }

    fn commit_redactions(&mut self, page_index: usize) -> Result<usize> {
        self.page(page_index)?;

        let (ours, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|mark| mark.page_index == page_index);
        self.pending = rest;

        if ours.is_empty() {
            return Ok(0);
        }

        if ours.iter().any(|mark| mark.fill != RedactionFill::BLACK) {
            debug!("Text pages render every fill as {}", MASK_GLYPH);
        }

        let rects: Vec<Rect> = ours.iter().map(|mark| mark.rect).collect();
        self.pages[page_index] = mask(&self.pages[page_index], &rects);
        debug!("Page {}: applied {} redaction(s)", page_index, rects.len());

        Ok(rects.len())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.ensure_open()?;
        if !self.pending.is_empty() {
            warn!(
                "Saving {} with {} uncommitted redaction(s); they are not applied",
                path.display(),
                self.pending.len()
            );
        }

        let write_error = |e: std::io::Error| Error::DocumentWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut writer = AtomicWriter::new(path).map_err(write_error)?;
        writer
            .write(self.contents().as_bytes())
            .map_err(write_error)?;
        writer.commit().map_err(write_error)?;

        debug!("Saved {}", path.display());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.pending.clear();
        self.closed = true;
        Ok(())
    }
}
