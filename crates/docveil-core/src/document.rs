//! Document capability traits
//!
//! Docveil never renders, searches or rewrites documents itself. A
//! document-library binding supplies these operations by implementing
//! [`DocumentBackend`] and [`DocumentHandle`].
//!
//! Implementations:
//! - `TextDocumentBackend` (docveil-textdoc): paged plain-text files

use std::path::Path;

use crate::{
    Result,
    geometry::{PageRegion, Rect, RedactionFill},
};

/// Opens documents for a redaction pass
///
/// # Example
/// ```no_run
/// # use docveil_core::DocumentBackend;
/// # fn example(backend: &dyn DocumentBackend) -> docveil_core::Result<()> {
/// let mut doc = backend.open("statement.txt".as_ref())?;
/// for page in 0..doc.page_count()? {
///     println!("{}", doc.page_text(page)?);
/// }
/// doc.close()?;
/// # Ok(())
/// # }
/// ```
pub trait DocumentBackend: Send + Sync {
    /// Open the document at `path`
    ///
    /// # Errors
    /// - `Error::DocumentOpen` if the file is missing, unreadable or corrupt
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>>;
}

/// An open document
///
/// Every handle returned by [`DocumentBackend::open`] must be closed exactly
/// once, whether or not the work done with it succeeded.
pub trait DocumentHandle {
    /// Number of pages in the document
    fn page_count(&self) -> Result<usize>;

    /// Extracted text of one page
    ///
    /// # Errors
    /// - `Error::PageOutOfRange` if `page_index >= page_count()`
    fn page_text(&self, page_index: usize) -> Result<String>;

    /// Locate every occurrence of `literal` on a page
    ///
    /// A literal that does not occur yields an empty vector, not an error.
    fn search_text(&self, page_index: usize, literal: &str) -> Result<Vec<PageRegion>>;

    /// Queue a region for opaque redaction
    fn mark_redaction(&mut self, page_index: usize, rect: Rect, fill: RedactionFill)
    -> Result<()>;

    /// Apply all queued, unapplied redactions on a page
    ///
    /// Idempotent when nothing is pending. Returns the number of regions applied.
    fn commit_redactions(&mut self, page_index: usize) -> Result<usize>;

    /// Persist the document to `path`
    ///
    /// # Errors
    /// - `Error::DocumentWrite` if the destination cannot be written
    fn save(&mut self, path: &Path) -> Result<()>;

    /// Release the handle
    fn close(&mut self) -> Result<()>;
}

/// Scoped ownership of an open handle
///
/// The handle is closed exactly once: explicitly through [`ScopedDocument::close`],
/// or on drop if the owner bailed out early.
pub struct ScopedDocument {
    handle: Box<dyn DocumentHandle>,
    closed: bool,
}

impl ScopedDocument {
    pub fn new(handle: Box<dyn DocumentHandle>) -> Self {
        Self {
            handle,
            closed: false,
        }
    }

    /// Open `path` through `backend` and take ownership of the handle
    pub fn open(backend: &dyn DocumentBackend, path: &Path) -> Result<Self> {
        backend.open(path).map(Self::new)
    }

    pub fn handle(&self) -> &dyn DocumentHandle {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> &mut dyn DocumentHandle {
        self.handle.as_mut()
    }

    /// Close the handle and surface any close error
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.handle.close()
    }
}

impl Drop for ScopedDocument {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.handle.close() {
                tracing::error!("Failed to close document: {}", e);
            }
        }
    }
}
