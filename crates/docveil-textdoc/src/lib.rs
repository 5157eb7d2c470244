//! Paged plain-text documents for Docveil
//!
//! Implements `DocumentBackend` for UTF-8 text files whose pages are separated
//! by form feeds. Page geometry is a character grid: every character occupies
//! one unit cell, line `n` spans `y = n..n+1` and column `c` spans `x = c..c+1`.
//! Applied redactions overwrite the covered cells with [`MASK_GLYPH`].
//!
//! # Example
//! ```no_run
//! # use docveil_core::DocumentBackend;
//! # use docveil_textdoc::TextDocumentBackend;
//! # fn example() -> docveil_core::Result<()> {
//! let backend = TextDocumentBackend::new();
//! let mut doc = backend.open("letter.txt".as_ref())?;
//! let regions = doc.search_text(0, "ABCDE1234F")?;
//! # Ok(())
//! # }
//! ```

mod atomic_writer;
mod text_document;

pub use text_document::{MASK_GLYPH, PAGE_BREAK, TextDocument, TextDocumentBackend};
