//! Docveil Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Docveil:
//! - Document capability traits implemented by document-library bindings
//! - Page geometry (regions, rectangles, fills)
//! - Core error types

pub mod document;
pub mod error;
pub mod geometry;

pub use document::{DocumentBackend, DocumentHandle, ScopedDocument};
pub use error::{Error, Result};
pub use geometry::{PageRegion, Rect, RedactionFill};
