//! End-to-end integration tests for Docveil
//!
//! The tests under `tests/` wire the detector, the redactor and the text
//! document backend together and check redacted files on disk.
