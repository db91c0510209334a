//! Corpus-level processing: discovering rasters in a directory tree and accumulating statistics.

/// Vocabulary audit of annotation documents.
pub mod audit;
/// Marker files and folder-naming conventions.
pub mod layout;
/// Running class and change counters.
pub mod stats;
/// Directory traversal and job execution.
pub mod walker;
