//! Label rasters, the canonical vocabulary, and the index rewrites between them.

/// Collapsing one canonical class into another.
pub mod mask;
/// Label raster types and on-disk I/O.
pub mod raster;
/// Local-to-canonical index reconciliation.
pub mod reconcile;
/// Canonical class vocabulary.
pub mod vocab;
