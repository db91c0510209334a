//! Error taxonomy and small value types shared by every pipeline stage.

/// Raster shapes and patch geometry.
pub mod core;
/// Crate-wide error type.
pub mod error;
