//! Image codec boundary.
//!
//! Label rasters are single-channel PNGs whose pixel values are class indices, so they are decoded
//! with the palette left unexpanded. Everything above this module works on raw indices only.

/// Indexed PNG read/write and label colormaps.
pub mod indexed;
