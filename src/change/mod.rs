//! Pixelwise semantic change between two canonical label rasters.

/// Change raster type and detection.
pub mod detect;
/// Palette PNG persistence of change rasters.
pub mod export;
