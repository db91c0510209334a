use std::path::Path;

use crate::{
    change::detect::ChangeRaster,
    codec::indexed::{self, IndexImage, Rgb},
    foundation::error::{LabelError, LabelResult},
};

/// Colors for unlabeled (gray), unchanged (black) and changed (white) pixels.
pub const CHANGE_PALETTE: [Rgb; 3] = [[128, 128, 128], [0, 0, 0], [255, 255, 255]];

/// Marker embedded in the file name of every written change raster.
pub const CHANGE_MARKER: &str = "-change";

/// Label colormap with the first three entries replaced by [`CHANGE_PALETTE`].
pub fn change_colormap() -> Vec<Rgb> {
    let mut cmap = indexed::label_colormap();
    cmap[..CHANGE_PALETTE.len()].copy_from_slice(&CHANGE_PALETTE);
    cmap
}

/// Persist `change` as a palette PNG.
pub fn write_change_png(path: &Path, change: &ChangeRaster) -> LabelResult<()> {
    let image = IndexImage {
        shape: change.shape(),
        data: change.data().to_vec(),
    };
    indexed::write_index_png(path, &image, &change_colormap())?;
    tracing::info!(path = %path.display(), "wrote change raster");
    Ok(())
}

/// Load a previously written change raster.
pub fn read_change_png(path: &Path) -> LabelResult<ChangeRaster> {
    if path
        .extension()
        .is_none_or(|ext| !ext.eq_ignore_ascii_case("png"))
    {
        return Err(LabelError::format(format!(
            "'{}' is not a .png change raster",
            path.display()
        )));
    }
    let image = indexed::read_index_png(path)?;
    ChangeRaster::new(image.shape, image.data)
        .map_err(|e| LabelError::format(format!("'{}': {e}", path.display())))
}

/// Whether `file_name` names a change raster written by this crate or its predecessors.
pub fn is_change_file(file_name: &str) -> bool {
    file_name.contains(CHANGE_MARKER)
        && Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

#[cfg(test)]
#[path = "../../tests/unit/change/export.rs"]
mod tests;
