use crate::foundation::error::{LabelError, LabelResult};

/// Raster dimensions in `(height, width)` order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub struct Shape {
    /// Rows.
    pub height: u32,
    /// Columns.
    pub width: u32,
}

impl Shape {
    /// Build a shape from `(height, width)`.
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Pixel count.
    pub fn area(self) -> u64 {
        u64::from(self.height) * u64::from(self.width)
    }

    /// `(height, width)`.
    pub fn as_tuple(self) -> (u32, u32) {
        (self.height, self.width)
    }

    /// Whether the shape holds no pixels.
    pub fn is_empty(self) -> bool {
        self.area() == 0
    }
}

/// Top-left `(row, col)` of patch `slice_idx` when `image` is tiled row-major by `patch`.
///
/// Tiles on the last row/column are shifted back so they stay inside the image, so trailing
/// patches overlap their neighbours instead of running past the border.
pub fn patch_origin(image: Shape, patch: Shape, slice_idx: u64) -> LabelResult<(u32, u32)> {
    if patch.is_empty() {
        return Err(LabelError::validation("patch shape must be non-empty"));
    }
    if image.height < patch.height || image.width < patch.width {
        return Err(LabelError::validation(
            "shape of image must be at least the patch shape",
        ));
    }

    let patches_per_row = u64::from((image.width - 1) / patch.width + 1);
    let rows = slice_idx / patches_per_row;
    let cols = slice_idx % patches_per_row;

    let max_row = u64::from(image.height - patch.height);
    let max_col = u64::from(image.width - patch.width);
    let row = (u64::from(patch.height) * rows).min(max_row);
    let col = (u64::from(patch.width) * cols).min(max_col);

    // Both are clamped to a u32 bound above.
    Ok((row as u32, col as u32))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
