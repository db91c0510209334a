use crate::{
    foundation::core::Shape,
    foundation::error::{LabelError, LabelResult},
    label::raster::CanonicalRaster,
    label::vocab::UNLABELED_INDEX,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
/// Per-pixel outcome of comparing two label rasters.
pub enum ChangeClass {
    /// Either source is unlabeled at this pixel.
    Unlabeled = 0,
    /// Both sources agree.
    Unchanged = 1,
    /// The sources disagree.
    Changed = 2,
}

impl ChangeClass {
    /// Class stored as `v`, if any.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Unlabeled),
            1 => Some(Self::Unchanged),
            2 => Some(Self::Changed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Row-major matrix over {0 = unlabeled, 1 = unchanged, 2 = changed}.
pub struct ChangeRaster {
    shape: Shape,
    data: Vec<u8>,
}

impl ChangeRaster {
    /// Wrap raw change values, rejecting anything outside {0, 1, 2}.
    pub fn new(shape: Shape, data: Vec<u8>) -> LabelResult<Self> {
        if data.len() as u64 != shape.area() {
            return Err(LabelError::validation(format!(
                "change data has {} cells, shape {}x{} needs {}",
                data.len(),
                shape.height,
                shape.width,
                shape.area()
            )));
        }
        if let Some(&bad) = data.iter().find(|&&v| ChangeClass::from_u8(v).is_none()) {
            return Err(LabelError::format(format!(
                "change value {bad} outside {{0, 1, 2}}"
            )));
        }
        Ok(Self { shape, data })
    }

    /// Raster dimensions.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Row-major change values.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Class at `(row, col)`, or `None` outside the raster.
    pub fn get(&self, row: u32, col: u32) -> Option<ChangeClass> {
        if row >= self.shape.height || col >= self.shape.width {
            return None;
        }
        self.data
            .get(row as usize * self.shape.width as usize + col as usize)
            .copied()
            .and_then(ChangeClass::from_u8)
    }

    /// Number of pixels of `class`.
    pub fn count(&self, class: ChangeClass) -> u64 {
        let v = class as u8;
        self.data.iter().filter(|&&p| p == v).count() as u64
    }

    /// Pixels where the sources disagree.
    pub fn changed_pixels(&self) -> u64 {
        self.count(ChangeClass::Changed)
    }

    /// Full pixel area, unlabeled pixels included.
    pub fn total_pixels(&self) -> u64 {
        self.shape.area()
    }
}

/// Compare two canonical rasters pixel by pixel.
///
/// A pixel is `Changed` where the classes differ and `Unchanged` where they agree, except that any
/// pixel unlabeled in either input is `Unlabeled`, even when the two classes differ.
pub fn detect_change(a: &CanonicalRaster, b: &CanonicalRaster) -> LabelResult<ChangeRaster> {
    if a.shape() != b.shape() {
        return Err(LabelError::ShapeMismatch {
            left: a.shape().as_tuple(),
            right: b.shape().as_tuple(),
        });
    }

    let mut data: Vec<u8> = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&pa, &pb)| u8::from(pa != pb) + 1)
        .collect();

    for ((out, &pa), &pb) in data.iter_mut().zip(a.data()).zip(b.data()) {
        if pa == UNLABELED_INDEX || pb == UNLABELED_INDEX {
            *out = ChangeClass::Unlabeled as u8;
        }
    }

    Ok(ChangeRaster {
        shape: a.shape(),
        data,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/change/detect.rs"]
mod tests;
