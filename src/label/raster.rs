use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    codec::indexed::{self, IndexImage},
    foundation::core::Shape,
    foundation::error::{LabelError, LabelResult},
    label::vocab::LabelVocabulary,
};

/// File name of a rasterized label inside an annotation output directory.
pub const LABEL_FILE: &str = "label.png";
/// File name of the local class-name list next to [`LABEL_FILE`].
pub const NAMES_FILE: &str = "label_names.txt";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Row-major matrix of class indices. Whether the indices are local or canonical depends on how
/// the raster was obtained; see [`CanonicalRaster`].
pub struct LabelRaster {
    shape: Shape,
    data: Vec<u8>,
}

impl LabelRaster {
    /// Wrap row-major `data`; its length must equal the shape area.
    pub fn new(shape: Shape, data: Vec<u8>) -> LabelResult<Self> {
        if data.len() as u64 != shape.area() {
            return Err(LabelError::validation(format!(
                "raster data has {} cells, shape {}x{} needs {}",
                data.len(),
                shape.height,
                shape.width,
                shape.area()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Build a raster from equally long rows.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> LabelResult<Self> {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        if rows.iter().any(|r| r.as_ref().len() != width) {
            return Err(LabelError::validation("raster rows must have equal length"));
        }
        let data = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Self::new(Shape::new(rows.len() as u32, width as u32), data)
    }

    /// Raster dimensions.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Row-major indices.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Index at `(row, col)`, or `None` outside the raster.
    pub fn get(&self, row: u32, col: u32) -> Option<u8> {
        if row >= self.shape.height || col >= self.shape.width {
            return None;
        }
        self.data
            .get(row as usize * self.shape.width as usize + col as usize)
            .copied()
    }

    /// Largest index present; `None` for an empty raster.
    pub fn max_index(&self) -> Option<u8> {
        self.data.iter().max().copied()
    }

    /// Pixel count per index in `0..bins`; indices at or past `bins` are not counted.
    pub fn histogram(&self, bins: usize) -> Vec<u64> {
        let mut counts = vec![0u64; bins];
        for &v in &self.data {
            if let Some(slot) = counts.get_mut(v as usize) {
                *slot += 1;
            }
        }
        counts
    }

    pub(crate) fn map_pixels(&self, lut: &[u8; 256]) -> Self {
        Self {
            shape: self.shape,
            data: self.data.iter().map(|&v| lut[v as usize]).collect(),
        }
    }

    pub(crate) fn to_index_image(&self) -> IndexImage {
        IndexImage {
            shape: self.shape,
            data: self.data.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A [`LabelRaster`] whose index `i` means `vocabulary[i]` for every raster of the corpus.
pub struct CanonicalRaster(LabelRaster);

impl CanonicalRaster {
    /// Wrap a raster that is already expressed in canonical indices.
    pub fn from_canonical(raster: LabelRaster, vocab: &LabelVocabulary) -> LabelResult<Self> {
        if let Some(max) = raster.max_index()
            && max as usize >= vocab.len()
        {
            return Err(LabelError::format(format!(
                "canonical index {max} outside vocabulary of {} classes",
                vocab.len()
            )));
        }
        Ok(Self(raster))
    }

    pub(crate) fn new_unchecked(raster: LabelRaster) -> Self {
        Self(raster)
    }

    /// Underlying raster.
    pub fn raster(&self) -> &LabelRaster {
        &self.0
    }

    /// Unwrap the underlying raster.
    pub fn into_raster(self) -> LabelRaster {
        self.0
    }

    /// Raster dimensions.
    pub fn shape(&self) -> Shape {
        self.0.shape
    }

    /// Row-major canonical indices.
    pub fn data(&self) -> &[u8] {
        &self.0.data
    }

    /// Pixel count per canonical class, indexed like the vocabulary.
    pub fn class_histogram(&self, vocab: &LabelVocabulary) -> Vec<u64> {
        self.0.histogram(vocab.len())
    }
}

#[derive(Clone, Debug)]
/// A raster as loaded from disk, still in its local index space.
pub struct LoadedLabel {
    /// Resolved path of the raster image.
    pub path: PathBuf,
    /// Local class indices.
    pub raster: LabelRaster,
    /// Local name list; position is the local index.
    pub names: Vec<String>,
}

/// Resolve `path` to a label raster file: directories get [`LABEL_FILE`] appended.
pub fn resolve_label_path(path: &Path) -> PathBuf {
    if path.file_name().is_some_and(|n| n == LABEL_FILE) || !path.is_dir() {
        path.to_path_buf()
    } else {
        path.join(LABEL_FILE)
    }
}

/// Load a label raster and its co-located name list from a directory or a direct raster path.
pub fn read_label(path: &Path) -> LabelResult<LoadedLabel> {
    let raster_path = resolve_label_path(path);
    if raster_path
        .extension()
        .is_none_or(|ext| !ext.eq_ignore_ascii_case("png"))
    {
        return Err(LabelError::format(format!(
            "'{}' is not a .png label raster",
            raster_path.display()
        )));
    }
    if !raster_path.is_file() {
        return Err(LabelError::format(format!(
            "label raster '{}' not found",
            raster_path.display()
        )));
    }

    let names_path = raster_path.with_file_name(NAMES_FILE);
    let names = read_names(&names_path)?;

    let img = indexed::read_index_png(&raster_path)?;
    let raster = LabelRaster::new(img.shape, img.data)?;
    if let Some(max) = raster.max_index()
        && max as usize >= names.len()
    {
        return Err(LabelError::format(format!(
            "'{}' holds index {max} but '{}' names only {} classes",
            raster_path.display(),
            names_path.display(),
            names.len()
        )));
    }

    Ok(LoadedLabel {
        path: raster_path,
        raster,
        names,
    })
}

/// Read a newline-delimited class-name list; surrounding whitespace is trimmed from each line.
pub fn read_names(path: &Path) -> LabelResult<Vec<String>> {
    if !path.is_file() {
        return Err(LabelError::format(format!(
            "name list '{}' not found",
            path.display()
        )));
    }
    let bytes = std::fs::read(path).map_err(|e| {
        LabelError::format(format!("read name list '{}': {e}", path.display()))
    })?;
    let text = String::from_utf8(bytes).map_err(|e| {
        LabelError::format(format!(
            "name list '{}' is not valid UTF-8: {e}",
            path.display()
        ))
    })?;
    Ok(text.lines().map(|l| l.trim().to_string()).collect())
}

/// Write `raster` as [`LABEL_FILE`] plus the full vocabulary as [`NAMES_FILE`] into `dir`.
pub fn save_label_dir(
    dir: &Path,
    raster: &CanonicalRaster,
    vocab: &LabelVocabulary,
) -> LabelResult<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;

    let raster_path = dir.join(LABEL_FILE);
    indexed::write_index_png(
        &raster_path,
        &raster.raster().to_index_image(),
        &indexed::label_colormap(),
    )?;

    let mut names = String::new();
    for name in vocab.names() {
        let _ = writeln!(names, "{name}");
    }
    let names_path = dir.join(NAMES_FILE);
    std::fs::write(&names_path, names)
        .with_context(|| format!("write name list '{}'", names_path.display()))?;

    Ok(raster_path)
}

#[cfg(test)]
#[path = "../../tests/unit/label/raster.rs"]
mod tests;
