use crate::{
    foundation::error::{LabelError, LabelResult},
    label::raster::CanonicalRaster,
    label::vocab::LabelVocabulary,
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Declares class `from` equivalent to class `to` for change detection.
pub struct MaskPair {
    /// Class that disappears.
    pub from: String,
    /// Class it is folded into.
    pub to: String,
}

impl MaskPair {
    /// Pair `from` with `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Canonical `(from, to)` indices.
    pub fn resolve(&self, vocab: &LabelVocabulary) -> LabelResult<(u8, u8)> {
        let from = vocab
            .index_of(&self.from)
            .ok_or_else(|| LabelError::missing_label(self.from.as_str()))?;
        let to = vocab
            .index_of(&self.to)
            .ok_or_else(|| LabelError::missing_label(self.to.as_str()))?;
        Ok((from, to))
    }
}

/// Replace every pixel of class `pair.from` with class `pair.to`; other pixels are kept.
pub fn mask_label(
    raster: &CanonicalRaster,
    vocab: &LabelVocabulary,
    pair: &MaskPair,
) -> LabelResult<CanonicalRaster> {
    let (from, to) = pair.resolve(vocab)?;

    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = i as u8;
    }
    lut[from as usize] = to;
    Ok(CanonicalRaster::new_unchecked(raster.raster().map_pixels(&lut)))
}

/// Apply `pairs` in order.
pub fn mask_labels(
    raster: &CanonicalRaster,
    vocab: &LabelVocabulary,
    pairs: &[MaskPair],
) -> LabelResult<CanonicalRaster> {
    pairs
        .iter()
        .try_fold(raster.clone(), |acc, pair| mask_label(&acc, vocab, pair))
}

#[cfg(test)]
#[path = "../../tests/unit/label/mask.rs"]
mod tests;
