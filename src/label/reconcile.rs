use crate::{
    foundation::error::{LabelError, LabelResult},
    label::raster::{CanonicalRaster, LabelRaster},
    label::vocab::LabelVocabulary,
};

/// Canonical position of every local index, or the first local name the vocabulary lacks.
pub fn local_to_canonical(
    local_names: &[String],
    vocab: &LabelVocabulary,
) -> LabelResult<Vec<u8>> {
    if local_names.len() > 256 {
        return Err(LabelError::format(format!(
            "name list has {} entries, at most 256 fit an 8-bit raster",
            local_names.len()
        )));
    }
    local_names
        .iter()
        .map(|name| {
            vocab
                .index_of(name)
                .ok_or_else(|| LabelError::unknown_label(name.as_str()))
        })
        .collect()
}

/// Rewrite `raster` from the index space of `local_names` into the canonical vocabulary.
///
/// Every local name must appear in `vocab`. The rewrite reads the original pixels through a lookup
/// table, so several local indices mapping onto one canonical index never cascade into each other.
#[tracing::instrument(skip_all, fields(shape = ?raster.shape()))]
pub fn reconstruct_label(
    raster: &LabelRaster,
    local_names: &[String],
    vocab: &LabelVocabulary,
) -> LabelResult<CanonicalRaster> {
    let positions = local_to_canonical(local_names, vocab)?;

    if let Some(max) = raster.max_index()
        && max as usize >= positions.len()
    {
        return Err(LabelError::format(format!(
            "raster holds index {max} but the name list has {} entries",
            positions.len()
        )));
    }

    if positions.iter().enumerate().all(|(i, &j)| i == j as usize) {
        return Ok(CanonicalRaster::new_unchecked(raster.clone()));
    }

    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = i as u8;
    }
    for (i, &j) in positions.iter().enumerate() {
        lut[i] = j;
    }
    Ok(CanonicalRaster::new_unchecked(raster.map_pixels(&lut)))
}

#[cfg(test)]
#[path = "../../tests/unit/label/reconcile.rs"]
mod tests;
