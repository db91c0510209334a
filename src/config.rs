use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;

use crate::{
    corpus::walker::{ChangeSource, VocabularyPolicy, WalkOptions},
    foundation::error::{LabelError, LabelResult},
    label::mask::MaskPair,
    label::vocab::{DEFAULT_CLASS_NAMES, LabelVocabulary},
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Run configuration, typically loaded from a JSON file. Missing fields take their defaults.
pub struct RunConfig {
    /// Canonical vocabulary; the first entry is the unlabeled class.
    pub class_names: Vec<String>,
    /// Class equivalences applied before change detection.
    pub mask_pairs: Vec<MaskPair>,
    /// Width of the patch id in legacy `pin.txt` patch folders.
    pub patch_id_width: usize,
    /// `strict` aborts on unknown labels, `report` skips the raster.
    pub vocabulary_policy: VocabularyPolicy,
    /// `derive` compares pairs, `existing` counts written change rasters.
    pub change_source: ChangeSource,
    /// Persist derived change rasters.
    pub write_change_rasters: bool,
    /// Count pairwise member rasters in the class histogram too.
    pub descend_into_pairwise: bool,
    /// Run jobs on a rayon pool.
    pub parallel: bool,
    /// Worker threads for parallel runs; rayon decides when unset.
    pub threads: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let walk = WalkOptions::default();
        Self {
            class_names: DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            mask_pairs: walk.mask_pairs,
            patch_id_width: walk.patch_id_width,
            vocabulary_policy: walk.vocabulary_policy,
            change_source: walk.change_source,
            write_change_rasters: walk.write_change_rasters,
            descend_into_pairwise: walk.descend_into_pairwise,
            parallel: walk.parallel,
            threads: walk.threads,
        }
    }
}

impl RunConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> LabelResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| LabelError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: &Path) -> LabelResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            LabelError::validation(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the vocabulary, every mask pair and the numeric knobs.
    pub fn validate(&self) -> LabelResult<()> {
        let vocab = self.vocabulary()?;
        for pair in &self.mask_pairs {
            pair.resolve(&vocab).map_err(|e| {
                LabelError::validation(format!(
                    "mask pair '{}' -> '{}': {e}",
                    pair.from, pair.to
                ))
            })?;
        }
        if self.patch_id_width == 0 {
            return Err(LabelError::validation("patch_id_width must be >= 1"));
        }
        if self.threads == Some(0) {
            return Err(LabelError::validation("'threads' must be >= 1 when set"));
        }
        Ok(())
    }

    /// Build the canonical vocabulary from `class_names`.
    pub fn vocabulary(&self) -> LabelResult<LabelVocabulary> {
        LabelVocabulary::new(self.class_names.iter().cloned())
    }

    /// Options for a [`crate::CorpusWalker`].
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            mask_pairs: self.mask_pairs.clone(),
            patch_id_width: self.patch_id_width,
            vocabulary_policy: self.vocabulary_policy,
            change_source: self.change_source,
            write_change_rasters: self.write_change_rasters,
            descend_into_pairwise: self.descend_into_pairwise,
            parallel: self.parallel,
            threads: self.threads,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
