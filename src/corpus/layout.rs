//! Directory-tree conventions of the annotated corpus.
//!
//! A directory's role is decided by marker files alone:
//!
//! - `label.png`: a rasterized annotation (semantic statistics).
//! - `pin.txt`: legacy pairwise layout. Every sub-folder is one acquisition; inside it, patch
//!   folders are named `<acquisition>_<id>_json` where `<id>` has a fixed width (4 digits for
//!   RADARSAT-2 scenes, 3 for GF-3). Patch `<id>` of acquisition `A` pairs with
//!   `B/B_<id>_json` of every other acquisition `B`.
//! - `pin-2.txt`: alternate pairwise layout. Every sub-folder is one patch number and holds one
//!   extensionless entry per polarization/acquisition; all entries of a number are paired.
//!
//! New conventions get a new [`DirectoryKind`] variant.

use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use crate::{
    change::export::CHANGE_MARKER,
    foundation::error::{LabelError, LabelResult},
    label::raster::LABEL_FILE,
};

/// Marker of the legacy pairwise layout.
pub const LEGACY_PAIR_MARKER: &str = "pin.txt";
/// Marker of the alternate pairwise layout.
pub const ALT_PAIR_MARKER: &str = "pin-2.txt";
/// Suffix of legacy patch folder names.
pub const PATCH_FOLDER_SUFFIX: &str = "_json";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Role of one directory in the corpus.
pub enum DirectoryKind {
    /// Holds `label.png`.
    SemanticLabel,
    /// Holds `pin.txt`.
    PairwiseLegacy,
    /// Holds `pin-2.txt`.
    PairwiseAlt,
    /// Holds none of the markers.
    Other,
}

impl DirectoryKind {
    /// Resolve the kind from the names of the regular files in a directory.
    ///
    /// `label.png` wins over `pin.txt`, which wins over `pin-2.txt`.
    pub fn from_file_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (mut legacy, mut alt) = (false, false);
        for name in names {
            match name.as_ref() {
                LABEL_FILE => return Self::SemanticLabel,
                LEGACY_PAIR_MARKER => legacy = true,
                ALT_PAIR_MARKER => alt = true,
                _ => {}
            }
        }
        if legacy {
            Self::PairwiseLegacy
        } else if alt {
            Self::PairwiseAlt
        } else {
            Self::Other
        }
    }

    /// Read `dir` and resolve its kind from the regular files it holds.
    pub fn classify(dir: &Path) -> LabelResult<Self> {
        let files = list_entries(dir)?
            .into_iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name);
        Ok(Self::from_file_names(files))
    }

    /// Whether the directory pairs rasters for change detection.
    pub fn is_pairwise(self) -> bool {
        matches!(self, Self::PairwiseLegacy | Self::PairwiseAlt)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Two rasters of the same spatial patch at different times.
pub struct PairJob {
    /// Raster (or its directory) of the first acquisition.
    pub a: PathBuf,
    /// Raster (or its directory) of the second acquisition.
    pub b: PathBuf,
    /// Patch identifier shared by both.
    pub patch: String,
    /// Where the change raster goes.
    pub out: PathBuf,
}

#[derive(Debug)]
/// A pair that could not be formed, tied to the corpus item it concerns.
pub struct PairIssue {
    /// Patch folder (or missing counterpart) the issue is about.
    pub path: PathBuf,
    /// Why no pair was formed.
    pub error: LabelError,
}

/// Fixed-width patch id right before the `_json` suffix of a legacy patch folder name.
pub fn legacy_patch_id(folder_name: &str, width: usize) -> Option<&str> {
    let stem = folder_name.strip_suffix(PATCH_FOLDER_SUFFIX)?;
    let start = stem.len().checked_sub(width)?;
    stem.get(start..)
}

/// File name of the change raster comparing `a` and `b` on `patch`.
pub fn change_file_name(a: &str, b: &str, patch: &str) -> String {
    format!("{a}--{b}-{patch}{CHANGE_MARKER}.png")
}

/// Pairs of a `pin.txt` directory.
///
/// Each unordered pair of acquisition folders is visited once; a patch of the first folder with
/// no counterpart in the second yields [`LabelError::MissingCounterpart`] against the missing
/// path, a patch folder whose name does not follow the convention yields [`LabelError::Format`]
/// against that folder.
pub fn legacy_pairs(dir: &Path, id_width: usize) -> LabelResult<Vec<Result<PairJob, PairIssue>>> {
    let acquisitions: Vec<String> = list_entries(dir)?
        .into_iter()
        .filter(|e| e.is_dir)
        .map(|e| e.name)
        .collect();

    let mut out = Vec::new();
    for (i, fdr_a) in acquisitions.iter().enumerate() {
        let later = &acquisitions[i + 1..];
        if later.is_empty() {
            continue;
        }
        for patch in list_entries(&dir.join(fdr_a))?.into_iter().filter(|e| e.is_dir) {
            let a = dir.join(fdr_a).join(&patch.name);
            let Some(id) = legacy_patch_id(&patch.name, id_width) else {
                let error = LabelError::format(format!(
                    "patch folder '{}' does not end in a {id_width}-character id and '{PATCH_FOLDER_SUFFIX}'",
                    a.display()
                ));
                out.push(Err(PairIssue { path: a, error }));
                continue;
            };
            for fdr_b in later {
                let b = dir
                    .join(fdr_b)
                    .join(format!("{fdr_b}_{id}{PATCH_FOLDER_SUFFIX}"));
                if !b.is_dir() {
                    out.push(Err(PairIssue {
                        path: b.clone(),
                        error: LabelError::MissingCounterpart(b),
                    }));
                    continue;
                }
                out.push(Ok(PairJob {
                    a: a.clone(),
                    b,
                    patch: id.to_string(),
                    out: dir.join(change_file_name(fdr_a, fdr_b, id)),
                }));
            }
        }
    }
    Ok(out)
}

/// Pairs of a `pin-2.txt` directory: all unordered pairs of extensionless entries per number.
pub fn alt_pairs(dir: &Path) -> LabelResult<Vec<PairJob>> {
    let mut out = Vec::new();
    for number in list_entries(dir)?.into_iter().filter(|e| e.is_dir) {
        let number_dir = dir.join(&number.name);
        let members: Vec<String> = list_entries(&number_dir)?
            .into_iter()
            .filter(|e| Path::new(&e.name).extension().is_none())
            .map(|e| e.name)
            .collect();

        for (i, fdr_a) in members.iter().enumerate() {
            for fdr_b in &members[i + 1..] {
                out.push(PairJob {
                    a: number_dir.join(fdr_a),
                    b: number_dir.join(fdr_b),
                    patch: number.name.clone(),
                    out: dir.join(change_file_name(fdr_a, fdr_b, &number.name)),
                });
            }
        }
    }
    Ok(out)
}

#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) name: String,
    pub(crate) is_dir: bool,
}

/// Entries of `dir` sorted by name, so pairing and traversal order are reproducible.
pub(crate) fn list_entries(dir: &Path) -> LabelResult<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("read dir '{}'", dir.display()))?;
        let Some(name) = entry.file_name().to_str() else {
            tracing::debug!(dir = %dir.display(), "skipping non-UTF-8 entry name");
            continue;
        };
        entries.push(Entry {
            name: name.to_string(),
            is_dir: entry.path().is_dir(),
        });
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "../../tests/unit/corpus/layout.rs"]
mod tests;
