//! labelstat turns annotated label rasters into corpus statistics.
//!
//! Every raster of an annotation corpus is produced independently, each with its own
//! index-to-name list. labelstat puts them on common ground and derives change between
//! acquisitions of the same patch.
//!
//! # Pipeline overview
//!
//! 1. **Load**: `label.png + label_names.txt -> LoadedLabel` (raster in local indices)
//! 2. **Reconcile**: `LoadedLabel + LabelVocabulary -> CanonicalRaster`
//! 3. **Mask**: collapse equivalent classes (`road -> otherthings` by default)
//! 4. **Detect**: `CanonicalRaster x CanonicalRaster -> ChangeRaster` over {unlabeled, unchanged, changed}
//! 5. **Accumulate**: fold class histograms and change counters into a [`StatsAccumulator`]
//!
//! [`CorpusWalker`] drives the pipeline over a directory tree whose layout is declared by
//! marker files (`label.png`, `pin.txt`, `pin-2.txt`); see [`DirectoryKind`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod change;
mod codec;
mod config;
mod corpus;
mod export;
mod foundation;
mod label;

pub use change::detect::{ChangeClass, ChangeRaster, detect_change};
pub use change::export::{
    CHANGE_MARKER, CHANGE_PALETTE, change_colormap, is_change_file, read_change_png,
    write_change_png,
};
pub use codec::indexed::{
    IndexImage, Rgb, colorize, label_colormap, read_index_png, save_colorized, write_index_png,
};
pub use config::RunConfig;
pub use corpus::audit::{AuditFinding, AuditIssue, audit_annotations};
pub use corpus::layout::{
    ALT_PAIR_MARKER, DirectoryKind, LEGACY_PAIR_MARKER, PATCH_FOLDER_SUFFIX, PairIssue, PairJob,
    alt_pairs, change_file_name, legacy_pairs, legacy_patch_id,
};
pub use corpus::stats::{ClassCount, StatsAccumulator, StatsTotals};
pub use corpus::walker::{
    ChangeSource, CorpusWalker, Discovery, Job, SkippedItem, VocabularyPolicy, WalkOptions,
    WalkOutcome,
};
pub use export::table::{StatsTable, write_stats};
pub use foundation::core::{Shape, patch_origin};
pub use foundation::error::{LabelError, LabelResult};
pub use label::mask::{MaskPair, mask_label, mask_labels};
pub use label::raster::{
    CanonicalRaster, LABEL_FILE, LabelRaster, LoadedLabel, NAMES_FILE, read_label, read_names,
    resolve_label_path, save_label_dir,
};
pub use label::reconcile::{local_to_canonical, reconstruct_label};
pub use label::vocab::{DEFAULT_CLASS_NAMES, LabelVocabulary, UNLABELED_INDEX};
