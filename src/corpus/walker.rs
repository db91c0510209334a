use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::{
    change::detect::detect_change,
    change::export::{is_change_file, read_change_png, write_change_png},
    corpus::layout::{self, DirectoryKind, PairIssue, PairJob},
    corpus::stats::{StatsAccumulator, StatsTotals},
    foundation::error::{LabelError, LabelResult},
    label::mask::{MaskPair, mask_labels},
    label::raster::{CanonicalRaster, LABEL_FILE, read_label},
    label::reconcile::reconstruct_label,
    label::vocab::LabelVocabulary,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// What to do with a raster whose name list leaves the canonical vocabulary.
pub enum VocabularyPolicy {
    /// Abort the walk with [`LabelError::UnknownLabel`].
    #[default]
    Strict,
    /// Record the file as skipped and keep walking.
    Report,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Where change statistics come from.
pub enum ChangeSource {
    /// Compare raster pairs found through `pin.txt` / `pin-2.txt` markers.
    #[default]
    Derive,
    /// Count previously written `*-change.png` rasters.
    Existing,
}

#[derive(Clone, Debug)]
/// Knobs of a corpus walk.
pub struct WalkOptions {
    /// Class equivalences applied to both rasters before comparing them.
    pub mask_pairs: Vec<MaskPair>,
    /// Width of the patch id in legacy patch folder names.
    pub patch_id_width: usize,
    /// Handling of rasters naming classes outside the vocabulary.
    pub vocabulary_policy: VocabularyPolicy,
    /// Derive change rasters from pairs, or count existing ones.
    pub change_source: ChangeSource,
    /// Persist every derived change raster next to its pair.
    pub write_change_rasters: bool,
    /// Also visit the members of pairwise directories for class statistics.
    ///
    /// Applies to both change sources, so class totals do not depend on `change_source`.
    pub descend_into_pairwise: bool,
    /// Run jobs on a rayon pool.
    pub parallel: bool,
    /// Override rayon worker threads (parallel mode only).
    pub threads: Option<usize>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            mask_pairs: vec![MaskPair::new("road", "otherthings")],
            patch_id_width: 4,
            vocabulary_policy: VocabularyPolicy::Strict,
            change_source: ChangeSource::Derive,
            write_change_rasters: true,
            descend_into_pairwise: false,
            parallel: false,
            threads: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One unit of work found by discovery.
pub enum Job {
    /// Class histogram of one label raster.
    Semantic(PathBuf),
    /// Change between two rasters of one patch; identified by its output path.
    Pair(PairJob),
    /// Counters of an already written change raster.
    ExistingChange(PathBuf),
}

impl Job {
    /// Path reported for this job when it is skipped.
    pub fn path(&self) -> &Path {
        match self {
            Self::Semantic(p) | Self::ExistingChange(p) => p,
            Self::Pair(pair) => &pair.out,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// An item left out of the statistics, and why.
pub struct SkippedItem {
    /// Offending file or folder.
    pub path: PathBuf,
    /// Rendered error.
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
/// Jobs of a corpus, plus the items discovery already had to give up on.
pub struct Discovery {
    /// Jobs in processing order.
    pub jobs: Vec<Job>,
    /// Items rejected while pairing.
    pub skipped: Vec<SkippedItem>,
}

#[derive(Clone, Debug)]
/// Result of [`CorpusWalker::run`].
pub struct WalkOutcome {
    /// Counts over every job that completed.
    pub totals: StatsTotals,
    /// Items left out, in discovery then processing order.
    pub skipped: Vec<SkippedItem>,
}

/// Depth-first corpus traversal feeding a [`StatsAccumulator`].
pub struct CorpusWalker {
    vocab: LabelVocabulary,
    opts: WalkOptions,
}

impl CorpusWalker {
    /// Build a walker, rejecting mask pairs outside `vocab` and out-of-range options.
    pub fn new(vocab: LabelVocabulary, opts: WalkOptions) -> LabelResult<Self> {
        for pair in &opts.mask_pairs {
            pair.resolve(&vocab)?;
        }
        if opts.patch_id_width == 0 {
            return Err(LabelError::validation("patch_id_width must be >= 1"));
        }
        if opts.threads == Some(0) {
            return Err(LabelError::validation("'threads' must be >= 1 when set"));
        }
        Ok(Self { vocab, opts })
    }

    /// Canonical vocabulary every raster is reconciled against.
    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocab
    }

    /// Options the walker was built with.
    pub fn options(&self) -> &WalkOptions {
        &self.opts
    }

    /// Walk `root` and collect jobs in depth-first, name-sorted order.
    pub fn discover(&self, root: &Path) -> LabelResult<Discovery> {
        if !root.is_dir() {
            return Err(LabelError::validation(format!(
                "corpus root '{}' is not a directory",
                root.display()
            )));
        }

        let mut found = Discovery::default();

        let mut it = WalkDir::new(root).sort_by_file_name().into_iter();
        while let Some(entry) = it.next() {
            let entry = entry.with_context(|| format!("walk '{}'", root.display()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let dir = entry.path();
            let kind = DirectoryKind::classify(dir)?;
            tracing::debug!(dir = %dir.display(), ?kind, "scanning directory");

            if kind == DirectoryKind::SemanticLabel {
                found.jobs.push(Job::Semantic(dir.join(LABEL_FILE)));
            }

            match self.opts.change_source {
                ChangeSource::Derive => self.discover_pairs(dir, kind, &mut found)?,
                ChangeSource::Existing => {
                    for e in layout::list_entries(dir)? {
                        if !e.is_dir && is_change_file(&e.name) {
                            found.jobs.push(Job::ExistingChange(dir.join(&e.name)));
                        }
                    }
                }
            }

            if kind.is_pairwise() && !self.opts.descend_into_pairwise {
                it.skip_current_dir();
            }
        }
        Ok(found)
    }

    fn discover_pairs(
        &self,
        dir: &Path,
        kind: DirectoryKind,
        found: &mut Discovery,
    ) -> LabelResult<()> {
        match kind {
            DirectoryKind::PairwiseLegacy => {
                for pair in layout::legacy_pairs(dir, self.opts.patch_id_width)? {
                    match pair {
                        Ok(pair) => found.jobs.push(Job::Pair(pair)),
                        Err(PairIssue { path, error }) => {
                            tracing::warn!(path = %path.display(), %error, "skipping pair");
                            found.skipped.push(SkippedItem {
                                path,
                                reason: error.to_string(),
                            });
                        }
                    }
                }
            }
            DirectoryKind::PairwiseAlt => {
                found
                    .jobs
                    .extend(layout::alt_pairs(dir)?.into_iter().map(Job::Pair));
            }
            DirectoryKind::SemanticLabel | DirectoryKind::Other => {}
        }
        Ok(())
    }

    /// Discover and process every job under `root`.
    #[tracing::instrument(skip(self, root), fields(root = %root.display()))]
    pub fn run(&self, root: &Path) -> LabelResult<WalkOutcome> {
        let Discovery { jobs, mut skipped } = self.discover(root)?;
        tracing::info!(jobs = jobs.len(), "discovered corpus items");

        let acc = if self.opts.parallel {
            let pool = build_thread_pool(self.opts.threads)?;
            let parts = pool.install(|| {
                jobs.par_iter()
                    .map(|job| {
                        let mut acc = StatsAccumulator::new(&self.vocab);
                        let res = self.process_job(job, &mut acc);
                        self.settle(job, res).map(|skip| (acc, skip))
                    })
                    .collect::<LabelResult<Vec<_>>>()
            })?;

            let mut total = StatsAccumulator::new(&self.vocab);
            for (part, skip) in parts {
                total = total.merge(part);
                skipped.extend(skip);
            }
            total
        } else {
            let mut acc = StatsAccumulator::new(&self.vocab);
            for job in &jobs {
                let res = self.process_job(job, &mut acc);
                skipped.extend(self.settle(job, res)?);
            }
            acc
        };

        let totals = acc.finish(&self.vocab);
        tracing::info!(
            labeled = totals.labeled_total(),
            changed = totals.changed,
            all = totals.all,
            skipped = skipped.len(),
            "walk complete"
        );
        Ok(WalkOutcome { totals, skipped })
    }

    /// Process one job, folding its counts into `acc` only when the whole job succeeds.
    pub fn process_job(&self, job: &Job, acc: &mut StatsAccumulator) -> LabelResult<()> {
        match job {
            Job::Semantic(path) => {
                let raster = self.load_canonical(path)?;
                acc.add_semantic(&raster);
            }
            Job::Pair(pair) => {
                let pairs = &self.opts.mask_pairs;
                let a = mask_labels(&self.load_canonical(&pair.a)?, &self.vocab, pairs)?;
                let b = mask_labels(&self.load_canonical(&pair.b)?, &self.vocab, pairs)?;
                let change = detect_change(&a, &b)?;
                if self.opts.write_change_rasters {
                    write_change_png(&pair.out, &change)?;
                }
                acc.add_change(&change);
            }
            Job::ExistingChange(path) => {
                let change = read_change_png(path)?;
                acc.add_change(&change);
            }
        }
        Ok(())
    }

    fn load_canonical(&self, path: &Path) -> LabelResult<CanonicalRaster> {
        let loaded = read_label(path)?;
        reconstruct_label(&loaded.raster, &loaded.names, &self.vocab).map_err(|err| match err {
            LabelError::Format(msg) => {
                LabelError::format(format!("'{}': {msg}", loaded.path.display()))
            }
            other => other,
        })
    }

    /// Turn a job failure into a skipped item, or propagate it when it must abort the walk.
    fn settle(&self, job: &Job, res: LabelResult<()>) -> LabelResult<Option<SkippedItem>> {
        let err = match res {
            Ok(()) => return Ok(None),
            Err(err) => err,
        };
        let path = job.path().to_path_buf();
        let skippable = err.is_item_error()
            || (matches!(err, LabelError::UnknownLabel { .. })
                && self.opts.vocabulary_policy == VocabularyPolicy::Report);
        if !skippable {
            tracing::error!(path = %path.display(), error = %err, "aborting walk");
            return Err(err);
        }

        tracing::warn!(path = %path.display(), error = %err, "skipping item");
        Ok(Some(SkippedItem {
            path,
            reason: err.to_string(),
        }))
    }
}

fn build_thread_pool(threads: Option<usize>) -> LabelResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LabelError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/corpus/walker.rs"]
mod tests;
