use crate::{
    change::detect::ChangeRaster, label::raster::CanonicalRaster, label::vocab::LabelVocabulary,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Running per-class pixel histogram plus changed/compared pixel counters.
///
/// Counters only ever grow. Partial accumulators from independent sub-walks combine with
/// [`StatsAccumulator::merge`].
pub struct StatsAccumulator {
    class_counts: Vec<u64>,
    changed: u64,
    total: u64,
}

impl StatsAccumulator {
    /// Zeroed counters, one class slot per vocabulary entry.
    pub fn new(vocab: &LabelVocabulary) -> Self {
        Self {
            class_counts: vec![0; vocab.len()],
            changed: 0,
            total: 0,
        }
    }

    /// Fold the class histogram of one canonical raster.
    pub fn add_semantic(&mut self, raster: &CanonicalRaster) {
        let hist = raster.raster().histogram(self.class_counts.len());
        for (slot, n) in self.class_counts.iter_mut().zip(hist) {
            *slot += n;
        }
    }

    /// Fold one change raster: its changed pixels and its full area.
    pub fn add_change(&mut self, change: &ChangeRaster) {
        self.add_change_counts(change.changed_pixels(), change.total_pixels());
    }

    /// Fold raw change counters, e.g. from an existing change raster.
    pub fn add_change_counts(&mut self, changed: u64, total: u64) {
        self.changed += changed;
        self.total += total;
    }

    /// Sum two accumulators; used to join per-worker partials.
    pub fn merge(mut self, other: Self) -> Self {
        if self.class_counts.len() < other.class_counts.len() {
            self.class_counts.resize(other.class_counts.len(), 0);
        }
        for (slot, n) in self.class_counts.iter_mut().zip(other.class_counts) {
            *slot += n;
        }
        self.changed += other.changed;
        self.total += other.total;
        self
    }

    /// Pixel count per canonical index.
    pub fn class_counts(&self) -> &[u64] {
        &self.class_counts
    }

    /// Changed pixels so far.
    pub fn changed(&self) -> u64 {
        self.changed
    }

    /// Compared pixels so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Attach class names to the counters.
    pub fn finish(self, vocab: &LabelVocabulary) -> StatsTotals {
        let classes = vocab
            .names()
            .iter()
            .zip(self.class_counts.iter().chain(std::iter::repeat(&0)))
            .map(|(name, &pixels)| ClassCount {
                name: name.clone(),
                pixels,
            })
            .collect();
        StatsTotals {
            classes,
            changed: self.changed,
            all: self.total,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Pixel count of one canonical class.
pub struct ClassCount {
    /// Class name.
    pub name: String,
    /// Pixels of that class.
    pub pixels: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Final statistics of a corpus walk.
pub struct StatsTotals {
    /// Per-class pixel counts in vocabulary order.
    pub classes: Vec<ClassCount>,
    /// Pixels marked changed across all compared pairs.
    pub changed: u64,
    /// Pixels covered by all compared pairs.
    pub all: u64,
}

impl StatsTotals {
    /// Pixels of the class called `name`.
    pub fn class_pixels(&self, name: &str) -> Option<u64> {
        self.classes
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.pixels)
    }

    /// Sum over all classes.
    pub fn labeled_total(&self) -> u64 {
        self.classes.iter().map(|c| c.pixels).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/corpus/stats.rs"]
mod tests;
