use std::{collections::HashMap, sync::Arc};

use crate::foundation::error::{LabelError, LabelResult};

/// Canonical class names of the SAR land-cover change corpus, in index order.
pub const DEFAULT_CLASS_NAMES: [&str; 9] = [
    "_background_",
    "water",
    "farmland",
    "unusedland",
    "building",
    "otherthings",
    "mountainland",
    "woodland",
    "road",
];

/// Canonical index of the unlabeled/background class.
pub const UNLABELED_INDEX: u8 = 0;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Ordered, duplicate-free list of canonical class names; position is the canonical index.
///
/// Cloning is cheap and the names are immutable, so one vocabulary can be shared by every worker
/// of a run.
pub struct LabelVocabulary {
    names: Arc<[String]>,
    positions: Arc<HashMap<String, u8>>,
}

impl LabelVocabulary {
    /// Build a vocabulary, rejecting empty lists, duplicates and more than 256 classes.
    pub fn new<I, S>(names: I) -> LabelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(LabelError::validation("vocabulary must not be empty"));
        }
        if names.len() > 256 {
            return Err(LabelError::validation(format!(
                "vocabulary has {} classes, at most 256 fit an 8-bit raster",
                names.len()
            )));
        }

        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(LabelError::validation(format!(
                    "vocabulary entry {i} is an empty name"
                )));
            }
            if positions.insert(name.clone(), i as u8).is_some() {
                return Err(LabelError::validation(format!(
                    "duplicate class name '{name}' in vocabulary"
                )));
            }
        }

        Ok(Self {
            names: names.into(),
            positions: Arc::new(positions),
        })
    }

    /// Canonical index of `name`.
    pub fn index_of(&self, name: &str) -> Option<u8> {
        self.positions.get(name).copied()
    }

    /// Class name at `index`.
    pub fn name(&self, index: u8) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    /// All class names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether `name` is a canonical class.
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false` for a constructed vocabulary.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the unlabeled/background sentinel class.
    pub fn unlabeled_name(&self) -> &str {
        &self.names[UNLABELED_INDEX as usize]
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        let names: Vec<String> = DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect();
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i as u8))
            .collect();
        Self {
            names: names.into(),
            positions: Arc::new(positions),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/label/vocab.rs"]
mod tests;
