use std::path::PathBuf;

/// Convenience result type used across labelstat.
pub type LabelResult<T> = Result<T, LabelError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum LabelError {
    /// Malformed or missing raster / name-list file.
    #[error("format error: {0}")]
    Format(String),

    /// A local class name that the canonical vocabulary does not contain.
    #[error("unknown label '{name}' (not in canonical vocabulary)")]
    UnknownLabel {
        /// Offending class name.
        name: String,
    },

    /// A class name looked up for masking is absent from the vocabulary.
    #[error("missing label: {0}")]
    MissingLabel(String),

    /// Two rasters compared for change have different dimensions.
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        /// `(height, width)` of the first raster.
        left: (u32, u32),
        /// `(height, width)` of the second raster.
        right: (u32, u32),
    },

    /// The sibling raster of a pairwise comparison does not exist.
    #[error("missing counterpart: {}", .0.display())]
    MissingCounterpart(PathBuf),

    /// Invalid configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LabelError {
    /// Build a [`LabelError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`LabelError::UnknownLabel`] value.
    pub fn unknown_label(name: impl Into<String>) -> Self {
        Self::UnknownLabel { name: name.into() }
    }

    /// Build a [`LabelError::MissingLabel`] value.
    pub fn missing_label(name: impl Into<String>) -> Self {
        Self::MissingLabel(name.into())
    }

    /// Build a [`LabelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Errors scoped to a single corpus item; the walker logs and skips them.
    pub fn is_item_error(&self) -> bool {
        matches!(
            self,
            Self::Format(_) | Self::ShapeMismatch { .. } | Self::MissingCounterpart(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
