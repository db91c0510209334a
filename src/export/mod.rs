//! Statistics export.

/// One-row CSV / JSON statistics tables.
pub mod table;
