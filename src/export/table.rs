use std::path::Path;

use anyhow::Context;

use crate::{corpus::stats::StatsTotals, foundation::error::LabelResult};

#[derive(Clone, Debug, PartialEq, Eq)]
/// One-row statistics table: class columns in vocabulary order, then `changed` and `all`.
pub struct StatsTable {
    /// Header cells.
    pub columns: Vec<String>,
    /// Row cells, aligned with `columns`.
    pub values: Vec<u64>,
}

impl From<&StatsTotals> for StatsTable {
    fn from(totals: &StatsTotals) -> Self {
        let mut columns: Vec<String> = totals.classes.iter().map(|c| c.name.clone()).collect();
        let mut values: Vec<u64> = totals.classes.iter().map(|c| c.pixels).collect();
        columns.extend(["changed".to_string(), "all".to_string()]);
        values.extend([totals.changed, totals.all]);
        Self { columns, values }
    }
}

impl StatsTable {
    /// Render as a header line and a value line.
    pub fn to_csv(&self) -> String {
        let header = self
            .columns
            .iter()
            .map(|c| csv_field(c))
            .collect::<Vec<_>>()
            .join(",");
        let row = self
            .values
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("{header}\n{row}\n")
    }
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Write `totals` to `path`: JSON for a `.json` extension, CSV otherwise.
pub fn write_stats(path: &Path, totals: &StatsTotals) -> LabelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let body = if is_json {
        serde_json::to_string_pretty(totals).context("serialize statistics")?
    } else {
        StatsTable::from(totals).to_csv()
    };
    std::fs::write(path, body).with_context(|| format!("write '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "wrote statistics");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/table.rs"]
mod tests;
