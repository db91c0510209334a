use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use crate::{
    foundation::error::{LabelError, LabelResult},
    label::vocab::LabelVocabulary,
};

#[derive(Debug, serde::Deserialize)]
struct AnnotationFile {
    #[serde(default)]
    shapes: Vec<ShapeRecord>,
}

#[derive(Debug, serde::Deserialize)]
struct ShapeRecord {
    label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Problem found in one annotation file.
pub enum AuditIssue {
    /// A shape carries a label outside the vocabulary.
    UndefinedLabel {
        /// Label as written in the file.
        label: String,
    },
    /// The file is not a readable annotation document.
    Unreadable {
        /// Read or parse error.
        error: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// One issue in one annotation file.
pub struct AuditFinding {
    /// Annotation file the issue was found in.
    pub file: PathBuf,
    /// What is wrong with it.
    #[serde(flatten)]
    pub issue: AuditIssue,
}

/// Check every `*.json` annotation under `root` against `vocab` without failing on findings.
///
/// Each shape with an undefined label produces one finding, in file order.
#[tracing::instrument(skip(vocab, root), fields(root = %root.display()))]
pub fn audit_annotations(root: &Path, vocab: &LabelVocabulary) -> LabelResult<Vec<AuditFinding>> {
    if !root.is_dir() {
        return Err(LabelError::validation(format!(
            "audit root '{}' is not a directory",
            root.display()
        )));
    }

    let mut findings = Vec::new();
    let mut files = 0usize;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk '{}'", root.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path
                .extension()
                .is_none_or(|ext| !ext.eq_ignore_ascii_case("json"))
        {
            continue;
        }
        files += 1;

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                serde_json::from_str::<AnnotationFile>(&text).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(doc) => {
                for shape in doc.shapes {
                    if !vocab.contains(&shape.label) {
                        tracing::warn!(file = %path.display(), label = %shape.label, "undefined label");
                        findings.push(AuditFinding {
                            file: path.to_path_buf(),
                            issue: AuditIssue::UndefinedLabel { label: shape.label },
                        });
                    }
                }
            }
            Err(error) => {
                tracing::warn!(file = %path.display(), %error, "unreadable annotation");
                findings.push(AuditFinding {
                    file: path.to_path_buf(),
                    issue: AuditIssue::Unreadable { error },
                });
            }
        }
    }

    tracing::info!(files, findings = findings.len(), "audit complete");
    Ok(findings)
}

#[cfg(test)]
#[path = "../../tests/unit/corpus/audit.rs"]
mod tests;
