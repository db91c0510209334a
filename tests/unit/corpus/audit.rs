use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "labelstat_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn reports_undefined_labels_and_broken_files() {
    let tmp = temp_dir("audit");
    std::fs::create_dir_all(tmp.join("sub")).unwrap();
    std::fs::write(
        tmp.join("a.json"),
        r#"{"version": "4.5.6", "shapes": [
            {"label": "water", "points": [[0, 0], [1, 1]], "shape_type": "polygon"},
            {"label": "lake", "points": [], "shape_type": "polygon"}
        ], "imagePath": "a.png"}"#,
    )
    .unwrap();
    std::fs::write(tmp.join("sub/b.json"), "{not json").unwrap();
    std::fs::write(tmp.join("sub/c.json"), r#"{"shapes": [{"label": "road"}]}"#).unwrap();
    std::fs::write(tmp.join("notes.txt"), "lake").unwrap();

    let findings = audit_annotations(&tmp, &LabelVocabulary::default()).unwrap();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].file, tmp.join("a.json"));
    assert_eq!(
        findings[0].issue,
        AuditIssue::UndefinedLabel {
            label: "lake".to_string()
        }
    );
    assert_eq!(findings[1].file, tmp.join("sub/b.json"));
    assert!(matches!(findings[1].issue, AuditIssue::Unreadable { .. }));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn finding_serializes_flat() {
    let f = AuditFinding {
        file: PathBuf::from("x.json"),
        issue: AuditIssue::UndefinedLabel {
            label: "lake".to_string(),
        },
    };
    let v = serde_json::to_value(&f).unwrap();
    assert_eq!(v["kind"], "undefined_label");
    assert_eq!(v["label"], "lake");
    assert_eq!(v["file"], "x.json");
}
