use super::*;
use crate::corpus::stats::ClassCount;

fn totals() -> StatsTotals {
    StatsTotals {
        classes: vec![
            ClassCount {
                name: "_background_".to_string(),
                pixels: 10,
            },
            ClassCount {
                name: "water".to_string(),
                pixels: 6,
            },
        ],
        changed: 3,
        all: 16,
    }
}

fn temp_dir(name: &str) -> std::path::PathBuf {
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
fn table_columns_end_with_change_counters() {
    let t = StatsTable::from(&totals());
    assert_eq!(t.columns, vec!["_background_", "water", "changed", "all"]);
    assert_eq!(t.values, vec![10, 6, 3, 16]);
    assert_eq!(t.to_csv(), "_background_,water,changed,all\n10,6,3,16\n");
}

#[test]
fn csv_quotes_awkward_names() {
    assert_eq!(csv_field("a,b"), "\"a,b\"");
    assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(csv_field("plain"), "plain");
}

#[test]
fn writes_csv_or_json_by_extension() {
    let tmp = temp_dir("export_table");
    let csv = tmp.join("stats.csv");
    let json = tmp.join("out/stats.json");

    write_stats(&csv, &totals()).unwrap();
    write_stats(&json, &totals()).unwrap();

    assert!(std::fs::read_to_string(&csv).unwrap().starts_with("_background_,"));
    let back: StatsTotals =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(back, totals());

    std::fs::remove_dir_all(&tmp).ok();
}
