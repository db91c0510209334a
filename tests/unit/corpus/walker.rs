use super::*;
use crate::{
    codec::indexed,
    label::raster::{LabelRaster, NAMES_FILE},
    label::vocab::DEFAULT_CLASS_NAMES,
};

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

fn write_label(dir: &Path, rows: &[&[u8]], names: &[&str]) {
    let raster = LabelRaster::from_rows(rows).unwrap();
    indexed::write_index_png(
        &dir.join(LABEL_FILE),
        &raster.to_index_image(),
        &indexed::label_colormap(),
    )
    .unwrap();
    std::fs::write(dir.join(NAMES_FILE), names.join("\n") + "\n").unwrap();
}

/// One semantic directory plus one legacy pairwise directory with a single matched patch.
fn build_corpus(root: &Path) {
    write_label(
        &root.join("scene1"),
        &[&[0, 1], &[2, 2]],
        &["_background_", "water", "farmland"],
    );
    let pairs = root.join("pairs");
    std::fs::create_dir_all(&pairs).unwrap();
    std::fs::write(pairs.join("pin.txt"), b"").unwrap();
    write_label(
        &pairs.join("2019/2019_0001_json"),
        &[&[0, 1], &[1, 8]],
        &DEFAULT_CLASS_NAMES,
    );
    // Canonical [[0, 2], [1, 5]] through a permuted local name list.
    write_label(
        &pairs.join("2020/2020_0001_json"),
        &[&[0, 3], &[2, 1]],
        &["_background_", "otherthings", "water", "farmland"],
    );
}

fn walker(opts: WalkOptions) -> CorpusWalker {
    CorpusWalker::new(LabelVocabulary::default(), opts).unwrap()
}

#[test]
fn semantic_and_pairwise_totals() {
    let tmp = temp_dir("walker_totals");
    build_corpus(&tmp);

    let out = walker(WalkOptions::default()).run(&tmp).unwrap();
    assert!(out.skipped.is_empty());
    assert_eq!(out.totals.labeled_total(), 4);
    assert_eq!(out.totals.class_pixels("_background_"), Some(1));
    assert_eq!(out.totals.class_pixels("water"), Some(1));
    assert_eq!(out.totals.class_pixels("farmland"), Some(2));
    // Road masked as otherthings: only the water/farmland pixel changed.
    assert_eq!(out.totals.changed, 1);
    assert_eq!(out.totals.all, 4);

    let written = indexed::read_index_png(&tmp.join("pairs/2019--2020-0001-change.png")).unwrap();
    assert_eq!(written.data, vec![0, 2, 1, 1]);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn discovery_order_and_claiming() {
    let tmp = temp_dir("walker_discover");
    build_corpus(&tmp);

    let found = walker(WalkOptions::default()).discover(&tmp).unwrap();
    assert_eq!(found.jobs.len(), 2);
    assert!(matches!(&found.jobs[0], Job::Pair(p) if p.patch == "0001"));
    assert_eq!(found.jobs[1], Job::Semantic(tmp.join("scene1").join(LABEL_FILE)));

    let opts = WalkOptions {
        descend_into_pairwise: true,
        ..WalkOptions::default()
    };
    let found = walker(opts).discover(&tmp).unwrap();
    let semantic = found
        .jobs
        .iter()
        .filter(|j| matches!(j, Job::Semantic(_)))
        .count();
    assert_eq!(semantic, 3);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_counterpart_and_shape_mismatch_are_skipped() {
    let tmp = temp_dir("walker_skips");
    build_corpus(&tmp);
    let pairs = tmp.join("pairs");
    write_label(&pairs.join("2019/2019_0002_json"), &[&[1, 1]], &DEFAULT_CLASS_NAMES);
    write_label(&pairs.join("2019/2019_0003_json"), &[&[1, 1]], &DEFAULT_CLASS_NAMES);
    write_label(&pairs.join("2020/2020_0003_json"), &[&[1], &[1]], &DEFAULT_CLASS_NAMES);

    let out = walker(WalkOptions::default()).run(&tmp).unwrap();
    assert_eq!(out.skipped.len(), 2);
    assert_eq!(out.skipped[0].path, pairs.join("2020/2020_0002_json"));
    assert!(out.skipped[0].reason.contains("missing counterpart"));
    assert_eq!(out.skipped[1].path, pairs.join("2019--2020-0003-change.png"));
    assert!(out.skipped[1].reason.contains("shape mismatch"));
    // The good pair still counts.
    assert_eq!(out.totals.changed, 1);
    assert_eq!(out.totals.all, 4);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn unreadable_rasters_and_name_lists_are_skipped() {
    let tmp = temp_dir("walker_format");
    build_corpus(&tmp);

    let bad_names = tmp.join("bad_names");
    write_label(&bad_names, &[&[0, 1]], &DEFAULT_CLASS_NAMES);
    std::fs::write(bad_names.join(NAMES_FILE), b"_background_\n\xff\xfe\n").unwrap();

    let bad_png = tmp.join("bad_png");
    std::fs::create_dir_all(&bad_png).unwrap();
    std::fs::write(bad_png.join(LABEL_FILE), b"\x89PNG truncated").unwrap();
    std::fs::write(bad_png.join(NAMES_FILE), "_background_\n").unwrap();

    for parallel in [false, true] {
        let opts = WalkOptions {
            parallel,
            write_change_rasters: false,
            ..WalkOptions::default()
        };
        let out = walker(opts).run(&tmp).unwrap();
        let paths: Vec<PathBuf> = out.skipped.iter().map(|s| s.path.clone()).collect();
        assert_eq!(
            paths,
            vec![bad_names.join(LABEL_FILE), bad_png.join(LABEL_FILE)]
        );
        assert!(out.skipped.iter().all(|s| s.reason.starts_with("format error")));
        assert_eq!(out.totals.labeled_total(), 4);
        assert_eq!(out.totals.changed, 1);
    }

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn malformed_patch_folder_is_reported_at_the_folder() {
    let tmp = temp_dir("walker_malformed");
    build_corpus(&tmp);
    let odd = tmp.join("pairs/2019/scan");
    std::fs::create_dir_all(&odd).unwrap();

    let out = walker(WalkOptions::default()).run(&tmp).unwrap();
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].path, odd);
    assert!(out.skipped[0].reason.starts_with("format error"));
    assert_eq!(out.totals.changed, 1);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn vocabulary_policy_strict_vs_report() {
    let tmp = temp_dir("walker_policy");
    build_corpus(&tmp);
    write_label(&tmp.join("scene2"), &[&[0, 1]], &["_background_", "lake"]);

    let err = walker(WalkOptions::default()).run(&tmp).unwrap_err();
    assert!(matches!(err, LabelError::UnknownLabel { ref name } if name == "lake"));

    let opts = WalkOptions {
        vocabulary_policy: VocabularyPolicy::Report,
        ..WalkOptions::default()
    };
    let out = walker(opts).run(&tmp).unwrap();
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].path, tmp.join("scene2").join(LABEL_FILE));
    assert_eq!(out.totals.labeled_total(), 4);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn existing_change_rasters_are_counted() {
    let tmp = temp_dir("walker_existing");
    build_corpus(&tmp);
    let derive = WalkOptions::default();
    walker(derive).run(&tmp).unwrap();

    let opts = WalkOptions {
        change_source: ChangeSource::Existing,
        ..WalkOptions::default()
    };
    let out = walker(opts).run(&tmp).unwrap();
    assert_eq!(out.totals.changed, 1);
    assert_eq!(out.totals.all, 4);
    // Pairwise members stay claimed, so class totals match the derive run.
    assert_eq!(out.totals.labeled_total(), 4);

    let opts = WalkOptions {
        change_source: ChangeSource::Existing,
        descend_into_pairwise: true,
        ..WalkOptions::default()
    };
    let out = walker(opts).run(&tmp).unwrap();
    assert_eq!(out.totals.changed, 1);
    assert_eq!(out.totals.labeled_total(), 12);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn parallel_matches_sequential() {
    let tmp = temp_dir("walker_parallel");
    build_corpus(&tmp);
    write_label(&tmp.join("scene2"), &[&[3, 3, 4]], &DEFAULT_CLASS_NAMES);

    let seq = walker(WalkOptions {
        write_change_rasters: false,
        ..WalkOptions::default()
    })
    .run(&tmp)
    .unwrap();
    let par = walker(WalkOptions {
        write_change_rasters: false,
        parallel: true,
        threads: Some(2),
        ..WalkOptions::default()
    })
    .run(&tmp)
    .unwrap();
    assert_eq!(seq.totals, par.totals);
    assert!(!tmp.join("pairs/2019--2020-0001-change.png").exists());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn alt_layout_pairs_members() {
    let tmp = temp_dir("walker_alt");
    let number = tmp.join("pol/017");
    std::fs::create_dir_all(&number).unwrap();
    std::fs::write(tmp.join("pol/pin-2.txt"), b"").unwrap();
    write_label(&number.join("HH"), &[&[1, 2, 0]], &DEFAULT_CLASS_NAMES);
    write_label(&number.join("VV"), &[&[1, 3, 4]], &DEFAULT_CLASS_NAMES);

    let out = walker(WalkOptions::default()).run(&tmp).unwrap();
    assert_eq!(out.totals.changed, 1);
    assert_eq!(out.totals.all, 3);
    assert_eq!(out.totals.labeled_total(), 0);
    assert!(tmp.join("pol/HH--VV-017-change.png").is_file());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn invalid_options_are_rejected() {
    let vocab = LabelVocabulary::default();
    let bad_mask = WalkOptions {
        mask_pairs: vec![MaskPair::new("lake", "water")],
        ..WalkOptions::default()
    };
    assert!(CorpusWalker::new(vocab.clone(), bad_mask).is_err());

    let bad_width = WalkOptions {
        patch_id_width: 0,
        ..WalkOptions::default()
    };
    assert!(CorpusWalker::new(vocab.clone(), bad_width).is_err());

    let bad_threads = WalkOptions {
        threads: Some(0),
        ..WalkOptions::default()
    };
    assert!(CorpusWalker::new(vocab.clone(), bad_threads).is_err());

    let w = CorpusWalker::new(vocab, WalkOptions::default()).unwrap();
    assert!(w.run(Path::new("/definitely/not/here")).is_err());
}
