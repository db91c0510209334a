use super::*;
use crate::label::{raster::LabelRaster, vocab::LabelVocabulary};

fn canonical<R: AsRef<[u8]>>(rows: &[R]) -> CanonicalRaster {
    CanonicalRaster::from_canonical(
        LabelRaster::from_rows(rows).unwrap(),
        &LabelVocabulary::default(),
    )
    .unwrap()
}

#[test]
fn detects_changed_unchanged_and_unlabeled() {
    let a = canonical(&[[0u8, 1], [1, 2]]);
    let b = canonical(&[[0u8, 2], [1, 1]]);
    let cd = detect_change(&a, &b).unwrap();
    assert_eq!(cd.data(), &[0, 2, 1, 2]);
    assert_eq!(cd.get(0, 1), Some(ChangeClass::Changed));
    assert_eq!(cd.get(1, 0), Some(ChangeClass::Unchanged));
    assert_eq!(cd.changed_pixels(), 2);
    assert_eq!(cd.total_pixels(), 4);
}

#[test]
fn unlabeled_overrides_a_real_difference() {
    let a = canonical(&[[0u8, 3, 4]]);
    let b = canonical(&[[5u8, 0, 4]]);
    let cd = detect_change(&a, &b).unwrap();
    assert_eq!(cd.data(), &[0, 0, 1]);
    assert_eq!(cd.count(ChangeClass::Unlabeled), 2);
}

#[test]
fn detection_is_symmetric_and_bounded() {
    let a = canonical(&[[0u8, 1, 2, 3], [4, 5, 6, 7], [8, 0, 8, 2]]);
    let b = canonical(&[[1u8, 1, 0, 4], [4, 6, 6, 0], [2, 0, 8, 3]]);
    let ab = detect_change(&a, &b).unwrap();
    let ba = detect_change(&b, &a).unwrap();
    assert_eq!(ab, ba);

    for (i, &v) in ab.data().iter().enumerate() {
        assert!(v <= 2);
        let unlabeled = a.data()[i] == 0 || b.data()[i] == 0;
        assert_eq!(v == 0, unlabeled);
    }
}

#[test]
fn shape_mismatch_is_reported() {
    let a = canonical(&[[0u8, 1]]);
    let b = canonical(&[[0u8], [1]]);
    let err = detect_change(&a, &b).unwrap_err();
    assert!(matches!(
        err,
        LabelError::ShapeMismatch {
            left: (1, 2),
            right: (2, 1)
        }
    ));
}

#[test]
fn change_raster_rejects_foreign_values() {
    assert!(ChangeRaster::new(Shape::new(1, 2), vec![0, 2]).is_ok());
    assert!(matches!(
        ChangeRaster::new(Shape::new(1, 2), vec![0, 3]),
        Err(LabelError::Format(_))
    ));
    assert!(ChangeRaster::new(Shape::new(1, 2), vec![0]).is_err());
}
