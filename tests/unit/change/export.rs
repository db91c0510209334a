use super::*;
use crate::foundation::core::Shape;

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
fn colormap_starts_with_change_palette() {
    let cmap = change_colormap();
    assert_eq!(cmap.len(), 256);
    assert_eq!(&cmap[..3], &CHANGE_PALETTE);
    assert_eq!(cmap[3], indexed::label_colormap()[3]);
}

#[test]
fn written_change_raster_reads_back() {
    let tmp = temp_dir("change_export");
    let path = tmp.join("a--b-0001-change.png");
    let change = ChangeRaster::new(Shape::new(2, 2), vec![0, 1, 2, 2]).unwrap();

    write_change_png(&path, &change).unwrap();
    let back = read_change_png(&path).unwrap();
    assert_eq!(back, change);
    assert_eq!(back.changed_pixels(), 2);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn foreign_values_are_format_errors() {
    let tmp = temp_dir("change_foreign");
    let path = tmp.join("x-change.png");
    let image = IndexImage {
        shape: Shape::new(1, 2),
        data: vec![1, 5],
    };
    indexed::write_index_png(&path, &image, &indexed::label_colormap()).unwrap();
    assert!(matches!(read_change_png(&path), Err(LabelError::Format(_))));
    assert!(matches!(
        read_change_png(&tmp.join("x-change.jpg")),
        Err(LabelError::Format(_))
    ));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn change_file_names() {
    assert!(is_change_file("2019--2020-0012-change.png"));
    assert!(!is_change_file("label.png"));
    assert!(!is_change_file("a-change.txt"));
}
