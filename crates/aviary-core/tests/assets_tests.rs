// Host-side tests for asset format checks and the directory source.

use aviary_core::*;
use std::path::PathBuf;

fn glb(version: u32, declared: u32, total: usize) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(b"glTF");
    b.extend_from_slice(&version.to_le_bytes());
    b.extend_from_slice(&declared.to_le_bytes());
    b.resize(total, 0);
    b
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("aviary-assets-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn valid_glb_header_is_accepted() {
    let info = inspect_model("bird.glb", &glb(2, 20, 20)).unwrap();
    assert_eq!(info.version, 2);
    assert_eq!(info.length, 20);
}

#[test]
fn glb_header_errors() {
    assert!(matches!(inspect_model("a", b"glTF"), Err(AssetError::Malformed { .. })));
    assert!(matches!(inspect_model("a", &[0u8; 16]), Err(AssetError::Malformed { .. })));
    assert!(matches!(inspect_model("a", &glb(1, 12, 12)), Err(AssetError::Malformed { .. })));
    assert!(matches!(inspect_model("a", &glb(2, 64, 16)), Err(AssetError::Malformed { .. })));
}

#[test]
fn image_magic_detection() {
    assert_eq!(inspect_image("a.png", b"\x89PNG\r\n\x1a\nrest").unwrap(), ImageFormat::Png);
    assert_eq!(inspect_image("a.jpg", b"\xFF\xD8\xFF\xE0rest").unwrap(), ImageFormat::Jpeg);
    let err = inspect_image("a.gif", b"GIF89a").unwrap_err();
    assert!(err.to_string().contains("a.gif"));
}

#[test]
fn dir_source_reads_files_and_reports_missing() {
    let dir = scratch_dir("read");
    std::fs::write(dir.join("clip.mp3"), [1u8, 2, 3]).unwrap();
    let source = DirAssetSource::new(&dir);

    assert_eq!(source.load(AssetKind::Audio, "clip.mp3").unwrap(), vec![1, 2, 3]);
    match source.load(AssetKind::Model, "nope.glb") {
        Err(AssetError::NotFound { kind, name }) => {
            assert_eq!(kind, AssetKind::Model);
            assert_eq!(name, "nope.glb");
        }
        other => panic!("unexpected {other:?}"),
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn load_report_groups_failures_by_kind() {
    let mut report = LoadReport::default();
    assert!(report.is_clean());
    report.record(
        "Blue Jay",
        AssetKind::Audio,
        AssetError::Decode { name: "x.mp3".into(), reason: "bad frame".into() },
    );
    report.record(
        "Blue Jay",
        AssetKind::Image,
        AssetError::NotFound { kind: AssetKind::Image, name: "x.png".into() },
    );
    assert!(!report.is_clean());
    assert_eq!(report.failures_of(AssetKind::Audio).count(), 1);
    assert_eq!(report.failures_of(AssetKind::Model).count(), 0);
}

#[test]
fn default_catalog_is_fixed() {
    let birds = default_birds();
    assert_eq!(birds.len(), 5);
    let labels: Vec<&str> = birds.iter().map(|b| b.label).collect();
    assert_eq!(
        labels,
        [
            "Blue Jay",
            "Northern Cardinal",
            "Hairy Woodpecker",
            "American Herring Gull",
            "Red-Tailed Hawk"
        ]
    );
    for b in &birds {
        assert!(b.attenuation_scale > 0.0);
        assert!(b.initial_gain_db <= 0.0);
        assert_eq!(b.anchor_position.z, -1.0);
    }
}
