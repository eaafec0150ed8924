// Host-side tests for placard tints.
// The binary crate has no library target, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod placard {
    include!("../src/placard.rs");
}

use aviary_core::{AssetError, AssetKind, AssetSource, EntityKind, SceneGraph, Transform};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use placard::*;
use std::collections::HashMap;
use std::io::Cursor;

fn png(img: RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn red_and_blue_2x2() -> Vec<u8> {
    png(RgbaImage::from_fn(2, 2, |x, _| {
        if x == 0 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    }))
}

struct MemoryAssets(HashMap<&'static str, Vec<u8>>);

impl AssetSource for MemoryAssets {
    fn load(&self, kind: AssetKind, name: &str) -> Result<Vec<u8>, AssetError> {
        self.0.get(name).cloned().ok_or_else(|| AssetError::NotFound {
            kind,
            name: name.to_string(),
        })
    }
}

fn graph_with_placards(names: &[&str]) -> SceneGraph {
    let mut graph = SceneGraph::new();
    let root = graph.add_anchor(EntityKind::Anchor, Transform::IDENTITY);
    for name in names {
        graph.add_child(
            root,
            EntityKind::Placard {
                texture: name.to_string(),
                width: 0.2,
                depth: 0.1,
            },
            Transform::IDENTITY,
        );
    }
    graph
}

#[test]
fn average_of_small_png_is_exact() {
    let c = average_color(&red_and_blue_2x2()).unwrap();
    assert!((c[0] - 0.5).abs() < 1e-6, "{c:?}");
    assert!(c[1].abs() < 1e-6);
    assert!((c[2] - 0.5).abs() < 1e-6);
    assert_eq!(c[3], 1.0);
}

#[test]
fn large_uniform_image_keeps_its_color() {
    let img = RgbaImage::from_pixel(200, 100, Rgba([51, 102, 204, 255]));
    let c = average_color(&png(img)).unwrap();
    assert!((c[0] - 0.2).abs() < 0.01, "{c:?}");
    assert!((c[1] - 0.4).abs() < 0.01);
    assert!((c[2] - 0.8).abs() < 0.01);
}

#[test]
fn undecodable_bytes_are_an_error() {
    assert!(average_color(b"\x89PNG but not really").is_err());
    assert!(average_color(&[]).is_err());
}

#[test]
fn rebuild_tints_each_placard_and_falls_back_on_bad_images() {
    let assets = MemoryAssets(HashMap::from([
        ("good.png", red_and_blue_2x2()),
        ("broken.png", b"garbage".to_vec()),
    ]));
    let graph = graph_with_placards(&["good.png", "broken.png", "missing.png"]);
    let mut tints = PlacardTints::default();
    tints.rebuild(&graph, &assets);

    let good = tints.get("good.png");
    assert!((good[0] - 0.5).abs() < 1e-6 && (good[2] - 0.5).abs() < 1e-6);
    assert_eq!(tints.get("broken.png"), UNTEXTURED);
    assert_eq!(tints.get("missing.png"), UNTEXTURED);
    assert_eq!(tints.get("never-loaded.png"), UNTEXTURED);
}
