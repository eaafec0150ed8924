use std::collections::HashMap;

use aviary_core::{AssetKind, AssetSource, EntityKind, SceneGraph};

/// Tint used when a placard image is missing or cannot be decoded.
pub const UNTEXTURED: [f32; 4] = [0.55, 0.55, 0.55, 1.0];

/// Average RGBA color of an encoded image, in linear 0..1 units.
pub fn average_color(bytes: &[u8]) -> anyhow::Result<[f32; 4]> {
    let img = image::load_from_memory(bytes)?;
    let img = if img.width() > 32 || img.height() > 32 {
        img.thumbnail(32, 32)
    } else {
        img
    };
    let img = img.to_rgba8();
    let mut acc = [0f64; 4];
    let mut n = 0u64;
    for px in img.pixels() {
        for (a, c) in acc.iter_mut().zip(px.0.iter()) {
            *a += *c as f64 / 255.0;
        }
        n += 1;
    }
    if n == 0 {
        return Ok(UNTEXTURED);
    }
    Ok([
        (acc[0] / n as f64) as f32,
        (acc[1] / n as f64) as f32,
        (acc[2] / n as f64) as f32,
        1.0,
    ])
}

/// Placard tints keyed by texture name, rebuilt whenever the scene reloads.
#[derive(Default)]
pub struct PlacardTints {
    tints: HashMap<String, [f32; 4]>,
}

impl PlacardTints {
    pub fn rebuild<S: AssetSource + ?Sized>(&mut self, graph: &SceneGraph, assets: &S) {
        self.tints.clear();
        for id in graph.entities() {
            let Some(EntityKind::Placard { texture, .. }) = graph.kind(id) else {
                continue;
            };
            if self.tints.contains_key(texture) {
                continue;
            }
            let tint = assets
                .load(AssetKind::Image, texture)
                .map_err(anyhow::Error::from)
                .and_then(|bytes| average_color(&bytes))
                .unwrap_or_else(|e| {
                    log::warn!("[placard] {texture}: {e:#}");
                    UNTEXTURED
                });
            self.tints.insert(texture.clone(), tint);
        }
    }

    pub fn get(&self, texture: &str) -> [f32; 4] {
        self.tints.get(texture).copied().unwrap_or(UNTEXTURED)
    }
}
