// Host-side tests for the proximity falloff and the per-frame updater.

use aviary_core::*;
use glam::Vec3;
use std::collections::HashMap;

#[derive(Default)]
struct RecordingSink {
    writes: Vec<(ChannelHandle, f32)>,
}

impl ChannelGainSink for RecordingSink {
    fn set_gain(&mut self, channel: ChannelHandle, gain_db: f32) {
        self.writes.push((channel, gain_db));
    }
}

/// Positions are looked up by the entity the viewer is measured against.
struct FixedOffsets {
    offsets: HashMap<EntityId, Vec3>,
}

impl RelativePositionSource for FixedOffsets {
    fn position_relative_to(&self, _of: EntityId, relative_to: EntityId) -> Vec3 {
        self.offsets.get(&relative_to).copied().unwrap_or(Vec3::ZERO)
    }
}

fn entities(n: usize) -> (SceneGraph, Vec<EntityId>) {
    let mut graph = SceneGraph::new();
    let ids = (0..n)
        .map(|_| graph.add_anchor(EntityKind::Anchor, Transform::IDENTITY))
        .collect();
    (graph, ids)
}

#[test]
fn gain_matches_product_formula_exactly() {
    for xi in -8..=8 {
        for zi in -8..=8 {
            let delta = Vec3::new(xi as f32 * 0.25, 0.7, zi as f32 * 0.5);
            for k in [1.0_f32, 20.0, 60.0, 80.0] {
                let expected = -((delta.x * delta.z).abs() * k);
                assert_eq!(proximity_gain_db(delta, k), expected, "delta={delta:?} k={k}");
            }
        }
    }
}

#[test]
fn zero_offset_is_unity_for_any_scale() {
    for k in [0.0_f32, 1.0, 20.0, 60.0, 80.0, 1000.0] {
        assert_eq!(proximity_gain_db(Vec3::ZERO, k), 0.0);
    }
}

#[test]
fn gain_is_symmetric_under_axis_sign_flip() {
    for (x, z) in [(1.0_f32, 2.0_f32), (0.3, -1.7), (-2.5, 0.4), (4.0, 4.0)] {
        let base = proximity_gain_db(Vec3::new(x, 0.0, z), 80.0);
        assert_eq!(proximity_gain_db(Vec3::new(-x, 0.0, z), 80.0), base);
        assert_eq!(proximity_gain_db(Vec3::new(x, 0.0, -z), 80.0), base);
    }
}

#[test]
fn vertical_offset_does_not_attenuate() {
    let flat = proximity_gain_db(Vec3::new(1.0, 0.0, 2.0), 60.0);
    let raised = proximity_gain_db(Vec3::new(1.0, 3.0, 2.0), 60.0);
    assert_eq!(flat, raised);
}

#[test]
fn on_axis_viewer_hears_full_volume_at_any_range() {
    for d in [0.1_f32, 1.0, 10.0, 100.0] {
        assert_eq!(proximity_gain_db(Vec3::new(0.0, 0.0, d), 80.0), 0.0);
        assert_eq!(proximity_gain_db(Vec3::new(d, 0.0, 0.0), 80.0), 0.0);
    }
}

#[test]
fn scenario_diagonal_offset_scale_80() {
    let delta = Vec3::new(1.0, 0.0, 2.0);
    assert_eq!(ray_magnitude(delta, 80.0), 160.0);
    assert_eq!(proximity_gain_db(delta, 80.0), -160.0);
}

#[test]
fn scenario_straight_ahead_scale_20() {
    assert_eq!(proximity_gain_db(Vec3::new(0.0, 0.0, 5.0), 20.0), 0.0);
}

#[test]
fn scenario_diagonal_offset_scale_60() {
    assert_eq!(proximity_gain_db(Vec3::new(2.0, 0.0, 3.0), 60.0), -360.0);
}

#[test]
fn db_to_linear_reference_points() {
    assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
    assert!((db_to_linear(-20.0) - 0.1).abs() < 1e-6);
    assert!((db_to_linear(-40.0) - 0.01).abs() < 1e-7);
    assert!(db_to_linear(-360.0) < 1e-12);
}

#[test]
fn updater_writes_each_channel_once() {
    let (_graph, ids) = entities(3);
    let mut registry = TrackedObjectRegistry::new();
    let scales = [80.0, 20.0, 60.0];
    for (i, e) in ids.iter().enumerate() {
        let id = registry.register(format!("bird{i}"), *e, scales[i]);
        registry.attach_channel(id, ChannelHandle(i));
    }
    let positions = FixedOffsets {
        offsets: HashMap::from([
            (ids[0], Vec3::new(1.0, 0.0, 2.0)),
            (ids[1], Vec3::new(0.0, 0.0, 5.0)),
            (ids[2], Vec3::new(2.0, 0.0, 3.0)),
        ]),
    };
    let viewer = ids[0];
    let attenuator = ProximityAttenuator::default();
    let mut sink = RecordingSink::default();
    let written = attenuator.update(&registry, viewer, &positions, &mut sink);

    assert_eq!(written, 3);
    assert_eq!(
        sink.writes,
        vec![
            (ChannelHandle(0), -160.0),
            (ChannelHandle(1), 0.0),
            (ChannelHandle(2), -360.0),
        ]
    );
}

#[test]
fn updater_skips_objects_without_channel() {
    let (_graph, ids) = entities(2);
    let mut registry = TrackedObjectRegistry::new();
    registry.register("silent", ids[0], 80.0);
    let voiced = registry.register("voiced", ids[1], 80.0);
    registry.attach_channel(voiced, ChannelHandle(7));
    let positions = FixedOffsets {
        offsets: HashMap::from([(ids[0], Vec3::ONE), (ids[1], Vec3::ONE)]),
    };
    let attenuator = ProximityAttenuator::default();
    let mut sink = RecordingSink::default();
    let written = attenuator.update(&registry, ids[0], &positions, &mut sink);

    assert_eq!(written, 1);
    assert_eq!(sink.writes, vec![(ChannelHandle(7), -80.0)]);
}

#[test]
fn updater_is_idempotent() {
    let (_graph, ids) = entities(2);
    let mut registry = TrackedObjectRegistry::new();
    for (i, e) in ids.iter().enumerate() {
        let id = registry.register("b", *e, 80.0);
        registry.attach_channel(id, ChannelHandle(i));
    }
    let positions = FixedOffsets {
        offsets: HashMap::from([
            (ids[0], Vec3::new(0.3, 0.0, -0.9)),
            (ids[1], Vec3::new(-1.2, 0.5, 0.4)),
        ]),
    };
    let attenuator = ProximityAttenuator::default();
    let mut first = RecordingSink::default();
    let mut second = RecordingSink::default();
    attenuator.update(&registry, ids[0], &positions, &mut first);
    attenuator.update(&registry, ids[0], &positions, &mut second);
    assert_eq!(first.writes, second.writes);
}

#[test]
fn configured_clamp_bounds_gains() {
    let range = GainRange::new(-100.0, 0.0);
    let attenuator = ProximityAttenuator::new(Some(range));
    assert_eq!(attenuator.gain_for(Vec3::new(2.0, 0.0, 3.0), 60.0), -100.0);
    let near = Vec3::new(0.1, 0.0, 0.1);
    assert_eq!(attenuator.gain_for(near, 80.0), proximity_gain_db(near, 80.0));
    assert_eq!(attenuator.gain_for(Vec3::ZERO, 80.0), 0.0);
}

#[test]
fn unclamped_attenuator_allows_arbitrarily_negative_gain() {
    let attenuator = ProximityAttenuator::default();
    assert_eq!(attenuator.gain_for(Vec3::new(10.0, 0.0, 10.0), 80.0), -8000.0);
}

#[derive(Default)]
struct PanSink {
    pans: Vec<(ChannelHandle, f32)>,
}

impl ChannelGainSink for PanSink {
    fn set_gain(&mut self, _channel: ChannelHandle, _gain_db: f32) {}

    fn set_pan(&mut self, channel: ChannelHandle, pan: f32) {
        self.pans.push((channel, pan));
    }
}

#[test]
fn stereo_pan_follows_lateral_direction() {
    assert_eq!(stereo_pan(Vec3::ZERO), 0.0);
    assert_eq!(stereo_pan(Vec3::new(0.0, 2.0, 0.0)), 0.0);
    assert_eq!(stereo_pan(Vec3::new(0.0, 0.0, -3.0)), 0.0);
    assert_eq!(stereo_pan(Vec3::new(-2.0, 0.0, 0.0)), -1.0);
    assert_eq!(stereo_pan(Vec3::new(4.0, 1.0, 0.0)), 1.0);
    let diag = stereo_pan(Vec3::new(1.0, 0.0, -1.0));
    assert!((diag - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
}

#[test]
fn updater_pans_by_position_in_viewer_frame() {
    let mut graph = SceneGraph::new();
    let viewer = graph.add_anchor(EntityKind::Camera, Transform::IDENTITY);
    let left_of_viewer = Transform::from_translation(Vec3::new(-1.0, 0.0, -1.0));
    let right_of_viewer = Transform::from_translation(Vec3::new(1.0, 0.0, -1.0));
    let left = graph.add_anchor(EntityKind::Anchor, left_of_viewer);
    let right = graph.add_anchor(EntityKind::Anchor, right_of_viewer);
    let mut registry = TrackedObjectRegistry::new();
    for (i, e) in [left, right].into_iter().enumerate() {
        let id = registry.register("b", e, 80.0);
        registry.attach_channel(id, ChannelHandle(i));
    }

    let attenuator = ProximityAttenuator::default();
    let mut sink = PanSink::default();
    attenuator.update(&registry, viewer, &graph, &mut sink);
    assert!(sink.pans[0].1 < -0.5, "{:?}", sink.pans);
    assert!(sink.pans[1].1 > 0.5, "{:?}", sink.pans);

    // Turned around, the same birds swap sides.
    if let Some(t) = graph.transform_mut(viewer) {
        t.rotation = glam::Quat::from_rotation_y(std::f32::consts::PI);
    }
    let mut turned = PanSink::default();
    attenuator.update(&registry, viewer, &graph, &mut turned);
    assert!(turned.pans[0].1 > 0.5, "{:?}", turned.pans);
    assert!(turned.pans[1].1 < -0.5, "{:?}", turned.pans);
}
