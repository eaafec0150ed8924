//! Scene setup, reset and the per-frame hook.
//!
//! [`SceneController`] owns the scene graph, the origin and camera anchors and
//! the tracked-object registry. Hosts drive it with three calls: [`load`] once
//! at startup, [`set_viewer_pose`] + [`on_frame`] every frame, and
//! [`process_signal`] when the user presses reset.
//!
//! [`load`]: SceneController::load
//! [`set_viewer_pose`]: SceneController::set_viewer_pose
//! [`on_frame`]: SceneController::on_frame
//! [`process_signal`]: SceneController::process_signal

use glam::Quat;

use crate::assets::{
    inspect_image, inspect_model, AssetError, AssetKind, AssetSource, LoadReport,
};
use crate::attenuation::GainRange;
use crate::catalog::{label_offset, BirdSpec};
use crate::constants::{
    placard_offset_vec3, LABEL_FONT_SIZE, PLACARD_DEPTH, PLACARD_PITCH, PLACARD_WIDTH,
};
use crate::gesture::Gesture;
use crate::registry::{ChannelHandle, ObjectId, TrackedObjectRegistry};
use crate::scene::{EntityId, EntityKind, SceneGraph, Transform};
use crate::updater::{ChannelGainSink, ProximityAttenuator};

/// Signals raised by the UI layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiSignal {
    Reset,
}

/// Audio backend able to turn clip bytes into a playing channel.
pub trait AudioEngine: ChannelGainSink {
    fn prepare(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        looping: bool,
    ) -> Result<ChannelHandle, AssetError>;
    fn play(&mut self, channel: ChannelHandle);
    /// Stop and drop every channel. Handles issued before are invalid afterwards.
    fn release_all(&mut self);
}

/// Runtime parameters for the scene.
#[derive(Clone, Debug, Default)]
pub struct SceneConfig {
    /// Optional bounds applied to every per-frame gain.
    pub gain_clamp: Option<GainRange>,
    /// Log each object's offset and gain at trace level every frame.
    pub trace_gains: bool,
}

pub struct SceneController {
    graph: SceneGraph,
    origin: EntityId,
    pov: EntityId,
    catalog: Vec<BirdSpec>,
    registry: TrackedObjectRegistry,
    attenuator: ProximityAttenuator,
}

impl SceneController {
    pub fn new(catalog: Vec<BirdSpec>, config: SceneConfig) -> Self {
        let mut graph = SceneGraph::new();
        let origin = graph.add_anchor(EntityKind::Anchor, Transform::IDENTITY);
        let pov = graph.add_anchor(EntityKind::Camera, Transform::IDENTITY);
        let mut attenuator = ProximityAttenuator::new(config.gain_clamp);
        attenuator.trace = config.trace_gains;
        Self {
            graph,
            origin,
            pov,
            catalog,
            registry: TrackedObjectRegistry::new(),
            attenuator,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn registry(&self) -> &TrackedObjectRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &[BirdSpec] {
        &self.catalog
    }

    pub fn origin(&self) -> EntityId {
        self.origin
    }

    pub fn pov(&self) -> EntityId {
        self.pov
    }

    /// Place every bird of the catalog and start its audio.
    ///
    /// Each asset is loaded independently; failures land in the returned
    /// report and the remaining birds still load. Loading an already
    /// populated scene clears it first, exactly as [`reset`](Self::reset) does.
    pub fn load<S, A>(&mut self, assets: &S, audio: &mut A) -> LoadReport
    where
        S: AssetSource + ?Sized,
        A: AudioEngine + ?Sized,
    {
        if !self.registry.is_empty() || !self.graph.children(self.origin).is_empty() {
            self.clear(audio);
        }
        self.populate(assets, audio)
    }

    fn populate<S, A>(&mut self, assets: &S, audio: &mut A) -> LoadReport
    where
        S: AssetSource + ?Sized,
        A: AudioEngine + ?Sized,
    {
        let mut report = LoadReport::default();
        let catalog = self.catalog.clone();
        for bird in &catalog {
            let Some(entity) = self.place_bird(bird, assets, &mut report) else {
                continue;
            };
            let id = self
                .registry
                .register(bird.label, entity, bird.attenuation_scale);
            report.objects += 1;
            if let Some(channel) = start_clip(bird, assets, audio, &mut report) {
                self.registry.attach_channel(id, channel);
                report.channels += 1;
            }
        }
        log::info!(
            "[scene] loaded {} objects, {} channels, {} failures",
            report.objects,
            report.channels,
            report.failures.len()
        );
        report
    }

    fn place_bird<S>(
        &mut self,
        bird: &BirdSpec,
        assets: &S,
        report: &mut LoadReport,
    ) -> Option<EntityId>
    where
        S: AssetSource + ?Sized,
    {
        let entity = self.graph.add_child(
            self.origin,
            EntityKind::Anchor,
            Transform::from_translation(bird.anchor_position),
        )?;

        match assets
            .load(AssetKind::Model, bird.model)
            .and_then(|bytes| inspect_model(bird.model, &bytes))
        {
            Ok(info) => {
                log::debug!(
                    "[scene] {} model {} ({} bytes)",
                    bird.label,
                    info.name,
                    info.length
                );
                self.graph.add_child(
                    entity,
                    EntityKind::Model {
                        asset: bird.model.to_string(),
                    },
                    Transform::from_translation(bird.model_offset)
                        .with_rotation(bird.model_rotation())
                        .with_uniform_scale(bird.model_scale),
                );
            }
            Err(e) => report.record(bird.label, AssetKind::Model, e),
        }

        match assets
            .load(AssetKind::Image, bird.placard)
            .and_then(|bytes| inspect_image(bird.placard, &bytes))
        {
            Ok(_) => {
                self.graph.add_child(
                    entity,
                    EntityKind::Placard {
                        texture: bird.placard.to_string(),
                        width: PLACARD_WIDTH,
                        depth: PLACARD_DEPTH,
                    },
                    Transform::from_translation(placard_offset_vec3())
                        .with_rotation(Quat::from_rotation_x(PLACARD_PITCH)),
                );
            }
            Err(e) => report.record(bird.label, AssetKind::Image, e),
        }

        self.graph.add_child(
            entity,
            EntityKind::Label {
                text: bird.label.to_string(),
                font_size: LABEL_FONT_SIZE,
            },
            Transform::from_translation(label_offset(bird.label)),
        );
        Some(entity)
    }

    /// Clear the scene and rebuild it from scratch.
    pub fn reset<S, A>(&mut self, assets: &S, audio: &mut A) -> LoadReport
    where
        S: AssetSource + ?Sized,
        A: AudioEngine + ?Sized,
    {
        self.clear(audio);
        self.populate(assets, audio)
    }

    /// Release every channel, drop the origin's descendants and forget all
    /// tracked objects.
    fn clear<A: AudioEngine + ?Sized>(&mut self, audio: &mut A) {
        audio.release_all();
        let removed = self.graph.remove_children(self.origin);
        self.registry.clear();
        log::info!("[scene] cleared {removed} entities");
    }

    pub fn process_signal<S, A>(
        &mut self,
        signal: UiSignal,
        assets: &S,
        audio: &mut A,
    ) -> LoadReport
    where
        S: AssetSource + ?Sized,
        A: AudioEngine + ?Sized,
    {
        match signal {
            UiSignal::Reset => self.reset(assets, audio),
        }
    }

    /// Move the camera-following anchor to the viewer's current pose.
    pub fn set_viewer_pose(&mut self, pose: Transform) {
        if let Some(t) = self.graph.transform_mut(self.pov) {
            *t = pose;
        }
    }

    /// Per-frame hook: recompute and push every channel gain.
    pub fn on_frame<G>(&self, sink: &mut G) -> usize
    where
        G: ChannelGainSink + ?Sized,
    {
        self.attenuator
            .update(&self.registry, self.pov, &self.graph, sink)
    }

    /// Apply a manipulation gesture to a tracked object's anchor.
    pub fn apply_gesture(&mut self, object: ObjectId, gesture: Gesture) -> bool {
        let Some(entity) = self.registry.get(object).map(|o| o.entity) else {
            return false;
        };
        match self.graph.transform_mut(entity) {
            Some(t) => {
                gesture.apply(t);
                true
            }
            None => false,
        }
    }
}

fn start_clip<S, A>(
    bird: &BirdSpec,
    assets: &S,
    audio: &mut A,
    report: &mut LoadReport,
) -> Option<ChannelHandle>
where
    S: AssetSource + ?Sized,
    A: AudioEngine + ?Sized,
{
    let prepared = assets
        .load(AssetKind::Audio, bird.clip)
        .and_then(|bytes| audio.prepare(bird.clip, bytes, true));
    match prepared {
        Ok(channel) => {
            audio.set_gain(channel, bird.initial_gain_db);
            audio.play(channel);
            Some(channel)
        }
        Err(e) => {
            report.record(bird.label, AssetKind::Audio, e);
            None
        }
    }
}
