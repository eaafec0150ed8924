//! Per-frame proximity attenuation.
//!
//! Each rendered frame the viewer's position is expressed in every tracked
//! object's local frame and turned into a channel gain with
//! [`proximity_gain_db`]. The object's position in the viewer's frame gives
//! the channel's stereo pan ([`stereo_pan`]). Nothing is carried between
//! frames: the result is a pure function of the current positions and the
//! per-object scale.

use glam::Vec3;

use crate::attenuation::{proximity_gain_db, stereo_pan, GainRange};
use crate::registry::{ChannelHandle, TrackedObjectRegistry};
use crate::scene::EntityId;

/// "Position of entity A relative to entity B" as answered by the host scene.
pub trait RelativePositionSource {
    fn position_relative_to(&self, of: EntityId, relative_to: EntityId) -> Vec3;
}

/// Receives one gain write (and one pan write) per tracked object per frame.
pub trait ChannelGainSink {
    fn set_gain(&mut self, channel: ChannelHandle, gain_db: f32);

    /// Stereo placement in `-1.0..=1.0`, negative is left. Sinks without
    /// spatial output ignore it.
    fn set_pan(&mut self, _channel: ChannelHandle, _pan: f32) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProximityAttenuator {
    pub clamp: Option<GainRange>,
    pub trace: bool,
}

impl ProximityAttenuator {
    pub fn new(clamp: Option<GainRange>) -> Self {
        Self {
            clamp,
            trace: false,
        }
    }

    /// Gain for a single viewer offset, with the configured clamp applied.
    #[inline]
    pub fn gain_for(&self, delta: Vec3, scale: f32) -> f32 {
        let db = proximity_gain_db(delta, scale);
        match self.clamp {
            Some(range) => range.clamp(db),
            None => db,
        }
    }

    /// Push a fresh gain and pan to every tracked object's channel.
    ///
    /// Objects without a channel are skipped for this frame. Returns the
    /// number of channels written.
    pub fn update<P, S>(
        &self,
        registry: &TrackedObjectRegistry,
        viewer: EntityId,
        positions: &P,
        sink: &mut S,
    ) -> usize
    where
        P: RelativePositionSource + ?Sized,
        S: ChannelGainSink + ?Sized,
    {
        let mut written = 0;
        for object in registry.iter() {
            let Some(channel) = object.channel else {
                continue;
            };
            let delta = positions.position_relative_to(viewer, object.entity);
            let gain = self.gain_for(delta, object.attenuation_scale);
            let pan = stereo_pan(positions.position_relative_to(object.entity, viewer));
            if self.trace {
                log::trace!(
                    "[attenuation] {} delta={:?} gain={:.2}dB pan={:.2}",
                    object.label,
                    delta,
                    gain,
                    pan
                );
            }
            sink.set_gain(channel, gain);
            sink.set_pan(channel, pan);
            written += 1;
        }
        written
    }
}
