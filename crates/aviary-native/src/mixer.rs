// Software mixer for looping clips. Runs inside the cpal callback; the scene
// side only touches it through short lock scopes to set gains and pans.

use std::io::Cursor;
use std::sync::Arc;

use aviary_core::AssetError;
use rodio::Source;

/// Decoded PCM, interleaved f32 samples.
#[derive(Clone, Debug)]
pub struct Clip {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl Clip {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    #[inline]
    fn frame(&self, index: usize) -> (f32, f32) {
        let ch = self.channels.max(1) as usize;
        let base = index * ch;
        let l = self.samples.get(base).copied().unwrap_or(0.0);
        let r = if ch >= 2 {
            self.samples.get(base + 1).copied().unwrap_or(0.0)
        } else {
            l
        };
        (l, r)
    }
}

/// Equal-power left/right gains for `pan` in `-1.0..=1.0`, scaled so a
/// centered voice plays at unity on both sides.
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * std::f32::consts::FRAC_PI_4; // 0..pi/2
    let norm = std::f32::consts::SQRT_2;
    (angle.cos() * norm, angle.sin() * norm)
}

#[derive(Clone, Debug)]
struct Voice {
    clip: Arc<Clip>,
    cursor: f64, // position in clip frames
    step: f64,   // clip frames per output frame
    gain: f32,   // linear
    left_gain: f32,
    right_gain: f32,
    playing: bool,
    looping: bool,
}

pub struct MixerState {
    output_rate: u32,
    voices: Vec<Voice>,
}

impl MixerState {
    pub fn new(output_rate: u32) -> Self {
        Self {
            output_rate: output_rate.max(1),
            voices: Vec::new(),
        }
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Register a clip as a new, stopped voice at unity gain. Returns its index.
    pub fn add(&mut self, clip: Arc<Clip>, looping: bool) -> usize {
        let step = clip.sample_rate.max(1) as f64 / self.output_rate as f64;
        self.voices.push(Voice {
            clip,
            cursor: 0.0,
            step,
            gain: 1.0,
            left_gain: 1.0,
            right_gain: 1.0,
            playing: false,
            looping,
        });
        self.voices.len() - 1
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn set_gain_db(&mut self, index: usize, db: f32) {
        if let Some(v) = self.voices.get_mut(index) {
            v.gain = aviary_core::db_to_linear(db);
        }
    }

    pub fn gain(&self, index: usize) -> Option<f32> {
        self.voices.get(index).map(|v| v.gain)
    }

    pub fn set_pan(&mut self, index: usize, pan: f32) {
        if let Some(v) = self.voices.get_mut(index) {
            (v.left_gain, v.right_gain) = pan_gains(pan);
        }
    }

    pub fn play(&mut self, index: usize) {
        if let Some(v) = self.voices.get_mut(index) {
            v.playing = true;
        }
    }

    pub fn is_playing(&self, index: usize) -> bool {
        self.voices.get(index).map(|v| v.playing).unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.voices.clear();
    }

    /// Mix one stereo output frame and advance every playing voice.
    pub fn next_frame(&mut self) -> (f32, f32) {
        let mut left = 0.0f32;
        let mut right = 0.0f32;
        for v in self.voices.iter_mut() {
            if !v.playing {
                continue;
            }
            let frames = v.clip.frames();
            if frames == 0 {
                v.playing = false;
                continue;
            }
            let i0 = v.cursor as usize;
            let frac = (v.cursor - i0 as f64) as f32;
            let i1 = if i0 + 1 < frames {
                i0 + 1
            } else if v.looping {
                0
            } else {
                i0
            };
            let (l0, r0) = v.clip.frame(i0);
            let (l1, r1) = v.clip.frame(i1);
            left += (l0 + (l1 - l0) * frac) * v.gain * v.left_gain;
            right += (r0 + (r1 - r0) * frac) * v.gain * v.right_gain;

            v.cursor += v.step;
            if v.cursor >= frames as f64 {
                if v.looping {
                    v.cursor -= frames as f64;
                } else {
                    v.playing = false;
                }
            }
        }
        (left.tanh(), right.tanh())
    }

    /// Fill an interleaved buffer with `channels` samples per frame.
    pub fn fill(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in data.chunks_mut(channels) {
            let (l, r) = self.next_frame();
            if frame.len() >= 2 {
                frame[0] = l;
                frame[1] = r;
                for s in frame.iter_mut().skip(2) {
                    *s = 0.0;
                }
            } else {
                frame[0] = 0.5 * (l + r);
            }
        }
    }
}

/// Decode an encoded clip (mp3, wav or ogg) into interleaved f32 PCM.
/// A stream that decodes to no samples is an error.
pub fn decode_clip(name: &str, bytes: Vec<u8>) -> Result<Clip, AssetError> {
    let decoder = rodio::Decoder::new(Cursor::new(bytes)).map_err(|e| AssetError::Decode {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.convert_samples::<f32>().collect();
    if samples.is_empty() {
        return Err(AssetError::Decode {
            name: name.to_string(),
            reason: "no audio frames".to_string(),
        });
    }
    Ok(Clip {
        samples,
        channels,
        sample_rate,
    })
}
