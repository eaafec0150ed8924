use std::sync::{Arc, Mutex};

use anyhow::Context;
use aviary_core::{AssetError, AudioEngine, ChannelGainSink, ChannelHandle};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::mixer::{decode_clip, MixerState};

const FALLBACK_SAMPLE_RATE: u32 = 44_100;

/// cpal-backed audio engine. Falls back to a silent mixer when no output
/// device is available so the scene keeps running.
pub struct NativeAudio {
    state: Arc<Mutex<MixerState>>,
    _stream: Option<cpal::Stream>,
}

impl NativeAudio {
    pub fn start() -> Self {
        match open_output() {
            Ok((state, stream)) => {
                log::info!(
                    "[audio] output stream at {} Hz",
                    state.lock().map(|s| s.output_rate()).unwrap_or(0)
                );
                Self {
                    state,
                    _stream: Some(stream),
                }
            }
            Err(e) => {
                log::warn!("[audio] no output device ({e:#}); running silent");
                Self {
                    state: Arc::new(Mutex::new(MixerState::new(FALLBACK_SAMPLE_RATE))),
                    _stream: None,
                }
            }
        }
    }

    /// Current linear gain of a channel, for visual feedback.
    pub fn linear_gain(&self, channel: ChannelHandle) -> Option<f32> {
        self.state.lock().ok().and_then(|s| s.gain(channel.0))
    }
}

impl ChannelGainSink for NativeAudio {
    fn set_gain(&mut self, channel: ChannelHandle, gain_db: f32) {
        if let Ok(mut s) = self.state.lock() {
            s.set_gain_db(channel.0, gain_db);
        }
    }

    fn set_pan(&mut self, channel: ChannelHandle, pan: f32) {
        if let Ok(mut s) = self.state.lock() {
            s.set_pan(channel.0, pan);
        }
    }
}

impl AudioEngine for NativeAudio {
    fn prepare(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        looping: bool,
    ) -> Result<ChannelHandle, AssetError> {
        let clip = decode_clip(name, bytes)?;
        log::debug!(
            "[audio] {name}: {} frames, {} ch @ {} Hz",
            clip.frames(),
            clip.channels,
            clip.sample_rate
        );
        let mut s = self.state.lock().map_err(|_| AssetError::Decode {
            name: name.to_string(),
            reason: "mixer lock poisoned".to_string(),
        })?;
        Ok(ChannelHandle(s.add(Arc::new(clip), looping)))
    }

    fn play(&mut self, channel: ChannelHandle) {
        if let Ok(mut s) = self.state.lock() {
            s.play(channel.0);
        }
    }

    fn release_all(&mut self) {
        if let Ok(mut s) = self.state.lock() {
            s.clear();
        }
    }
}

fn open_output() -> anyhow::Result<(Arc<Mutex<MixerState>>, cpal::Stream)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no default output device")?;
    let config = device
        .default_output_config()
        .context("no default output config")?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let state = Arc::new(Mutex::new(MixerState::new(sample_rate)));

    let err_fn = |err| log::error!("audio stream error: {err}");

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream_f32(
            &device,
            &config.into(),
            channels,
            Arc::clone(&state),
            err_fn,
        )?,
        cpal::SampleFormat::I16 => build_stream_i16(
            &device,
            &config.into(),
            channels,
            Arc::clone(&state),
            err_fn,
        )?,
        cpal::SampleFormat::U16 => build_stream_u16(
            &device,
            &config.into(),
            channels,
            Arc::clone(&state),
            err_fn,
        )?,
        other => anyhow::bail!("unsupported sample format {other:?}"),
    };

    stream.play().context("failed to start output stream")?;
    Ok((state, stream))
}

fn build_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<MixerState>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [f32], _| match state.lock() {
            Ok(mut mixer) => mixer.fill(data, channels),
            Err(_) => data.fill(0.0),
        },
        err_fn,
        None,
    )
}

fn build_stream_i16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<MixerState>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let mut scratch: Vec<f32> = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [i16], _| {
            scratch.resize(data.len(), 0.0);
            match state.lock() {
                Ok(mut mixer) => mixer.fill(&mut scratch, channels),
                Err(_) => scratch.fill(0.0),
            }
            for (out, s) in data.iter_mut().zip(scratch.iter()) {
                *out = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            }
        },
        err_fn,
        None,
    )
}

fn build_stream_u16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<MixerState>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let mut scratch: Vec<f32> = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [u16], _| {
            scratch.resize(data.len(), 0.0);
            match state.lock() {
                Ok(mut mixer) => mixer.fill(&mut scratch, channels),
                Err(_) => scratch.fill(0.0),
            }
            for (out, s) in data.iter_mut().zip(scratch.iter()) {
                *out = ((s * 0.5 + 0.5).clamp(0.0, 1.0) * u16::MAX as f32) as u16;
            }
        },
        err_fn,
        None,
    )
}
