//! `PlaybackSink` adapter over cpal. Each clip gets its own stream thread
//! which tears the stream down on stop or shortly after the clip has
//! played out.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig, SupportedStreamConfigRange};
use ostinato_ports::audio::{AudioClip, AudioError, PlaybackSink};
use parking_lot::Mutex;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub struct CpalPlaybackSink {
    active: Mutex<Option<ActiveClip>>,
}

struct ActiveClip {
    stop_tx: mpsc::Sender<()>,
    join_handle: Option<thread::JoinHandle<()>>,
}

struct SelectedStreamConfig {
    config: StreamConfig,
    sample_format: SampleFormat,
}

impl CpalPlaybackSink {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }
}

impl Default for CpalPlaybackSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CpalPlaybackSink {
    fn drop(&mut self) {
        stop_active(&mut self.active.lock());
    }
}

impl PlaybackSink for CpalPlaybackSink {
    fn play(&self, clip: AudioClip) -> Result<(), AudioError> {
        let mut active = self.active.lock();
        stop_active(&mut active);

        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (stop_tx, stop_rx) = mpsc::channel();
        // keep the stream alive a touch past the clip so the tail is
        // not clipped by teardown
        let linger = Duration::from_secs_f64(clip.duration_secs()) + Duration::from_millis(250);

        let join_handle = thread::spawn(move || {
            let host = cpal::default_host();
            let device = match host.default_output_device() {
                Some(device) => device,
                None => {
                    let _ = ready_tx.send(Err(AudioError::NoOutputDevice));
                    return;
                }
            };

            let selected = match select_stream_config(&device, clip.sample_rate_hz) {
                Ok(selected) => selected,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };

            let channels = selected.config.channels as usize;
            let error_callback = |err| {
                eprintln!("cpal stream error: {}", err);
            };

            let stream = match selected.sample_format {
                SampleFormat::F32 => {
                    let frames = Arc::clone(&clip.frames);
                    let mut cursor = 0usize;
                    device.build_output_stream(
                        &selected.config,
                        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                            for frame in data.chunks_mut(channels) {
                                let value = next_frame(&frames, &mut cursor);
                                frame.fill(value);
                            }
                        },
                        error_callback,
                        None,
                    )
                }
                SampleFormat::I16 => {
                    let frames = Arc::clone(&clip.frames);
                    let mut cursor = 0usize;
                    device.build_output_stream(
                        &selected.config,
                        move |data: &mut [i16], _info: &cpal::OutputCallbackInfo| {
                            for frame in data.chunks_mut(channels) {
                                let value = f32_to_i16(next_frame(&frames, &mut cursor));
                                frame.fill(value);
                            }
                        },
                        error_callback,
                        None,
                    )
                }
                SampleFormat::U16 => {
                    let frames = Arc::clone(&clip.frames);
                    let mut cursor = 0usize;
                    device.build_output_stream(
                        &selected.config,
                        move |data: &mut [u16], _info: &cpal::OutputCallbackInfo| {
                            for frame in data.chunks_mut(channels) {
                                let value = f32_to_u16(next_frame(&frames, &mut cursor));
                                frame.fill(value);
                            }
                        },
                        error_callback,
                        None,
                    )
                }
                _ => Err(cpal::BuildStreamError::StreamConfigNotSupported),
            };

            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = ready_tx.send(Err(AudioError::Backend(err.to_string())));
                    return;
                }
            };

            if let Err(err) = stream.play() {
                let _ = ready_tx.send(Err(AudioError::Backend(err.to_string())));
                return;
            }

            let _ = ready_tx.send(Ok(()));
            let _ = stop_rx.recv_timeout(linger);
            drop(stream);
        });

        match ready_rx
            .recv()
            .map_err(|e| AudioError::Backend(e.to_string()))?
        {
            Ok(()) => {
                *active = Some(ActiveClip {
                    stop_tx,
                    join_handle: Some(join_handle),
                });
                Ok(())
            }
            Err(err) => {
                let _ = join_handle.join();
                Err(err)
            }
        }
    }

    fn stop(&self) {
        stop_active(&mut self.active.lock());
    }
}

fn stop_active(active: &mut Option<ActiveClip>) {
    if let Some(mut clip) = active.take() {
        let _ = clip.stop_tx.send(());
        if let Some(handle) = clip.join_handle.take() {
            let _ = handle.join();
        }
    }
}

fn next_frame(frames: &[f32], cursor: &mut usize) -> f32 {
    let value = frames.get(*cursor).copied().unwrap_or(0.0);
    if *cursor < frames.len() {
        *cursor += 1;
    }
    value
}

fn select_stream_config(
    device: &cpal::Device,
    sample_rate_hz: u32,
) -> Result<SelectedStreamConfig, AudioError> {
    let supported = device
        .supported_output_configs()
        .map_err(|e| AudioError::Backend(e.to_string()))?;

    let chosen = select_supported_config(supported, sample_rate_hz)?;
    let sample_format = chosen.sample_format();
    let mut config = chosen.config();
    config.buffer_size = BufferSize::Default;

    Ok(SelectedStreamConfig {
        config,
        sample_format,
    })
}

fn select_supported_config(
    supported: impl Iterator<Item = SupportedStreamConfigRange>,
    sample_rate_hz: u32,
) -> Result<cpal::SupportedStreamConfig, AudioError> {
    let mut best: Option<cpal::SupportedStreamConfig> = None;
    let mut best_score: i32 = -1;

    for config_range in supported {
        if config_range.channels() == 0 {
            continue;
        }
        let min = config_range.min_sample_rate().0;
        let max = config_range.max_sample_rate().0;
        if sample_rate_hz < min || sample_rate_hz > max {
            continue;
        }

        let format_score = match config_range.sample_format() {
            SampleFormat::F32 => 30,
            SampleFormat::I16 => 20,
            SampleFormat::U16 => 10,
            _ => 0,
        };
        // prefer stereo-or-less so the mono clip is not smeared over
        // surround layouts
        let channel_score = if config_range.channels() <= 2 { 1 } else { 0 };
        let score = format_score + channel_score;

        if score > best_score {
            best = Some(config_range.with_sample_rate(SampleRate(sample_rate_hz)));
            best_score = score;
        }
    }

    best.ok_or_else(|| {
        AudioError::UnsupportedConfig(format!(
            "no output config supports {} Hz",
            sample_rate_hz
        ))
    })
}

fn f32_to_i16(value: f32) -> i16 {
    let v = value.clamp(-1.0, 1.0);
    (v * i16::MAX as f32) as i16
}

fn f32_to_u16(value: f32) -> u16 {
    let v = value.clamp(-1.0, 1.0);
    let scaled = (v * 0.5 + 0.5) * u16::MAX as f32;
    scaled.round().clamp(0.0, u16::MAX as f32) as u16
}
