use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("no output device available")]
    NoOutputDevice,
    #[error("unsupported config: {0}")]
    UnsupportedConfig(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// A rendered mono waveform ready for preview playback.
#[derive(Clone, Debug)]
pub struct AudioClip {
    pub name: String,
    pub frames: Arc<[f32]>,
    pub sample_rate_hz: u32,
}

impl AudioClip {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.frames.len() as f64 / self.sample_rate_hz as f64
    }
}

/// Plays one clip at a time. `play` replaces whatever is currently sounding
/// and returns immediately; the sink never blocks the caller for the
/// duration of the clip.
pub trait PlaybackSink: Send + Sync {
    fn play(&self, clip: AudioClip) -> Result<(), AudioError>;
    fn stop(&self);
}
