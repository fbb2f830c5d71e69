//! Sample extraction, normalization and pitch resolution.

use crate::error::{FormatError, RangeError};
use crate::model::SampleHeader;

/// Slices the header's sample range out of the PCM block without copying.
/// Offsets in the header count 16-bit samples; two bytes each here.
pub fn extract_pcm<'a>(pcm: &'a [u8], header: &SampleHeader) -> Result<&'a [u8], RangeError> {
    if header.end <= header.start {
        return Err(RangeError::InvertedBounds {
            name: header.name.clone(),
            start: header.start,
            end: header.end,
        });
    }
    let start = header.start as usize * 2;
    let end = header.end as usize * 2;
    if end > pcm.len() {
        return Err(RangeError::OutOfBounds {
            name: header.name.clone(),
            start: header.start,
            end: header.end,
            pcm_len: pcm.len(),
        });
    }
    Ok(&pcm[start..end])
}

/// Reassembles 16-bit signed little-endian PCM into floats in [-1, 1].
pub fn normalize_pcm(raw: &[u8]) -> Result<Vec<f32>, FormatError> {
    if raw.len() % 2 != 0 {
        return Err(FormatError::OddPcmLength(raw.len()));
    }
    Ok(raw
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect())
}

/// Playback frequency for a sample recorded at `original_pitch` (MIDI key,
/// A4 = 69) with a fine correction in cents. Values outside 0..=127 are
/// accepted and extrapolate along the same curve.
pub fn frequency_hz(original_pitch: u8, pitch_correction_cents: i8) -> f32 {
    let semitones = original_pitch as f32 - 69.0 + pitch_correction_cents as f32 / 100.0;
    440.0 * (semitones / 12.0).exp2()
}

/// A playable waveform plus the parameters an audio sink needs. Duration
/// is reported rather than waited on; the caller schedules playback.
#[derive(Clone, Debug)]
pub struct RenderedSample {
    pub name: String,
    pub waveform: Vec<f32>,
    pub sample_rate_hz: u32,
    pub frequency_hz: f32,
}

impl RenderedSample {
    pub fn frames(&self) -> usize {
        self.waveform.len()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.waveform.len() as f64 / self.sample_rate_hz as f64
    }
}
