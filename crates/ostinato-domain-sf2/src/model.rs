use crate::error::{FormatError, IndexError, NotFoundError, RenderError};
use crate::render::{self, RenderedSample};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Generator types the playback path reads, plus `Other` so every
/// generator present in a file round-trips through decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorType {
    StartAddrsOffset,
    EndAddrsOffset,
    StartLoopAddrsOffset,
    EndLoopAddrsOffset,
    StartAddrsCoarseOffset,
    EndAddrsCoarseOffset,
    Pan,
    Instrument,
    KeyRange,
    VelRange,
    StartLoopAddrsCoarseOffset,
    Keynum,
    Velocity,
    InitialAttenuation,
    EndLoopAddrsCoarseOffset,
    CoarseTune,
    FineTune,
    SampleId,
    SampleModes,
    ScaleTuning,
    OverridingRootKey,
    Other(u16),
}

impl GeneratorType {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::StartAddrsOffset,
            1 => Self::EndAddrsOffset,
            2 => Self::StartLoopAddrsOffset,
            3 => Self::EndLoopAddrsOffset,
            4 => Self::StartAddrsCoarseOffset,
            12 => Self::EndAddrsCoarseOffset,
            17 => Self::Pan,
            41 => Self::Instrument,
            43 => Self::KeyRange,
            44 => Self::VelRange,
            45 => Self::StartLoopAddrsCoarseOffset,
            46 => Self::Keynum,
            47 => Self::Velocity,
            48 => Self::InitialAttenuation,
            50 => Self::EndLoopAddrsCoarseOffset,
            51 => Self::CoarseTune,
            52 => Self::FineTune,
            53 => Self::SampleId,
            54 => Self::SampleModes,
            56 => Self::ScaleTuning,
            58 => Self::OverridingRootKey,
            other => Self::Other(other),
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            Self::StartAddrsOffset => 0,
            Self::EndAddrsOffset => 1,
            Self::StartLoopAddrsOffset => 2,
            Self::EndLoopAddrsOffset => 3,
            Self::StartAddrsCoarseOffset => 4,
            Self::EndAddrsCoarseOffset => 12,
            Self::Pan => 17,
            Self::Instrument => 41,
            Self::KeyRange => 43,
            Self::VelRange => 44,
            Self::StartLoopAddrsCoarseOffset => 45,
            Self::Keynum => 46,
            Self::Velocity => 47,
            Self::InitialAttenuation => 48,
            Self::EndLoopAddrsCoarseOffset => 50,
            Self::CoarseTune => 51,
            Self::FineTune => 52,
            Self::SampleId => 53,
            Self::SampleModes => 54,
            Self::ScaleTuning => 56,
            Self::OverridingRootKey => 58,
            Self::Other(other) => other,
        }
    }
}

/// A typed zone parameter. The raw 16-bit amount is interpreted as signed
/// or unsigned depending on the generator type, so both views are exposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    kind: GeneratorType,
    amount: u16,
}

impl Generator {
    pub fn new(kind: GeneratorType, amount: u16) -> Self {
        Self { kind, amount }
    }

    pub fn kind(self) -> GeneratorType {
        self.kind
    }

    pub fn amount_u16(self) -> u16 {
        self.amount
    }

    pub fn amount_i16(self) -> i16 {
        self.amount as i16
    }

    /// Low/high byte view used by `KeyRange` and `VelRange`.
    pub fn amount_range(self) -> (u8, u8) {
        (self.amount as u8, (self.amount >> 8) as u8)
    }
}

/// Decoded but unused by the playback path; retained so a decoded bank
/// reflects the file faithfully.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modulator {
    pub src_oper: u16,
    pub dest_oper: u16,
    pub amount: i16,
    pub amount_src_oper: u16,
    pub trans_oper: u16,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Zone {
    pub generators: Vec<Generator>,
    pub modulators: Vec<Modulator>,
}

impl Zone {
    /// First generator of the given type, in declared order. SoundFont
    /// semantics give later duplicates no effect on this path.
    pub fn generator(&self, kind: GeneratorType) -> Option<&Generator> {
        self.generators.iter().find(|g| g.kind() == kind)
    }

    /// Sample header index this zone plays, if any.
    pub fn sample_id(&self) -> Option<u16> {
        self.generator(GeneratorType::SampleId)
            .map(|g| g.amount_u16())
    }

    /// A global zone carries defaults for its siblings and references
    /// neither a sample nor an instrument.
    pub fn is_global(&self) -> bool {
        self.generator(GeneratorType::SampleId).is_none()
            && self.generator(GeneratorType::Instrument).is_none()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub zones: Vec<Zone>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub patch: u16,
    pub bank: u16,
    pub zones: Vec<Zone>,
}

/// One record of the `shdr` table. `start`/`end` and the loop points are
/// sample-count offsets into the PCM block, not byte offsets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleHeader {
    pub name: String,
    pub start: u32,
    pub end: u32,
    pub loop_start: u32,
    pub loop_end: u32,
    pub sample_rate_hz: u32,
    pub original_pitch: u8,
    pub pitch_correction: i8,
    pub sample_link: u16,
    pub sample_type: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BankInfo {
    pub name: String,
    pub version: Version,
}

/// A fully decoded SoundFont file. Immutable after load; reloading a file
/// produces a fresh `Bank` rather than mutating this one.
#[derive(Clone, Debug)]
pub struct Bank {
    info: BankInfo,
    presets: Vec<Preset>,
    instruments: Vec<Instrument>,
    sample_headers: Vec<SampleHeader>,
    pcm: Arc<[u8]>,
}

impl Bank {
    pub(crate) fn new(
        info: BankInfo,
        presets: Vec<Preset>,
        instruments: Vec<Instrument>,
        sample_headers: Vec<SampleHeader>,
        pcm: Arc<[u8]>,
    ) -> Self {
        Self {
            info,
            presets,
            instruments,
            sample_headers,
            pcm,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn version(&self) -> Version {
        self.info.version
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn sample_headers(&self) -> &[SampleHeader] {
        &self.sample_headers
    }

    /// The raw 16-bit little-endian PCM block shared by all samples.
    pub fn pcm(&self) -> &[u8] {
        &self.pcm
    }

    pub fn pcm_shared(&self) -> Arc<[u8]> {
        Arc::clone(&self.pcm)
    }

    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }

    pub fn instrument_name(&self, index: usize) -> Result<&str, IndexError> {
        self.instruments
            .get(index)
            .map(|i| i.name.as_str())
            .ok_or(IndexError {
                kind: "instrument",
                index,
                count: self.instruments.len(),
            })
    }

    pub fn preset_count(&self) -> usize {
        self.presets.len()
    }

    pub fn preset_name(&self, index: usize) -> Result<&str, IndexError> {
        self.presets
            .get(index)
            .map(|p| p.name.as_str())
            .ok_or(IndexError {
                kind: "preset",
                index,
                count: self.presets.len(),
            })
    }

    /// Scans the instrument's zones in declared order and returns the
    /// sample referenced by the first `SampleId` generator. Key and
    /// velocity ranges are deliberately ignored; multi-zone layering is
    /// out of scope for preview playback.
    pub fn first_playable_sample(
        &self,
        instrument_index: usize,
    ) -> Result<&SampleHeader, RenderError> {
        let instrument =
            self.instruments
                .get(instrument_index)
                .ok_or(IndexError {
                    kind: "instrument",
                    index: instrument_index,
                    count: self.instruments.len(),
                })?;
        for zone in &instrument.zones {
            if let Some(id) = zone.sample_id() {
                return self
                    .sample_headers
                    .get(id as usize)
                    .ok_or_else(|| {
                        RenderError::Format(FormatError::BadTableIndex {
                            table: "shdr",
                            index: id as usize,
                            len: self.sample_headers.len(),
                        })
                    });
            }
        }
        Err(NotFoundError {
            instrument: instrument.name.clone(),
        }
        .into())
    }

    /// Extracts, normalizes and pitches the instrument's first playable
    /// sample into a waveform buffer ready for an audio sink.
    pub fn render_sample(&self, instrument_index: usize) -> Result<RenderedSample, RenderError> {
        let header = self.first_playable_sample(instrument_index)?;
        let raw = render::extract_pcm(&self.pcm, header)?;
        let waveform = render::normalize_pcm(raw)?;
        Ok(RenderedSample {
            name: header.name.clone(),
            waveform,
            sample_rate_hz: header.sample_rate_hz,
            frequency_hz: render::frequency_hz(header.original_pitch, header.pitch_correction),
        })
    }
}
