use ostinato_domain_sf2::{load_sf2_path, Bank, LoadError, RenderError};
use ostinato_ports::audio::{AudioClip, AudioError, PlaybackSink};
use ostinato_ports::picker::PathProviderPort;
use ostinato_ports::storage::{SettingsDto, StorageError, StoragePort};
use ostinato_ports::types::Volume01;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("bank load failed: {0}")]
    Load(#[from] LoadError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("no bank loaded")]
    NoBankLoaded,
    #[error("no bank file chosen")]
    NoPathChosen,
}

#[derive(Clone, Debug)]
pub struct InstrumentInfo {
    pub index: usize,
    pub name: String,
    pub zone_count: usize,
}

#[derive(Clone, Debug)]
pub struct PresetInfo {
    pub index: usize,
    pub name: String,
    pub bank: u16,
    pub patch: u16,
}

/// What a preview playback will sound like; returned instead of blocking
/// for the clip's duration.
#[derive(Clone, Debug)]
pub struct PreviewInfo {
    pub instrument: String,
    pub sample: String,
    pub frequency_hz: f32,
    pub sample_rate_hz: u32,
    pub duration: Duration,
}

/// Owns the currently loaded bank and the host collaborators. A reload
/// replaces the bank only when the new file decodes completely; on any
/// failure the previous bank stays installed.
pub struct Player {
    sink: Box<dyn PlaybackSink>,
    storage: Option<Box<dyn StoragePort>>,
    picker: Option<Box<dyn PathProviderPort>>,
    settings: SettingsDto,
    bank: Option<Bank>,
    bank_name: Option<String>,
}

impl Player {
    pub fn new(
        sink: Box<dyn PlaybackSink>,
        storage: Option<Box<dyn StoragePort>>,
        picker: Option<Box<dyn PathProviderPort>>,
    ) -> Self {
        let settings = storage
            .as_ref()
            .map(|s| s.load_settings().unwrap_or_default())
            .unwrap_or_default();
        Self {
            sink,
            storage,
            picker,
            settings,
            bank: None,
            bank_name: None,
        }
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    pub fn set_preview_volume(&mut self, volume: Volume01) {
        self.settings.preview_volume = volume;
        self.save_settings();
    }

    fn save_settings(&self) {
        if let Some(storage) = &self.storage {
            if let Err(err) = storage.save_settings(&self.settings) {
                warn!(%err, "failed to persist settings");
            }
        }
    }

    pub fn load_bank(&mut self, path: &Path) -> Result<&Bank, PlayerError> {
        let bank = load_sf2_path(path)?;

        let name = bank.name().trim().to_string();
        let name = if name.is_empty() {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("SoundFont")
                .to_string()
        } else {
            name
        };
        info!(
            bank = %name,
            instruments = bank.instrument_count(),
            presets = bank.preset_count(),
            samples = bank.sample_headers().len(),
            "loaded soundfont bank"
        );

        self.settings.last_bank_path = Some(path.display().to_string());
        self.save_settings();
        self.bank_name = Some(name);
        Ok(self.bank.insert(bank))
    }

    /// Asks the path provider for a bank file; `NoPathChosen` when there is
    /// no provider or the user cancels.
    pub fn load_bank_interactive(&mut self) -> Result<&Bank, PlayerError> {
        let path = self
            .picker
            .as_ref()
            .and_then(|p| p.pick_bank())
            .ok_or(PlayerError::NoPathChosen)?;
        self.load_bank(&path)
    }

    pub fn bank(&self) -> Option<&Bank> {
        self.bank.as_ref()
    }

    pub fn bank_name(&self) -> Option<&str> {
        self.bank_name.as_deref()
    }

    pub fn instruments(&self) -> Result<Vec<InstrumentInfo>, PlayerError> {
        let bank = self.bank.as_ref().ok_or(PlayerError::NoBankLoaded)?;
        Ok(bank
            .instruments()
            .iter()
            .enumerate()
            .map(|(index, instrument)| InstrumentInfo {
                index,
                name: instrument.name.clone(),
                zone_count: instrument.zones.len(),
            })
            .collect())
    }

    pub fn presets(&self) -> Result<Vec<PresetInfo>, PlayerError> {
        let bank = self.bank.as_ref().ok_or(PlayerError::NoBankLoaded)?;
        Ok(bank
            .presets()
            .iter()
            .enumerate()
            .map(|(index, preset)| PresetInfo {
                index,
                name: preset.name.clone(),
                bank: preset.bank,
                patch: preset.patch,
            })
            .collect())
    }

    /// Renders the instrument's first playable sample and hands it to the
    /// audio sink. Rendering happens before the sink is touched, so a
    /// failure never interrupts whatever is already sounding.
    pub fn play_instrument(&self, instrument_index: usize) -> Result<PreviewInfo, PlayerError> {
        let bank = self.bank.as_ref().ok_or(PlayerError::NoBankLoaded)?;
        let rendered = match bank.render_sample(instrument_index) {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!(instrument = instrument_index, %err, "instrument is not playable");
                return Err(err.into());
            }
        };
        let instrument = bank
            .instrument_name(instrument_index)
            .map_err(RenderError::from)?
            .to_string();

        let volume = self.settings.preview_volume.get();
        let frames: Arc<[f32]> = rendered.waveform.iter().map(|s| s * volume).collect();
        let duration = Duration::from_secs_f64(rendered.duration_secs());
        self.sink.play(AudioClip {
            name: rendered.name.clone(),
            frames,
            sample_rate_hz: rendered.sample_rate_hz,
        })?;

        Ok(PreviewInfo {
            instrument,
            sample: rendered.name,
            frequency_hz: rendered.frequency_hz,
            sample_rate_hz: rendered.sample_rate_hz,
            duration,
        })
    }

    pub fn stop(&self) {
        self.sink.stop();
    }
}
