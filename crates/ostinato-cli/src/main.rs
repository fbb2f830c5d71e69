use clap::{Parser, Subcommand};
use ostinato_core::{Player, PlayerError};
use ostinato_infra_audio_cpal::CpalPlaybackSink;
use ostinato_infra_storage_fs::FsStorage;
use ostinato_ports::types::Volume01;
use std::path::PathBuf;
use std::thread;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ostinato", version, about = "SoundFont bank inspector and instrument previewer")]
struct Cli {
    /// Log filter, e.g. "debug" or "ostinato_core=trace"
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the bank name, presets and instruments of a .sf2 file.
    Info {
        /// Path to the SoundFont bank.
        bank: PathBuf,
    },
    /// Plays an instrument's first sample through the default output.
    Play {
        /// Path to the SoundFont bank.
        bank: PathBuf,
        /// Instrument index as shown by `info`.
        #[arg(short, long)]
        instrument: usize,
        /// Preview volume in 0..=1 (overrides the stored setting).
        #[arg(long)]
        volume: Option<f32>,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.log.as_deref() {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(cli.command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), PlayerError> {
    let mut player = Player::new(
        Box::new(CpalPlaybackSink::new()),
        Some(Box::new(FsStorage::default())),
        None,
    );

    match command {
        Commands::Info { bank } => {
            player.load_bank(&bank)?;
            let name = player.bank_name().unwrap_or("(unnamed)").to_string();
            println!("bank: {}", name);

            let presets = player.presets()?;
            println!("presets ({}):", presets.len());
            for preset in presets {
                println!(
                    "  [{:3}] {} (bank {}, patch {})",
                    preset.index, preset.name, preset.bank, preset.patch
                );
            }

            let instruments = player.instruments()?;
            println!("instruments ({}):", instruments.len());
            for instrument in instruments {
                println!(
                    "  [{:3}] {} ({} zones)",
                    instrument.index, instrument.name, instrument.zone_count
                );
            }
        }
        Commands::Play {
            bank,
            instrument,
            volume,
        } => {
            if let Some(volume) = volume {
                player.set_preview_volume(Volume01::new(volume));
            }
            player.load_bank(&bank)?;
            let preview = player.play_instrument(instrument)?;
            println!(
                "playing '{}' (sample '{}', {:.1} Hz at {} Hz) for {:.2}s",
                preview.instrument,
                preview.sample,
                preview.frequency_hz,
                preview.sample_rate_hz,
                preview.duration.as_secs_f64()
            );
            // the core reports the duration; scheduling the wait is the
            // shell's job
            thread::sleep(preview.duration);
            player.stop();
        }
    }

    Ok(())
}
