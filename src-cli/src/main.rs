use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use espressivo_core::{replay, History};
use espressivo_domain_expression::estimate_apex;
use espressivo_domain_score::{
    build_note_map, export_sequence_path, extract_part, import_sequence_path, NoteMap, ScorePart,
    TimeModel,
};
use espressivo_infra_storage_fs::FsStorage;
use espressivo_ports::storage::{EngineSettings, SettingsStore};

#[derive(Parser)]
#[command(name = "espressivo", about = "Phrase expression rendering for MIDI performances")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the note map of one score part
    NoteMap {
        /// Performance whose resolution and tempo time the part
        #[arg(long)]
        midi: PathBuf,
        /// Part description (JSON)
        #[arg(long)]
        part: PathBuf,
        /// Output file; printed to stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Estimate the climactic note(s) of a phrase
    Apex {
        #[arg(long)]
        note_map: PathBuf,
        #[arg(long)]
        start: u32,
        #[arg(long)]
        end: u32,
        /// Print per-note scores as well
        #[arg(long)]
        debug: bool,
    },
    /// Replay a history over a performance and write the result
    Render {
        #[arg(long)]
        midi: PathBuf,
        #[arg(long)]
        history: PathBuf,
        /// Directory holding `<part>.note_map.json` files
        #[arg(long)]
        note_maps: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        /// Write only this track (plus the opening tempo)
        #[arg(long)]
        single_part: Option<usize>,
    },
    /// Print the preset catalog
    Presets {
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let settings = load_settings();

    match cli.command {
        Commands::NoteMap { midi, part, out } => write_note_map(&midi, &part, out.as_deref()),
        Commands::Apex {
            note_map,
            start,
            end,
            debug,
        } => apex(&note_map, start, end, debug),
        Commands::Render {
            midi,
            history,
            note_maps,
            out,
            single_part,
        } => render(&settings, &midi, &history, note_maps, &out, single_part),
        Commands::Presets { catalog } => presets(&settings, catalog.as_deref()),
    }
}

fn load_settings() -> EngineSettings {
    match FsStorage::default().load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("using default settings: {}", err);
            EngineSettings::default()
        }
    }
}

fn write_note_map(midi: &Path, part: &Path, out: Option<&Path>) -> Result<()> {
    let sequence = import_sequence_path(midi)
        .with_context(|| format!("reading {}", midi.display()))?;
    let time = TimeModel::from_sequence(&sequence)?;
    let data = fs::read(part).with_context(|| format!("reading {}", part.display()))?;
    let part: ScorePart = serde_json::from_slice(&data).context("parsing part description")?;

    let entries = build_note_map(&part, &time);
    NoteMap::new(entries.clone())?;
    match out {
        Some(path) => {
            FsStorage::write_note_map_file(path, &entries)?;
            log::info!("wrote {} entries to {}", entries.len(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&entries)?),
    }
    Ok(())
}

fn apex(note_map: &Path, start: u32, end: u32, debug: bool) -> Result<()> {
    let entries = FsStorage::read_note_map_file(note_map)
        .with_context(|| format!("reading {}", note_map.display()))?;
    let map = NoteMap::new(entries)?;
    let report = estimate_apex(&map.logical_notes_in_range(start, end));

    if debug {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let candidates: Vec<u32> = report.candidates.into_iter().collect();
        println!("{}", serde_json::to_string(&candidates)?);
    }
    Ok(())
}

fn render(
    settings: &EngineSettings,
    midi: &Path,
    history: &Path,
    note_maps: Option<PathBuf>,
    out: &Path,
    single_part: Option<usize>,
) -> Result<()> {
    let original = import_sequence_path(midi)
        .with_context(|| format!("reading {}", midi.display()))?;
    let data = fs::read(history).with_context(|| format!("reading {}", history.display()))?;
    let history: History = serde_json::from_slice(&data).context("parsing history")?;

    let storage = match note_maps {
        Some(dir) => FsStorage::default().with_note_map_dir(dir),
        None => FsStorage::default().configured(settings),
    };
    let rendered = replay(&original, &history, &storage, settings)?;
    log::info!(
        "replayed {} instruction(s) over {} track(s)",
        history.len(),
        rendered.tracks.len()
    );

    let output = match single_part {
        Some(index) => match extract_part(&rendered, index) {
            Some(part) => part,
            None => bail!(
                "track {} out of range ({} tracks)",
                index,
                rendered.tracks.len()
            ),
        },
        None => rendered,
    };
    export_sequence_path(&output, out).with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}

fn presets(settings: &EngineSettings, catalog: Option<&Path>) -> Result<()> {
    let catalog = match catalog {
        Some(path) => FsStorage::load_preset_catalog(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => FsStorage::preset_catalog(settings)?,
    };
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}
