//! CLI command implementations

use anyhow::{bail, Context, Result};
use lyricist::{LyricWriter, Song};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use stemconf::{ConfigSources, StemConfig};
use stemflo::{
    read_chunks, Encoder, EventKind, Genre, Header, PatternGenerator, Role, StyleCatalog,
    StyleDescriptor,
};
use tracing::{debug, info};

use crate::project::{flp_stub, OutputPaths};

/// Selectable genres with how many catalog styles each has.
pub fn genre_menu(catalog: &StyleCatalog) -> Vec<(Genre, usize)> {
    Genre::MENU
        .into_iter()
        .map(|genre| {
            let styles = catalog.by_genre(&genre).count();
            (genre, styles)
        })
        .collect()
}

pub fn genres(catalog: &StyleCatalog, json: bool) -> Result<()> {
    let menu = genre_menu(catalog);
    if json {
        let entries: Vec<serde_json::Value> = menu
            .iter()
            .map(|(genre, styles)| serde_json::json!({ "genre": genre, "styles": styles }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for (i, (genre, styles)) in menu.iter().enumerate() {
        println!("{:>2}. {:<18} {} style(s)", i + 1, genre.display_name(), styles);
    }
    Ok(())
}

/// Styles in catalog order, optionally narrowed to one genre.
pub fn select_styles<'a>(
    catalog: &'a StyleCatalog,
    genre: Option<&str>,
) -> Vec<&'a StyleDescriptor> {
    match genre {
        Some(name) => {
            let genre = Genre::from_name(name);
            catalog.iter().filter(|s| s.genre == genre).collect()
        }
        None => catalog.iter().collect(),
    }
}

pub fn styles(catalog: &StyleCatalog, genre: Option<&str>, json: bool) -> Result<()> {
    let styles = select_styles(catalog, genre);
    if json {
        println!("{}", serde_json::to_string_pretty(&styles)?);
        return Ok(());
    }
    if styles.is_empty() {
        if let Some(genre) = genre {
            if !Genre::MENU.contains(&Genre::from_name(genre)) {
                bail!("unknown genre '{}' (see `flo styles --genres`)", genre);
            }
            println!("no styles for {}", Genre::from_name(genre));
            return Ok(());
        }
    }
    for genre in catalog.genres() {
        let in_genre: Vec<_> = styles.iter().filter(|s| &s.genre == genre).collect();
        if in_genre.is_empty() {
            continue;
        }
        println!("{}", genre);
        for style in in_genre {
            println!(
                "  {:<20} {:>3} BPM  {:<10} {}",
                style.name,
                style.tempo,
                style.key.to_string(),
                style.mood
            );
        }
    }
    Ok(())
}

/// What one `generate` run produced.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub style: String,
    pub genre: String,
    pub tempo: u16,
    pub notes: usize,
    pub files: Vec<PathBuf>,
    pub lyric_seed: Option<u64>,
}

/// Generate stems for the configured style and write every enabled output.
pub fn generate(config: &StemConfig) -> Result<GenerateReport> {
    let catalog = config.catalog();
    let generation = &config.generation;
    let style = catalog.lookup(&generation.style);
    let genre = generation.genre.clone().unwrap_or_else(|| style.genre.clone());

    let stems = PatternGenerator::new(&catalog).generate_stem_set(&genre, &generation.style);
    info!(
        style = %style.name,
        genre = %genre,
        notes = stems.note_count(),
        "generated stems"
    );

    let paths = OutputPaths::new(&config.paths.output_dir, style);
    fs::create_dir_all(paths.dir())
        .with_context(|| format!("Failed to create {}", paths.dir().display()))?;

    let encoder = Encoder::new(config.encode_options());
    let mut files = Vec::new();

    let midi = encoder
        .encode_stem_set(&stems)
        .context("Failed to encode MIDI")?;
    write_file(&paths.midi(), &midi, &mut files)?;

    if generation.separate_stems {
        for track in stems.non_empty() {
            let bytes = encoder
                .encode_role(track, stems.tempo())
                .with_context(|| format!("Failed to encode {} stem", track.role))?;
            write_file(&paths.role_midi(track.role), &bytes, &mut files)?;
        }
    }

    if generation.stems_json {
        let json = stems.to_json().context("Failed to serialize stems")?;
        write_file(&paths.stems_json(), json.as_bytes(), &mut files)?;
    }

    if generation.project_stub {
        write_file(&paths.project(), &flp_stub(stems.tempo()), &mut files)?;
    }

    let mut lyric_seed = None;
    if config.lyrics.enabled {
        let song = write_song(config, style);
        lyric_seed = Some(song.seed);
        write_file(&paths.lyrics(), song.to_text().as_bytes(), &mut files)?;
    }

    Ok(GenerateReport {
        style: style.name.clone(),
        genre: genre.to_string(),
        tempo: stems.tempo(),
        notes: stems.note_count(),
        files,
        lyric_seed,
    })
}

fn write_file(path: &Path, bytes: &[u8], written: &mut Vec<PathBuf>) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    written.push(path.to_path_buf());
    Ok(())
}

fn write_song(config: &StemConfig, style: &StyleDescriptor) -> Song {
    let writer = match config.lyrics.seed {
        Some(seed) => LyricWriter::new(seed),
        None => LyricWriter::from_entropy(),
    };
    writer.write_song(style, &config.lyrics.theme, &config.lyrics.structure)
}

/// Lyric sheet and prompt for the configured style, without touching disk.
pub fn lyrics(config: &StemConfig) -> Song {
    let catalog = config.catalog();
    let style = catalog.lookup(&config.generation.style);
    write_song(config, style)
}

/// Per-track facts decoded from a MIDI file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub index: usize,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub events: usize,
    pub note_ons: usize,
    pub note_offs: usize,
    pub channels: Vec<u8>,
    pub bpm: Option<f64>,
    pub end_tick: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiSummary {
    pub header: Header,
    pub tracks: Vec<TrackSummary>,
}

impl MidiSummary {
    pub fn note_ons(&self) -> usize {
        self.tracks.iter().map(|t| t.note_ons).sum()
    }
}

pub fn summarize(bytes: &[u8]) -> Result<MidiSummary> {
    let chunks = read_chunks(bytes).context("Failed to split MIDI chunks")?;
    let Some(first) = chunks.first() else {
        bail!("file is empty");
    };
    let header = Header::parse(first)?;

    let mut tracks = Vec::new();
    for chunk in chunks.iter().skip(1).filter(|c| &c.tag == b"MTrk") {
        let index = tracks.len();
        let events = stemflo::parse_track(chunk.data)
            .with_context(|| format!("Failed to parse track {}", index))?;

        let mut summary = TrackSummary {
            index,
            name: None,
            role: None,
            events: events.len(),
            note_ons: 0,
            note_offs: 0,
            channels: Vec::new(),
            bpm: None,
            end_tick: events.last().map(|e| e.tick).unwrap_or(0),
        };
        for event in &events {
            // Counted by status byte: a velocity-0 Note-On decodes as a
            // release but was written as a note.
            match event.status & 0xF0 {
                0x90 => summary.note_ons += 1,
                0x80 => summary.note_offs += 1,
                _ => {}
            }
            match &event.kind {
                EventKind::NoteOn { channel, .. } => {
                    if !summary.channels.contains(channel) {
                        summary.channels.push(*channel);
                    }
                }
                EventKind::Tempo { usec } if *usec > 0 => {
                    summary.bpm = Some(60_000_000.0 / f64::from(*usec));
                }
                EventKind::TrackName { name } if summary.name.is_none() => {
                    summary.role = stemflo::role_for_track_name(name);
                    summary.name = Some(name.clone());
                }
                _ => {}
            }
        }
        summary.channels.sort_unstable();
        tracks.push(summary);
    }

    if tracks.len() != usize::from(header.tracks) {
        tracing::warn!(
            declared = header.tracks,
            found = tracks.len(),
            "track count differs from header"
        );
    }

    Ok(MidiSummary { header, tracks })
}

pub fn inspect(path: &Path, json: bool) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let summary = summarize(&bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{}: format {}, {} track(s), {} ticks per quarter",
        path.display(),
        summary.header.format,
        summary.header.tracks,
        summary.header.ticks_per_quarter
    );
    for track in &summary.tracks {
        let name = track.name.as_deref().unwrap_or("(unnamed)");
        print!(
            "  [{}] {:<12} {:>4} events, {:>4} notes, ends at tick {}",
            track.index, name, track.events, track.note_ons, track.end_tick
        );
        if let Some(bpm) = track.bpm {
            print!(", {:.1} BPM", bpm);
        }
        if !track.channels.is_empty() {
            let channels: Vec<String> =
                track.channels.iter().map(|c| (c + 1).to_string()).collect();
            print!(", ch {}", channels.join(","));
        }
        println!();
    }
    Ok(())
}

pub fn show_config(config: &StemConfig, sources: &ConfigSources) {
    if sources.files.is_empty() {
        println!("# no config files found, using defaults");
    }
    for file in &sources.files {
        println!("# loaded {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# override {}", var);
    }
    println!();
    print!("{}", config.to_toml());
}

#[cfg(test)]
mod tests {
    use super::*;
    use stemflo::{assemble, encode};

    #[test]
    fn genre_filter() {
        let catalog = StyleCatalog::builtin();
        let trance = select_styles(&catalog, Some("trance"));
        assert!(!trance.is_empty());
        assert!(trance.iter().all(|s| s.genre == Genre::Trance));
        assert_eq!(select_styles(&catalog, None).len(), catalog.len());
        assert!(select_styles(&catalog, Some("polka")).is_empty());
    }

    #[test]
    fn menu_covers_genres_without_styles() {
        let catalog = StyleCatalog::builtin();
        let menu = genre_menu(&catalog);
        assert_eq!(menu.len(), Genre::MENU.len());
        assert_eq!(menu[0].0, Genre::Trap);
        assert!(menu.iter().any(|(g, _)| *g == Genre::Drill));
        let total: usize = menu.iter().map(|(_, n)| n).sum();
        assert!(total <= catalog.len());
        let trap = menu.iter().find(|(g, _)| *g == Genre::Trap).unwrap();
        assert_eq!(trap.1, catalog.by_genre(&Genre::Trap).count());
    }

    #[test]
    fn styles_rejects_unknown_genre() {
        let catalog = StyleCatalog::builtin();
        assert!(styles(&catalog, Some("polka"), false).is_err());
        assert!(styles(&catalog, Some("Drill"), false).is_ok());
    }

    #[test]
    fn summary_of_merged_file() {
        let catalog = StyleCatalog::builtin();
        let style = catalog.lookup("Metro Boomin");
        let stems = assemble(&style.genre, style);
        let summary = summarize(&encode(&stems).unwrap()).unwrap();

        assert_eq!(summary.header.format, 0);
        assert_eq!(summary.tracks.len(), 1);
        assert_eq!(summary.note_ons(), stems.note_count());
        assert_eq!(summary.tracks[0].note_offs, stems.note_count());
        assert_eq!(summary.tracks[0].name.as_deref(), Some("Metro Boomin"));
        let bpm = summary.tracks[0].bpm.unwrap();
        assert!((bpm - f64::from(style.tempo)).abs() < 0.01);
    }

    #[test]
    fn silent_notes_still_count_as_notes() {
        let mut track = stemflo::RoleTrack::new(Role::Drums);
        track.push(0, 36, 0, 480);
        track.push(480, 38, 100, 480);
        let summary = summarize(&stemflo::encode_role(&track, 120).unwrap()).unwrap();
        assert_eq!(summary.tracks[0].note_ons, 2);
        assert_eq!(summary.tracks[0].note_offs, 2);
        assert_eq!(summary.tracks[0].channels, vec![9]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(summarize(b"RIFF\x00\x00\x00\x04WAVE").is_err());
        assert!(summarize(b"").is_err());
    }
}
