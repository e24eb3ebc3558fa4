//! Seeded lyric sheets and text-to-music prompts for a style preset.
//!
//! A peer of the stem generator: it reads the same [`StyleDescriptor`] and
//! never touches note data. All randomness comes from a [`Pcg32`] seeded by
//! the caller, so a seed fully determines the output.
//!
//! ```
//! use lyricist::LyricWriter;
//! use stemflo::StyleCatalog;
//!
//! let catalog = StyleCatalog::builtin();
//! let style = catalog.lookup("Metro Boomin");
//! let song = LyricWriter::new(7).write_song(style, "flex", "trap");
//! assert!(song.lyrics.starts_with("[INTRO]"));
//! ```

pub mod filter;
pub mod prompts;
pub mod structures;
pub mod themes;

pub use prompts::{PromptFields, PromptTemplate};
pub use structures::{SectionRule, Structure};
pub use themes::Theme;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;
use std::fmt;
use stemflo::StyleDescriptor;

/// Used for `{instrument}` when a style lists none.
const DEFAULT_INSTRUMENT: &str = "synth";

/// One headed block of a lyric sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub lines: Vec<String>,
}

/// A full lyric sheet in structure order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LyricSheet {
    pub sections: Vec<Section>,
}

impl fmt::Display for LyricSheet {
    /// `[SECTION]` headings, each block followed by a blank line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.name.to_uppercase())?;
            for line in &section.lines {
                writeln!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}

/// Everything generated for one style: lyrics plus a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    pub artist: String,
    pub genre: String,
    pub theme: String,
    pub structure: String,
    pub bpm: u16,
    pub key: String,
    pub seed: u64,
    pub lyrics: String,
    pub prompt: String,
}

impl Song {
    /// Plain-text sheet: header, lyrics, then the prompt.
    pub fn to_text(&self) -> String {
        format!(
            "Artist: {}\nBPM: {}, Key: {}\n\nLYRICS:\n{}\n\nPROMPT:\n{}\n",
            self.artist, self.bpm, self.key, self.lyrics, self.prompt
        )
    }
}

/// Draws lyric lines and prompt fillers from a seeded generator.
#[derive(Debug, Clone)]
pub struct LyricWriter {
    seed: u64,
    rng: Pcg32,
    filter_cliches: bool,
}

impl LyricWriter {
    pub fn new(seed: u64) -> Self {
        LyricWriter {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            filter_cliches: true,
        }
    }

    /// Writer with a seed drawn from the OS; read it back with [`seed`](Self::seed).
    pub fn from_entropy() -> Self {
        LyricWriter::new(rand::random())
    }

    pub fn with_cliche_filter(mut self, enabled: bool) -> Self {
        self.filter_cliches = enabled;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool[self.rng.gen_range(0..pool.len())]
    }

    pub fn lyrics(&mut self, theme: &Theme, structure: &Structure) -> LyricSheet {
        let sections = structure
            .sections
            .iter()
            .map(|&name| {
                let lines: Vec<&str> = match SectionRule::for_section(name) {
                    SectionRule::Lines { count } => {
                        (0..count).map(|_| self.pick(&theme.lines)).collect()
                    }
                    SectionRule::One { start, end } => vec![self.pick(&theme.lines[start..end])],
                    SectionRule::Instrumental => Vec::new(),
                };
                let lines = lines
                    .into_iter()
                    .map(|line| self.polish(line))
                    .collect();
                Section {
                    name: name.to_string(),
                    lines,
                }
            })
            .collect();
        LyricSheet { sections }
    }

    fn polish(&mut self, line: &str) -> String {
        if self.filter_cliches {
            filter::filter_cliches(line, &mut self.rng)
        } else {
            line.to_string()
        }
    }

    pub fn prompt(&mut self, style: &StyleDescriptor) -> String {
        let template = prompts::for_genre(&style.genre);
        let genre = style.genre.display_name().to_lowercase();
        let key = style.key.to_string();
        let instrument = if style.instruments.is_empty() {
            DEFAULT_INSTRUMENT.to_string()
        } else {
            style.instruments[self.rng.gen_range(0..style.instruments.len())].clone()
        };
        let adlib = self.pick(template.adlibs);
        template.render(&PromptFields {
            genre: &genre,
            bpm: style.tempo,
            key: &key,
            mood: &style.mood,
            instrument: &instrument,
            adlib,
        })
    }

    /// Lyrics and prompt for `style`. Unknown theme/structure names fall
    /// back to "flex"/"classic".
    pub fn write_song(mut self, style: &StyleDescriptor, theme: &str, structure: &str) -> Song {
        let theme = themes::theme(theme);
        let structure = structures::structure(structure);
        tracing::debug!(
            style = %style.name,
            theme = theme.name,
            structure = structure.name,
            seed = self.seed,
            "writing lyrics"
        );
        let lyrics = self.lyrics(theme, structure).to_string();
        let prompt = self.prompt(style);
        Song {
            artist: style.name.clone(),
            genre: style.genre.to_string(),
            theme: theme.name.to_string(),
            structure: structure.name.to_string(),
            bpm: style.tempo,
            key: style.key.to_string(),
            seed: self.seed,
            lyrics,
            prompt,
        }
    }
}
