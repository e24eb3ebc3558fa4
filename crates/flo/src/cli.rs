//! Argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use stemconf::StemConfig;
use stemflo::{Genre, NoteScheduling, TrackLayout};

#[derive(Parser, Debug)]
#[command(name = "flo")]
#[command(about = "Generate drum/bass/melody stems as Standard MIDI Files")]
#[command(version)]
pub struct Cli {
    /// Config file to load instead of ./stemflo.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List style presets
    Styles {
        /// Only show styles of this genre (see --genres)
        #[arg(short, long, conflicts_with = "genres")]
        genre: Option<String>,

        /// List the selectable genres instead of styles
        #[arg(long)]
        genres: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate stems, MIDI files and lyrics for a style
    Generate(GenerateArgs),

    /// Print a lyric sheet and prompt without writing files
    Lyrics(LyricsArgs),

    /// Summarize the chunks and tracks of a MIDI file
    Inspect {
        /// Path to a .mid file
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration and where it came from
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutArg {
    /// One merged track (format 0)
    Merged,
    /// One track per role (format 1)
    PerRole,
}

impl From<LayoutArg> for TrackLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Merged => TrackLayout::Merged,
            LayoutArg::PerRole => TrackLayout::PerRole,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulingArg {
    /// Sort note on/off events by absolute time
    Interleaved,
    /// Emit each note's off right after its on
    Sequential,
}

impl From<SchedulingArg> for NoteScheduling {
    fn from(arg: SchedulingArg) -> Self {
        match arg {
            SchedulingArg::Interleaved => NoteScheduling::Interleaved,
            SchedulingArg::Sequential => NoteScheduling::Sequential,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Style preset (unknown names use the default style)
    #[arg(short, long)]
    pub style: Option<String>,

    /// Genre templates to use (defaults to the style's genre)
    #[arg(short, long)]
    pub genre: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub layout: Option<LayoutArg>,

    #[arg(long, value_enum)]
    pub scheduling: Option<SchedulingArg>,

    /// Also write one .mid file per role
    #[arg(long)]
    pub separate_stems: bool,

    /// Write a lyric sheet
    #[arg(long, conflicts_with = "no_lyrics")]
    pub lyrics: bool,

    /// Skip the lyric sheet
    #[arg(long)]
    pub no_lyrics: bool,

    #[arg(long)]
    pub theme: Option<String>,

    #[arg(long)]
    pub structure: Option<String>,

    /// Seed for lyric generation
    #[arg(long)]
    pub seed: Option<u64>,
}

impl GenerateArgs {
    /// Layer command-line flags over the loaded configuration.
    pub fn apply(&self, config: &mut StemConfig) {
        if let Some(style) = &self.style {
            config.generation.style = style.clone();
        }
        if let Some(genre) = &self.genre {
            config.generation.genre = Some(Genre::from_name(genre));
        }
        if let Some(out) = &self.out {
            config.paths.output_dir = out.clone();
        }
        if let Some(layout) = self.layout {
            config.generation.layout = layout.into();
        }
        if let Some(scheduling) = self.scheduling {
            config.generation.scheduling = scheduling.into();
        }
        if self.separate_stems {
            config.generation.separate_stems = true;
        }
        if self.lyrics {
            config.lyrics.enabled = true;
        }
        if self.no_lyrics {
            config.lyrics.enabled = false;
        }
        if let Some(theme) = &self.theme {
            config.lyrics.theme = theme.clone();
        }
        if let Some(structure) = &self.structure {
            config.lyrics.structure = structure.clone();
        }
        if self.seed.is_some() {
            config.lyrics.seed = self.seed;
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct LyricsArgs {
    #[arg(short, long)]
    pub style: Option<String>,

    #[arg(long)]
    pub theme: Option<String>,

    #[arg(long)]
    pub structure: Option<String>,

    #[arg(long)]
    pub seed: Option<u64>,
}

impl LyricsArgs {
    pub fn apply(&self, config: &mut StemConfig) {
        if let Some(style) = &self.style {
            config.generation.style = style.clone();
        }
        if let Some(theme) = &self.theme {
            config.lyrics.theme = theme.clone();
        }
        if let Some(structure) = &self.structure {
            config.lyrics.structure = structure.clone();
        }
        if self.seed.is_some() {
            config.lyrics.seed = self.seed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "flo",
            "generate",
            "--style",
            "Deadmau5",
            "--layout",
            "per-role",
            "--scheduling",
            "sequential",
            "--separate-stems",
            "--seed",
            "9",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let mut config = StemConfig::default();
        args.apply(&mut config);
        assert_eq!(config.generation.style, "Deadmau5");
        assert_eq!(config.generation.layout, TrackLayout::PerRole);
        assert_eq!(config.generation.scheduling, NoteScheduling::Sequential);
        assert!(config.generation.separate_stems);
        assert_eq!(config.lyrics.seed, Some(9));
    }

    #[test]
    fn lyrics_flags_conflict() {
        assert!(Cli::try_parse_from(["flo", "generate", "--lyrics", "--no-lyrics"]).is_err());
    }

    #[test]
    fn genres_flag() {
        let cli = Cli::try_parse_from(["flo", "styles", "--genres"]).unwrap();
        assert!(matches!(cli.command, Commands::Styles { genres: true, .. }));
        assert!(Cli::try_parse_from(["flo", "styles", "--genres", "--genre", "trap"]).is_err());
    }

    #[test]
    fn global_config_flag() {
        let cli = Cli::try_parse_from(["flo", "styles", "--config", "/tmp/x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
    }
}
