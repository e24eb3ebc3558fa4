//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stemflo::{Genre, Key, NoteScheduling, Scale, StyleDescriptor, TrackLayout};

/// Where generated files go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for .mid, .json and project files.
    /// Default: ~/Downloads
    #[serde(default = "PathsConfig::default_output_dir")]
    pub output_dir: PathBuf,
}

impl PathsConfig {
    fn default_output_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join("Downloads"))
            .unwrap_or_else(|| PathBuf::from("Downloads"))
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: Self::default_output_dir(),
        }
    }
}

/// What to generate and how to write it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Style preset name. Unknown names fall back to the catalog default.
    #[serde(default = "GenerationConfig::default_style")]
    pub style: String,

    /// Genre templates to use. When unset, the style's own genre is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<Genre>,

    /// Style used when `style` names nothing in the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_style: Option<String>,

    #[serde(default)]
    pub layout: TrackLayout,

    #[serde(default)]
    pub scheduling: NoteScheduling,

    /// Also write one .mid per non-empty role.
    #[serde(default)]
    pub separate_stems: bool,

    /// Write the stem set as JSON next to the MIDI file.
    #[serde(default = "GenerationConfig::default_true")]
    pub stems_json: bool,

    /// Write the placeholder project file.
    #[serde(default = "GenerationConfig::default_true")]
    pub project_stub: bool,
}

impl GenerationConfig {
    fn default_style() -> String {
        "Metro Boomin".to_string()
    }

    fn default_true() -> bool {
        true
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            style: Self::default_style(),
            genre: None,
            fallback_style: None,
            layout: TrackLayout::default(),
            scheduling: NoteScheduling::default(),
            separate_stems: false,
            stems_json: true,
            project_stub: true,
        }
    }
}

/// Lyric and prompt text generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsConfig {
    #[serde(default = "LyricsConfig::default_enabled")]
    pub enabled: bool,

    /// Default: flex
    #[serde(default = "LyricsConfig::default_theme")]
    pub theme: String,

    /// Default: classic
    #[serde(default = "LyricsConfig::default_structure")]
    pub structure: String,

    /// Fixed seed for reproducible lyrics. Unset means a fresh seed per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl LyricsConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_theme() -> String {
        "flex".to_string()
    }

    fn default_structure() -> String {
        "classic".to_string()
    }
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            theme: Self::default_theme(),
            structure: Self::default_structure(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// EnvFilter directive. Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

/// A `[styles."Name"]` table: adds a style or patches a built-in one.
///
/// Fields left out keep the built-in value, or the catalog default's value
/// for a style the catalog doesn't know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<Genre>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruments: Option<Vec<String>>,
}

impl StyleEntry {
    /// Overlay this entry on `base`, renaming the result to `name`.
    pub fn apply(&self, name: &str, base: &StyleDescriptor) -> StyleDescriptor {
        let mut style = base.clone();
        style.name = name.to_string();
        if let Some(bpm) = self.bpm {
            style.tempo = bpm;
        }
        if let Some(key) = self.key {
            style.key = key;
        }
        if let Some(genre) = &self.genre {
            style.genre = genre.clone();
        }
        if let Some(mood) = &self.mood {
            style.mood = mood.clone();
        }
        if let Some(description) = &self.description {
            style.description = description.clone();
        }
        if self.scale.is_some() {
            style.scale = self.scale;
        }
        if let Some(instruments) = &self.instruments {
            style.instruments = instruments.clone();
        }
        style
    }
}
