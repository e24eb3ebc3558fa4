//! Layered configuration loading for stemflo.
//!
//! # Usage
//!
//! ```rust,no_run
//! use stemconf::StemConfig;
//!
//! let config = StemConfig::load().expect("Failed to load config");
//! println!("Output dir: {}", config.paths.output_dir.display());
//! println!("Style: {}", config.generation.style);
//!
//! // Built-in presets with any [styles] tables applied
//! let catalog = config.catalog();
//! println!("{} styles", catalog.len());
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/stemflo/config.toml` (system)
//! 2. `~/.config/stemflo/config.toml` (user)
//! 3. `./stemflo.toml` (local override, replaced by `--config PATH`)
//! 4. Environment variables (`STEMFLO_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! output_dir = "~/Downloads"
//!
//! [generation]
//! style = "Metro Boomin"
//! layout = "merged"            # or "per-role"
//! scheduling = "interleaved"   # or "sequential"
//! separate_stems = false
//!
//! [lyrics]
//! theme = "flex"
//! structure = "classic"
//! seed = 7
//!
//! [telemetry]
//! log_level = "info"
//!
//! [styles."Night Drive"]
//! bpm = 118
//! key = "F# minor"
//! genre = "Synthwave"
//! scale = "dorian"
//! ```

pub mod loader;
pub mod settings;

pub use loader::{discover_config_files_with_override, expand_path, ConfigSources};
pub use settings::{GenerationConfig, LyricsConfig, PathsConfig, StyleEntry, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use stemflo::{EncodeOptions, StyleCatalog};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete stemflo configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StemConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub lyrics: LyricsConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Extra or patched style presets, keyed by style name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, StyleEntry>,
}

impl StemConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/stemflo/config.toml`
    /// 3. `~/.config/stemflo/config.toml`
    /// 4. `./stemflo.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./stemflo.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Like [`load_from`](Self::load_from), also reporting which files and
    /// variables contributed.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = StemConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Built-in catalog with the `[styles]` tables applied.
    ///
    /// An entry naming a built-in style patches it; any other entry adds a
    /// new style based on the catalog default. `generation.fallback_style`
    /// then picks the style unknown names resolve to.
    pub fn catalog(&self) -> StyleCatalog {
        let builtin = StyleCatalog::builtin();
        let mut catalog = builtin.clone();
        for (name, entry) in &self.styles {
            let base = builtin.get(name).unwrap_or_else(|| builtin.fallback());
            catalog = catalog.with_style(entry.apply(name, base));
        }
        match &self.generation.fallback_style {
            Some(name) => catalog.with_fallback(name),
            None => catalog,
        }
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            layout: self.generation.layout,
            scheduling: self.generation.scheduling,
        }
    }

    /// Render the effective config as TOML, e.g. for `flo config`.
    pub fn to_toml(&self) -> String {
        // Same section order as the example in the crate docs
        let mut output = String::new();

        output.push_str("# stemflo configuration\n\n");

        output.push_str("[paths]\n");
        output.push_str(&format!(
            "output_dir = {}\n",
            quote(&self.paths.output_dir.to_string_lossy())
        ));

        let generation = &self.generation;
        output.push_str("\n[generation]\n");
        output.push_str(&format!("style = {}\n", quote(&generation.style)));
        match &generation.genre {
            Some(genre) => output.push_str(&format!("genre = {}\n", quote(genre.display_name()))),
            None => output.push_str("# genre = \"Trap\"  (unset: use the style's genre)\n"),
        }
        match &generation.fallback_style {
            Some(name) => output.push_str(&format!("fallback_style = {}\n", quote(name))),
            None => output.push_str("# fallback_style = \"Metro Boomin\"\n"),
        }
        output.push_str(&format!("layout = \"{}\"\n", layout_name(generation)));
        output.push_str(&format!("scheduling = \"{}\"\n", scheduling_name(generation)));
        output.push_str(&format!("separate_stems = {}\n", generation.separate_stems));
        output.push_str(&format!("stems_json = {}\n", generation.stems_json));
        output.push_str(&format!("project_stub = {}\n", generation.project_stub));

        output.push_str("\n[lyrics]\n");
        output.push_str(&format!("enabled = {}\n", self.lyrics.enabled));
        output.push_str(&format!("theme = {}\n", quote(&self.lyrics.theme)));
        output.push_str(&format!("structure = {}\n", quote(&self.lyrics.structure)));
        match self.lyrics.seed {
            Some(seed) => output.push_str(&format!("seed = {}\n", seed)),
            None => output.push_str("# seed = 0  (unset: random per run)\n"),
        }

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = {}\n", quote(&self.telemetry.log_level)));

        for (name, entry) in &self.styles {
            output.push_str(&format!("\n[styles.{}]\n", quote(name)));
            if let Some(bpm) = entry.bpm {
                output.push_str(&format!("bpm = {}\n", bpm));
            }
            if let Some(key) = entry.key {
                output.push_str(&format!("key = \"{}\"\n", key));
            }
            if let Some(genre) = &entry.genre {
                output.push_str(&format!("genre = {}\n", quote(genre.display_name())));
            }
            if let Some(mood) = &entry.mood {
                output.push_str(&format!("mood = {}\n", quote(mood)));
            }
            if let Some(description) = &entry.description {
                output.push_str(&format!("description = {}\n", quote(description)));
            }
            if let Some(scale) = entry.scale {
                output.push_str(&format!("scale = \"{}\"\n", scale));
            }
            if let Some(instruments) = &entry.instruments {
                let list: Vec<String> = instruments.iter().map(|i| quote(i)).collect();
                output.push_str(&format!("instruments = [{}]\n", list.join(", ")));
            }
        }

        output
    }
}

fn layout_name(generation: &GenerationConfig) -> &'static str {
    match generation.layout {
        stemflo::TrackLayout::Merged => "merged",
        stemflo::TrackLayout::PerRole => "per-role",
    }
}

fn scheduling_name(generation: &GenerationConfig) -> &'static str {
    match generation.scheduling {
        stemflo::NoteScheduling::Interleaved => "interleaved",
        stemflo::NoteScheduling::Sequential => "sequential",
    }
}

/// TOML basic string with quotes and backslashes escaped.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stemflo::{Genre, Scale};

    #[test]
    fn test_default_config() {
        let config = StemConfig::default();
        assert_eq!(config.generation.style, "Metro Boomin");
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.styles.is_empty());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let mut config = StemConfig::default();
        config.generation.genre = Some(Genre::RnB);
        config.generation.fallback_style = Some("Deadmau5".to_string());
        config.lyrics.seed = Some(99);
        config.styles.insert(
            "Night Drive".to_string(),
            StyleEntry {
                bpm: Some(118),
                key: Some("F# minor".parse().unwrap()),
                scale: Some(Scale::Dorian),
                instruments: Some(vec!["Sytrus".to_string()]),
                ..Default::default()
            },
        );

        let toml_str = config.to_toml();
        let parsed = loader::parse_toml(&toml_str, Path::new("rendered.toml")).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_catalog_applies_styles() {
        let mut config = StemConfig::default();
        config.styles.insert(
            "Metro Boomin".to_string(),
            StyleEntry {
                bpm: Some(150),
                ..Default::default()
            },
        );
        config.styles.insert(
            "Brand New".to_string(),
            StyleEntry {
                genre: Some(Genre::House),
                ..Default::default()
            },
        );

        let catalog = config.catalog();
        assert_eq!(catalog.lookup("Metro Boomin").tempo, 150);
        assert_eq!(catalog.fallback().tempo, 150);
        let fresh = catalog.lookup("Brand New");
        assert_eq!(fresh.name, "Brand New");
        assert_eq!(fresh.genre, Genre::House);
        assert_eq!(fresh.tempo, 140);
    }

    #[test]
    fn test_fallback_style() {
        let mut config = StemConfig::default();
        config.generation.fallback_style = Some("deadmau5".to_string());
        let catalog = config.catalog();
        assert_eq!(catalog.lookup("Nobody").name, "Deadmau5");

        config.generation.fallback_style = Some("Nobody Either".to_string());
        assert_eq!(config.catalog().fallback().name, "Metro Boomin");
    }
}
