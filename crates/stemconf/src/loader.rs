//! Config file discovery, loading, and environment variable overlay.

use crate::settings::{GenerationConfig, LyricsConfig, PathsConfig, TelemetryConfig};
use crate::{ConfigError, StemConfig};
use std::env;
use std::path::{Path, PathBuf};
use stemflo::Genre;

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Config files that exist, in load order.
///
/// System first, then user, then the local `stemflo.toml`.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    discover_with_local(cli_path, Path::new(LOCAL_CONFIG))
}

const LOCAL_CONFIG: &str = "stemflo.toml";

fn discover_with_local(cli_path: Option<&Path>, local: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/stemflo/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("stemflo/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    if local.exists() {
        files.push(local.to_path_buf());
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<StemConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

/// Parse config from a TOML string. Missing sections and keys take defaults.
pub fn parse_toml(contents: &str, path: &Path) -> Result<StemConfig, ConfigError> {
    let mut config: StemConfig = toml::from_str(contents).map_err(|e: toml::de::Error| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    let raw = config.paths.output_dir.to_string_lossy().into_owned();
    config.paths.output_dir = expand_path(&raw);
    Ok(config)
}

/// Pick `overlay` where it differs from the default, else keep `base`.
fn pick<T: PartialEq>(base: T, overlay: T, default: &T) -> T {
    if &overlay != default {
        overlay
    } else {
        base
    }
}

/// Merge two configs, with `overlay` taking precedence.
///
/// A value in `overlay` wins only when it differs from the compiled default,
/// so a file that leaves a key out never resets an earlier file's setting.
/// Style tables are merged by name.
pub fn merge_configs(base: StemConfig, overlay: StemConfig) -> StemConfig {
    let paths = PathsConfig::default();
    let generation = GenerationConfig::default();
    let lyrics = LyricsConfig::default();
    let telemetry = TelemetryConfig::default();

    let mut styles = base.styles;
    styles.extend(overlay.styles);

    StemConfig {
        paths: PathsConfig {
            output_dir: pick(base.paths.output_dir, overlay.paths.output_dir, &paths.output_dir),
        },
        generation: GenerationConfig {
            style: pick(base.generation.style, overlay.generation.style, &generation.style),
            genre: pick(base.generation.genre, overlay.generation.genre, &generation.genre),
            fallback_style: pick(
                base.generation.fallback_style,
                overlay.generation.fallback_style,
                &generation.fallback_style,
            ),
            layout: pick(base.generation.layout, overlay.generation.layout, &generation.layout),
            scheduling: pick(
                base.generation.scheduling,
                overlay.generation.scheduling,
                &generation.scheduling,
            ),
            separate_stems: pick(
                base.generation.separate_stems,
                overlay.generation.separate_stems,
                &generation.separate_stems,
            ),
            stems_json: pick(
                base.generation.stems_json,
                overlay.generation.stems_json,
                &generation.stems_json,
            ),
            project_stub: pick(
                base.generation.project_stub,
                overlay.generation.project_stub,
                &generation.project_stub,
            ),
        },
        lyrics: LyricsConfig {
            enabled: pick(base.lyrics.enabled, overlay.lyrics.enabled, &lyrics.enabled),
            theme: pick(base.lyrics.theme, overlay.lyrics.theme, &lyrics.theme),
            structure: pick(base.lyrics.structure, overlay.lyrics.structure, &lyrics.structure),
            seed: pick(base.lyrics.seed, overlay.lyrics.seed, &lyrics.seed),
        },
        telemetry: TelemetryConfig {
            log_level: pick(
                base.telemetry.log_level,
                overlay.telemetry.log_level,
                &telemetry.log_level,
            ),
        },
        styles,
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut StemConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("STEMFLO_OUTPUT_DIR") {
        config.paths.output_dir = expand_path(&v);
        sources.env_overrides.push("STEMFLO_OUTPUT_DIR".to_string());
    }

    if let Ok(v) = env::var("STEMFLO_STYLE") {
        config.generation.style = v;
        sources.env_overrides.push("STEMFLO_STYLE".to_string());
    }
    if let Ok(v) = env::var("STEMFLO_GENRE") {
        config.generation.genre = Some(Genre::from_name(&v));
        sources.env_overrides.push("STEMFLO_GENRE".to_string());
    }

    if let Ok(v) = env::var("STEMFLO_SEED") {
        if let Ok(seed) = v.parse() {
            config.lyrics.seed = Some(seed);
            sources.env_overrides.push("STEMFLO_SEED".to_string());
        }
    }

    if let Ok(v) = env::var("STEMFLO_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("STEMFLO_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Ok(v) = env::var("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        directories::BaseDirs::new()
            .map(|d| d.home_dir().join(stripped))
            .unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(stripped) = path.strip_prefix('$') {
        // $VAR/rest/of/path
        match stripped.split_once('/') {
            Some((var_name, rest)) => env::var(var_name)
                .map(|value| PathBuf::from(value).join(rest))
                .unwrap_or_else(|_| PathBuf::from(path)),
            None => env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path)),
        }
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use stemflo::{Key, NoteScheduling, Scale, TrackLayout};
    use tempfile::TempDir;

    // Tests touching process env must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 5] = [
        "STEMFLO_OUTPUT_DIR",
        "STEMFLO_STYLE",
        "STEMFLO_GENRE",
        "STEMFLO_SEED",
        "STEMFLO_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/test/path");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_absolute() {
        let expanded = expand_path("/absolute/path");
        assert_eq!(expanded, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_path_unset_var_kept() {
        let expanded = expand_path("$STEMFLO_SURELY_UNSET_VAR/beats");
        assert_eq!(expanded, PathBuf::from("$STEMFLO_SURELY_UNSET_VAR/beats"));
    }

    #[test]
    fn test_discover_config_files() {
        // Depends on the host; only exercise the lookup
        let _files = discover_config_files();
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
[paths]
output_dir = "/srv/beats"
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();
        assert_eq!(config.paths.output_dir, PathBuf::from("/srv/beats"));
        // Other values should be defaults
        assert_eq!(config.generation.style, "Metro Boomin");
        assert!(config.lyrics.enabled);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[paths]
output_dir = "/data/out"

[generation]
style = "Deadmau5"
genre = "Progressive House"
layout = "per-role"
scheduling = "sequential"
separate_stems = true
stems_json = false

[lyrics]
theme = "hustle"
structure = "trap"
seed = 42

[telemetry]
log_level = "debug"

[styles."Night Drive"]
bpm = 118
key = "F# minor"
genre = "Synthwave"
scale = "dorian"
instruments = ["Sytrus"]
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();

        assert_eq!(config.paths.output_dir, PathBuf::from("/data/out"));
        assert_eq!(config.generation.style, "Deadmau5");
        assert_eq!(config.generation.genre, Some(Genre::ProgressiveHouse));
        assert_eq!(config.generation.layout, TrackLayout::PerRole);
        assert_eq!(config.generation.scheduling, NoteScheduling::Sequential);
        assert!(config.generation.separate_stems);
        assert!(!config.generation.stems_json);
        assert_eq!(config.lyrics.theme, "hustle");
        assert_eq!(config.lyrics.seed, Some(42));
        assert_eq!(config.telemetry.log_level, "debug");

        let night = &config.styles["Night Drive"];
        assert_eq!(night.bpm, Some(118));
        assert_eq!(night.key, Some("F# minor".parse::<Key>().unwrap()));
        assert_eq!(night.scale, Some(Scale::Dorian));
    }

    #[test]
    fn test_parse_rejects_bad_key() {
        let toml = r#"
[styles.Broken]
key = "H minor"
"#;
        let err = parse_toml(toml, Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_parse_rejects_bad_layout() {
        let toml = "[generation]\nlayout = \"sideways\"\n";
        assert!(parse_toml(toml, Path::new("t.toml")).is_err());
    }

    #[test]
    fn test_merge_keeps_base_when_overlay_is_default() {
        let base = parse_toml("[generation]\nstyle = \"Wheezy\"\n", Path::new("a")).unwrap();
        let overlay = parse_toml("[lyrics]\ntheme = \"love\"\n", Path::new("b")).unwrap();
        let merged = merge_configs(base, overlay);
        assert_eq!(merged.generation.style, "Wheezy");
        assert_eq!(merged.lyrics.theme, "love");
    }

    #[test]
    fn test_merge_styles_by_name() {
        let base = parse_toml(
            "[styles.A]\nbpm = 100\n[styles.B]\nbpm = 110\n",
            Path::new("a"),
        )
        .unwrap();
        let overlay = parse_toml("[styles.B]\nbpm = 120\n", Path::new("b")).unwrap();
        let merged = merge_configs(base, overlay);
        assert_eq!(merged.styles["A"].bpm, Some(100));
        assert_eq!(merged.styles["B"].bpm, Some(120));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "stemflo.toml", "[generation]\nstyle = \"Wheezy\"\n");
        let config = load_from_file(&path).unwrap();
        assert_eq!(config.generation.style, "Wheezy");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_from_file(&missing).unwrap_err();
        match err {
            ConfigError::FileRead { path, .. } => assert_eq!(path, missing),
            other => panic!("expected FileRead, got {other:?}"),
        }
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = load_from_file(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_cli_path_replaces_local() {
        let dir = TempDir::new().unwrap();
        let local = write_config(&dir, "stemflo.toml", "");
        let cli = write_config(&dir, "custom.toml", "");

        let files = discover_with_local(None, &local);
        assert_eq!(files.last(), Some(&local));

        let files = discover_with_local(Some(&cli), &local);
        assert_eq!(files.last(), Some(&cli));
        assert!(!files.contains(&local));

        // A CLI path that does not exist leaves the local file in place
        let files = discover_with_local(Some(&dir.path().join("gone.toml")), &local);
        assert_eq!(files.last(), Some(&local));
    }

    #[test]
    fn test_load_with_sources_from_cli_path() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "stemflo.toml",
            r#"
[paths]
output_dir = "/srv/beats"

[generation]
style = "Deadmau5"
separate_stems = true

[lyrics]
theme = "party"
"#,
        );

        let (config, sources) = StemConfig::load_with_sources_from(Some(&path)).unwrap();
        assert_eq!(sources.files.last(), Some(&path));
        assert_eq!(config.paths.output_dir, PathBuf::from("/srv/beats"));
        assert_eq!(config.generation.style, "Deadmau5");
        assert!(config.generation.separate_stems);
        assert_eq!(config.lyrics.theme, "party");
        assert!(!sources
            .env_overrides
            .iter()
            .any(|v| v.starts_with("STEMFLO_")));
    }

    #[test]
    fn test_load_with_sources_bad_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "broken.toml", "[generation\nstyle = ");
        let err = StemConfig::load_with_sources_from(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("STEMFLO_SEED", "1234");
        env::set_var("STEMFLO_GENRE", "drum and bass");
        env::set_var("STEMFLO_STYLE", "Skrillex");

        let mut config = StemConfig::default();
        let mut sources = ConfigSources::default();
        apply_env_overrides(&mut config, &mut sources);
        clear_env();

        assert_eq!(config.lyrics.seed, Some(1234));
        assert_eq!(config.generation.genre, Some(Genre::DnB));
        assert_eq!(config.generation.style, "Skrillex");
        for var in ["STEMFLO_SEED", "STEMFLO_GENRE", "STEMFLO_STYLE"] {
            assert!(sources.env_overrides.iter().any(|v| v == var), "{var} not recorded");
        }
    }

    #[test]
    fn test_unparsable_seed_ignored() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("STEMFLO_SEED", "lots");

        let mut config = StemConfig::default();
        config.lyrics.seed = Some(7);
        let mut sources = ConfigSources::default();
        apply_env_overrides(&mut config, &mut sources);
        clear_env();

        assert_eq!(config.lyrics.seed, Some(7));
        assert!(!sources.env_overrides.iter().any(|v| v == "STEMFLO_SEED"));
    }

    #[test]
    fn test_env_beats_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "stemflo.toml", "[generation]\nstyle = \"Deadmau5\"\n");
        env::set_var("STEMFLO_STYLE", "Drake");

        let result = StemConfig::load_with_sources_from(Some(&path));
        clear_env();

        let (config, sources) = result.unwrap();
        assert_eq!(config.generation.style, "Drake");
        assert_eq!(sources.files.last(), Some(&path));
        assert!(sources.env_overrides.iter().any(|v| v == "STEMFLO_STYLE"));
    }
}
