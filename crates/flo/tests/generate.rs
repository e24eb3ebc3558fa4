use flo::commands::{generate, summarize};
use flo::project::OutputPaths;
use midly::Smf;
use std::fs;
use stemconf::StemConfig;
use stemflo::{Role, StemSet, StyleCatalog, TrackLayout};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> StemConfig {
    let mut config = StemConfig::default();
    config.paths.output_dir = dir.path().to_path_buf();
    config.lyrics.seed = Some(17);
    config
}

#[test]
fn writes_every_default_output() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let report = generate(&config).unwrap();

    let catalog = StyleCatalog::builtin();
    let paths = OutputPaths::new(dir.path(), catalog.lookup(&config.generation.style));
    for path in [paths.midi(), paths.stems_json(), paths.project(), paths.lyrics()] {
        assert!(path.exists(), "missing {}", path.display());
        assert!(report.files.contains(&path));
    }
    assert!(!paths.role_midi(Role::Drums).exists());
    assert_eq!(report.lyric_seed, Some(17));

    let midi = fs::read(paths.midi()).unwrap();
    let smf = Smf::parse(&midi).unwrap();
    assert_eq!(smf.tracks.len(), 1);

    let json = fs::read_to_string(paths.stems_json()).unwrap();
    let stems = StemSet::from_json(&json).unwrap();
    assert_eq!(stems.note_count(), report.notes);
    assert_eq!(summarize(&midi).unwrap().note_ons(), report.notes);
}

#[test]
fn separate_stems_skip_empty_roles() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.generation.style = "Deadmau5".to_string();
    config.generation.separate_stems = true;
    config.generation.layout = TrackLayout::PerRole;
    config.lyrics.enabled = false;
    config.generation.project_stub = false;

    let report = generate(&config).unwrap();
    let catalog = StyleCatalog::builtin();
    let paths = OutputPaths::new(dir.path(), catalog.lookup("Deadmau5"));

    for role in [Role::Drums, Role::Bass, Role::Melody, Role::Synths] {
        let bytes = fs::read(paths.role_midi(role)).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 1);
    }
    assert!(!paths.role_midi(Role::Fx).exists());
    assert!(!paths.lyrics().exists());
    assert!(!paths.project().exists());
    assert_eq!(report.lyric_seed, None);

    let merged = summarize(&fs::read(paths.midi()).unwrap()).unwrap();
    assert_eq!(merged.header.format, 1);
    assert_eq!(merged.tracks.len(), 5);
    assert_eq!(merged.tracks[0].role, Some(Role::Drums));
    assert_eq!(merged.tracks[4].note_ons, 0);
}

#[test]
fn unknown_style_uses_fallback_name() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.generation.style = "Nobody In Particular".to_string();
    let report = generate(&config).unwrap();
    assert_eq!(report.style, StyleCatalog::builtin().fallback().name);
}

#[test]
fn lyrics_are_reproducible() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let a = flo::commands::lyrics(&config);
    let b = flo::commands::lyrics(&config);
    assert_eq!(a, b);
    assert_eq!(a.seed, 17);
}
