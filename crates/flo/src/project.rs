//! Output file naming and the FL Studio project placeholder.

use std::path::{Path, PathBuf};
use stemflo::{Role, StyleDescriptor};

const FILE_PREFIX: &str = "sunoflo";

/// Paths for everything one `generate` run can write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    dir: PathBuf,
    stem: String,
}

impl OutputPaths {
    pub fn new(dir: &Path, style: &StyleDescriptor) -> Self {
        OutputPaths {
            dir: dir.to_path_buf(),
            stem: format!("{}_{}", FILE_PREFIX, style.slug()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn midi(&self) -> PathBuf {
        self.dir.join(format!("{}.mid", self.stem))
    }

    pub fn role_midi(&self, role: Role) -> PathBuf {
        self.dir.join(format!("{}_{}.mid", self.stem, role.as_str()))
    }

    pub fn stems_json(&self) -> PathBuf {
        self.dir.join(format!("{}_stems.json", self.stem))
    }

    pub fn project(&self) -> PathBuf {
        self.dir.join(format!("{}.flp", self.stem))
    }

    pub fn lyrics(&self) -> PathBuf {
        self.dir.join(format!("{}_lyrics.txt", self.stem))
    }
}

/// Placeholder `.flp`: `FLhd` with an empty header, then a `FlSr` block
/// holding the tempo as a little-endian f32.
pub fn flp_stub(tempo: u16) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(20);
    bytes.extend_from_slice(b"FLhd");
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(b"FlSr");
    bytes.extend_from_slice(&4u32.to_le_bytes());
    bytes.extend_from_slice(&f32::from(tempo).to_le_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use stemflo::StyleCatalog;

    #[test]
    fn stub_layout() {
        let bytes = flp_stub(140);
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[..4], b"FLhd");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(&bytes[8..12], b"FlSr");
        assert_eq!(&bytes[12..16], &[4, 0, 0, 0]);
        assert_eq!(&bytes[16..], &140.0f32.to_le_bytes());
    }

    #[test]
    fn file_names() {
        let catalog = StyleCatalog::builtin();
        let paths = OutputPaths::new(Path::new("/out"), catalog.lookup("Metro Boomin"));
        assert_eq!(paths.midi(), PathBuf::from("/out/sunoflo_metro_boomin.mid"));
        assert_eq!(
            paths.role_midi(Role::Bass),
            PathBuf::from("/out/sunoflo_metro_boomin_bass.mid")
        );
        assert_eq!(
            paths.stems_json(),
            PathBuf::from("/out/sunoflo_metro_boomin_stems.json")
        );
        assert_eq!(paths.project(), PathBuf::from("/out/sunoflo_metro_boomin.flp"));
        assert_eq!(
            paths.lyrics(),
            PathBuf::from("/out/sunoflo_metro_boomin_lyrics.txt")
        );
    }
}
