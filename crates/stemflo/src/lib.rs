//! Preset-driven stem generation and Standard MIDI File encoding.
//!
//! The pipeline is a single-shot batch transform:
//!
//! ```text
//! StyleCatalog -> PatternGenerator -> StemSet -> Encoder -> bytes
//! ```
//!
//! Generation never fails: unknown styles fall back to the catalog default and
//! unrecognized genres fall back to the backbeat templates. Encoding validates
//! every note before a single byte is produced, so a failed call never returns
//! a partial file.
//!
//! # Example
//!
//! ```
//! use stemflo::{encode, Genre, PatternGenerator, StyleCatalog};
//!
//! let catalog = StyleCatalog::builtin();
//! let generator = PatternGenerator::new(&catalog);
//! let stems = generator.generate_stem_set(&Genre::Trap, "Metro Boomin");
//! let bytes = encode(&stems).unwrap();
//! assert_eq!(&bytes[0..4], b"MThd");
//! ```

pub mod catalog;
pub mod compose;
pub mod key;
pub mod note;
pub mod patterns;
pub mod smf;

pub use catalog::{Genre, StyleCatalog, StyleDescriptor};
pub use compose::{assemble, StemMetadata, StemSet};
pub use key::{Key, KeyMode, Scale};
pub use note::{NoteEvent, NoteField, Role, RoleTrack, TICKS_PER_QUARTER};
pub use patterns::PatternGenerator;
pub use smf::{
    encode, encode_role, parse_track, read_chunks, read_vlq, role_for_track_name, write_vlq,
    Chunk, EncodeOptions, Encoder, EventKind, Header, NoteScheduling, TrackEvent, TrackLayout,
};

/// Errors from key parsing and file encoding.
///
/// Generation-time problems never show up here; the generator always
/// produces a playable fallback instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid key '{0}' (expected e.g. \"C minor\" or \"F# major\")")]
    InvalidKey(String),

    #[error("unknown scale '{0}'")]
    UnknownScale(String),

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("invalid tempo {0} BPM")]
    InvalidTempo(u16),

    #[error("{role} note {index}: {field} {value} is out of range")]
    InvalidNoteField {
        role: Role,
        index: usize,
        field: NoteField,
        value: u64,
    },

    #[error("delta of {0} ticks does not fit a variable-length quantity")]
    DeltaOverflow(u64),

    #[error("chunk length mismatch: declared {declared} bytes, wrote {actual}")]
    ChunkSizeMismatch { declared: usize, actual: usize },

    #[error("malformed MIDI data: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
