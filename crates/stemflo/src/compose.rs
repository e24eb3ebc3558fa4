//! Stem set assembly: one track per role plus the style metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{Genre, StyleDescriptor};
use crate::key::Key;
use crate::note::{Role, RoleTrack};
use crate::patterns::generate_role;

/// Song-level facts carried alongside the tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemMetadata {
    pub genre: Genre,
    pub style: String,
    pub tempo: u16,
    pub key: Key,
}

impl StemMetadata {
    pub fn for_style(genre: &Genre, style: &StyleDescriptor) -> Self {
        StemMetadata {
            genre: genre.clone(),
            style: style.name.clone(),
            tempo: style.tempo,
            key: style.key,
        }
    }
}

/// Every role's track for one song.
///
/// All five roles are always present; a role with nothing to play holds an
/// empty track. Iteration is in role enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemSet {
    pub metadata: StemMetadata,
    stems: BTreeMap<Role, RoleTrack>,
}

impl StemSet {
    /// Build a set from whatever tracks are given, filling missing roles
    /// with empty tracks. A later track for the same role replaces an
    /// earlier one.
    pub fn new(metadata: StemMetadata, tracks: impl IntoIterator<Item = RoleTrack>) -> Self {
        let mut stems: BTreeMap<Role, RoleTrack> =
            Role::ALL.into_iter().map(|role| (role, RoleTrack::new(role))).collect();
        for track in tracks {
            stems.insert(track.role, track);
        }
        StemSet { metadata, stems }
    }

    pub fn get(&self, role: Role) -> Option<&RoleTrack> {
        self.stems.get(&role)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &RoleTrack> {
        self.stems.values()
    }

    /// Tracks with at least one note, in role order.
    pub fn non_empty(&self) -> impl Iterator<Item = &RoleTrack> {
        self.stems.values().filter(|track| !track.is_empty())
    }

    pub fn note_count(&self) -> usize {
        self.stems.values().map(RoleTrack::len).sum()
    }

    pub fn tempo(&self) -> u16 {
        self.metadata.tempo
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let parsed: StemSet = serde_json::from_str(json)?;
        Ok(StemSet::new(parsed.metadata, parsed.stems.into_values()))
    }
}

/// Generate every role for `style` and bundle the results.
pub fn assemble(genre: &Genre, style: &StyleDescriptor) -> StemSet {
    let tracks = Role::ALL
        .into_iter()
        .map(|role| generate_role(genre, style, role));
    let stems = StemSet::new(StemMetadata::for_style(genre, style), tracks);
    tracing::debug!(
        style = %style.name,
        %genre,
        notes = stems.note_count(),
        "assembled stem set"
    );
    stems
}
