//! Deterministic rhythmic and melodic templates.
//!
//! Every template lives on a 16-step grid (4 bars of 4 quarter-note steps,
//! 480 ticks each) unless it subdivides a step explicitly. Velocities are
//! fixed per template. Nothing here draws randomness, so the same
//! (genre, style, role) always yields the same notes.
//!
//! Dispatch is a closed match over genre families. A new genre gets a family
//! arm in [`Family::of`] and, if it needs one, a new template function.

use crate::catalog::{Genre, StyleCatalog, StyleDescriptor};
use crate::compose::{assemble, StemSet};
use crate::note::{Role, RoleTrack, BAR, STEP};

/// Steps in one pattern: 4 bars of 4.
const PATTERN_STEPS: u32 = 16;

/// Length given to drum hits, which have no natural duration.
const DRUM_HIT: u32 = 480;

const KICK: u8 = 36;
const CLAP: u8 = 39;
const SNARE: u8 = 38;
const ELECTRIC_SNARE: u8 = 40;
const CLOSED_HAT: u8 = 42;
const OPEN_HAT: u8 = 44;

const BASS_OCTAVE: u8 = 1;
const PAD_OCTAVE: u8 = 3;
const MELODY_OCTAVE: u8 = 4;

/// Rhythmic family a genre belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Half-time trap/drill feel
    Syncopated,
    Trance,
    FourOnTheFloor,
    /// Rock/pop backbeat, also the fallback for anything unrecognized
    Backbeat,
}

impl Family {
    pub fn of(genre: &Genre) -> Family {
        match genre {
            Genre::Trap | Genre::Drill | Genre::Phonk => Family::Syncopated,
            Genre::Trance => Family::Trance,
            Genre::House | Genre::Edm | Genre::Techno | Genre::ProgressiveHouse => {
                Family::FourOnTheFloor
            }
            _ => Family::Backbeat,
        }
    }
}

/// Melodic template a genre uses for the lead role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MelodyShape {
    /// One sustained scale degree per bar
    Anthem,
    /// 80-tick arpeggio inside every step
    Arpeggio,
    /// Stacked minor-third/fifth chords, one per bar
    Chords,
    /// Plain ascending scale walk
    Walk,
}

impl MelodyShape {
    pub fn of(genre: &Genre) -> MelodyShape {
        match genre {
            Genre::Rock => MelodyShape::Anthem,
            Genre::Trance => MelodyShape::Arpeggio,
            Genre::LoFi | Genre::HipHop => MelodyShape::Chords,
            _ => MelodyShape::Walk,
        }
    }
}

/// Produces role tracks from genre templates.
///
/// Holds the catalog used to resolve style names; the catalog is borrowed,
/// never mutated.
#[derive(Debug, Clone, Copy)]
pub struct PatternGenerator<'a> {
    catalog: &'a StyleCatalog,
}

impl<'a> PatternGenerator<'a> {
    pub fn new(catalog: &'a StyleCatalog) -> Self {
        PatternGenerator { catalog }
    }

    pub fn catalog(&self) -> &'a StyleCatalog {
        self.catalog
    }

    /// Generate one role's notes. Never fails.
    pub fn generate_role(&self, genre: &Genre, style: &StyleDescriptor, role: Role) -> RoleTrack {
        generate_role(genre, style, role)
    }

    /// Resolve `style_name` (falling back on a miss) and generate every role.
    pub fn generate_stem_set(&self, genre: &Genre, style_name: &str) -> StemSet {
        let style = self.catalog.lookup(style_name);
        assemble(genre, style)
    }
}

/// Generate one role's notes for a genre/style pair. Never fails.
pub fn generate_role(genre: &Genre, style: &StyleDescriptor, role: Role) -> RoleTrack {
    let family = Family::of(genre);
    let track = match role {
        Role::Drums => drums(family),
        Role::Bass => bass(family, style),
        Role::Melody => melody(MelodyShape::of(genre), style),
        Role::Synths => synths(family, style),
        Role::Fx => RoleTrack::new(Role::Fx),
    };
    tracing::debug!(
        %genre,
        style = %style.name,
        %role,
        notes = track.len(),
        "generated role"
    );
    track
}

/// Root plus a signed semitone offset, clamped into MIDI range.
fn transpose(root: u8, semitones: i16) -> u8 {
    (root as i16 + semitones).clamp(0, 127) as u8
}

fn drums(family: Family) -> RoleTrack {
    let mut kick = Vec::new();
    let mut snare = Vec::new();
    let mut hat = Vec::new();
    let mut clap = Vec::new();

    for i in 0..PATTERN_STEPS {
        let t = i * STEP;
        match family {
            Family::Syncopated => {
                if i % 4 == 0 {
                    kick.push((t, KICK, 127));
                }
                if i % 8 == 4 {
                    snare.push((t, SNARE, 120));
                }
                if i % 2 == 0 {
                    hat.push((t, CLOSED_HAT, 80));
                }
            }
            Family::Trance => {
                kick.push((t, KICK, 127));
                if i % 4 == 2 {
                    clap.push((t, CLAP, 100));
                }
                hat.push((t + STEP / 2, OPEN_HAT, 60));
            }
            Family::FourOnTheFloor => {
                kick.push((t, KICK, 127));
                if i % 2 == 1 {
                    snare.push((t, ELECTRIC_SNARE, 110));
                }
                hat.push((t + STEP / 4, CLOSED_HAT, 70));
            }
            Family::Backbeat => {
                if i % 4 == 0 {
                    kick.push((t, KICK, 127));
                }
                if i % 8 == 6 {
                    snare.push((t, SNARE, 120));
                }
                hat.push((t, CLOSED_HAT, 60));
            }
        }
    }

    let mut track = RoleTrack::new(Role::Drums);
    for (onset, pitch, velocity) in kick.into_iter().chain(snare).chain(hat).chain(clap) {
        track.push(onset, pitch, velocity, DRUM_HIT);
    }
    track
}

fn bass(family: Family, style: &StyleDescriptor) -> RoleTrack {
    let root = style.key.root_at_octave(BASS_OCTAVE);
    let mut track = RoleTrack::new(Role::Bass);

    match family {
        Family::Syncopated => {
            for i in 0..PATTERN_STEPS {
                match i % 4 {
                    0 => track.push(i * STEP, root, 127, STEP),
                    2 => track.push(i * STEP, transpose(root, -5), 100, STEP),
                    _ => {}
                }
            }
        }
        Family::Trance => {
            let half = STEP / 2;
            for i in 0..PATTERN_STEPS {
                track.push(i * STEP, root, 110, half);
                track.push(i * STEP + half, transpose(root, 7), 90, half);
            }
        }
        Family::FourOnTheFloor => {
            for i in 0..PATTERN_STEPS {
                track.push(i * STEP, root, 120, STEP);
            }
        }
        Family::Backbeat => {
            track.push(0, root, 110, BAR);
            track.push(BAR, transpose(root, 5), 100, BAR);
            track.push(2 * BAR, root, 110, BAR);
        }
    }
    track
}

const ANTHEM_DEGREES: [usize; 8] = [0, 3, 4, 2, 5, 4, 3, 0];
const ARPEGGIO_SEMITONES: [i16; 6] = [0, 4, 7, 12, 7, 4];
const ARPEGGIO_TICK: u32 = 80;
const CHORD_DEGREES: [usize; 4] = [0, 2, 4, 5];
const CHORD_STACK: [i16; 3] = [0, 3, 7];
/// Bar-length notes release slightly early so consecutive bars re-attack.
const HELD: u32 = 1800;

fn melody(shape: MelodyShape, style: &StyleDescriptor) -> RoleTrack {
    let root = style.key.root_at_octave(MELODY_OCTAVE);
    let scale = style.scale();
    let mut track = RoleTrack::new(Role::Melody);

    match shape {
        MelodyShape::Anthem => {
            for (bar, &degree) in ANTHEM_DEGREES.iter().enumerate() {
                let pitch = transpose(root, scale.semitones(degree) as i16);
                track.push(bar as u32 * BAR, pitch, 100, HELD);
            }
        }
        MelodyShape::Arpeggio => {
            for i in 0..PATTERN_STEPS {
                for (j, &semitones) in ARPEGGIO_SEMITONES.iter().enumerate() {
                    let onset = i * STEP + j as u32 * ARPEGGIO_TICK;
                    track.push(onset, transpose(root, semitones), 90, ARPEGGIO_TICK);
                }
            }
        }
        MelodyShape::Chords => {
            for (bar, &degree) in CHORD_DEGREES.iter().enumerate() {
                let chord_root = scale.semitones(degree) as i16;
                for offset in CHORD_STACK {
                    let pitch = transpose(root, chord_root + offset);
                    track.push(bar as u32 * BAR, pitch, 70, HELD);
                }
            }
        }
        MelodyShape::Walk => {
            for i in 0..8u32 {
                let pitch = transpose(root, scale.semitones(i as usize % 7) as i16);
                track.push(i * 2 * STEP, pitch, 90, 900);
            }
        }
    }
    track
}

const PAD_CHORD: [i16; 4] = [0, 4, 7, 12];

fn synths(family: Family, style: &StyleDescriptor) -> RoleTrack {
    let root = style.key.root_at_octave(PAD_OCTAVE);
    let mut track = RoleTrack::new(Role::Synths);

    match family {
        Family::Trance => {
            for bar in 0..4 {
                for offset in PAD_CHORD {
                    track.push(bar * BAR, transpose(root, offset), 80, HELD);
                }
            }
        }
        _ => track.push(0, root, 75, PATTERN_STEPS * STEP),
    }
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{Key, Scale};
    use crate::note::NoteEvent;
    use pretty_assertions::assert_eq;

    fn style(genre: Genre) -> StyleDescriptor {
        StyleDescriptor::new("Fixture", 120, Key::c_minor(), genre)
    }

    fn onsets_of(track: &RoleTrack, pitch: u8) -> Vec<u32> {
        track
            .events
            .iter()
            .filter(|e| e.pitch == pitch)
            .map(|e| e.onset)
            .collect()
    }

    #[test]
    fn backbeat_kicks_once_per_bar() {
        let track = generate_role(&Genre::Pop, &style(Genre::Pop), Role::Drums);
        assert_eq!(onsets_of(&track, KICK), vec![0, 1920, 3840, 5760]);
        assert_eq!(onsets_of(&track, SNARE), vec![2880, 6720]);
        assert_eq!(onsets_of(&track, CLOSED_HAT).len(), 16);
        assert!(track.events.iter().all(|e| e.channel == 10));
    }

    #[test]
    fn unknown_genre_uses_backbeat() {
        let odd = Genre::from_name("Sea Shanty");
        assert_eq!(
            generate_role(&odd, &style(odd.clone()), Role::Drums),
            generate_role(&Genre::Rock, &style(Genre::Rock), Role::Drums)
        );
    }

    #[test]
    fn trap_drums() {
        let track = generate_role(&Genre::Trap, &style(Genre::Trap), Role::Drums);
        assert_eq!(onsets_of(&track, KICK), vec![0, 1920, 3840, 5760]);
        assert_eq!(onsets_of(&track, SNARE), vec![1920, 5760]);
        assert_eq!(onsets_of(&track, CLOSED_HAT).len(), 8);
        // Kicks come first, then snares, then hats
        assert_eq!(track.events[0].pitch, KICK);
        assert_eq!(track.events[4].pitch, SNARE);
        assert_eq!(track.events[0].velocity, 127);
    }

    #[test]
    fn trance_drums_offbeat_hats() {
        let track = generate_role(&Genre::Trance, &style(Genre::Trance), Role::Drums);
        assert_eq!(onsets_of(&track, KICK).len(), 16);
        assert_eq!(onsets_of(&track, CLAP), vec![960, 2880, 4800, 6720]);
        assert_eq!(onsets_of(&track, OPEN_HAT)[0], 240);
    }

    #[test]
    fn house_drums() {
        let track = generate_role(&Genre::House, &style(Genre::House), Role::Drums);
        assert_eq!(onsets_of(&track, KICK).len(), 16);
        assert_eq!(onsets_of(&track, ELECTRIC_SNARE).len(), 8);
        assert_eq!(onsets_of(&track, CLOSED_HAT)[0], 120);
    }

    #[test]
    fn trap_bass_root_and_fifth_below() {
        let track = generate_role(&Genre::Trap, &style(Genre::Trap), Role::Bass);
        // C1 = 24, fourth below = 19
        let expected: Vec<NoteEvent> = (0..4)
            .flat_map(|bar| {
                [
                    NoteEvent::new(bar * 1920, 24, 127, 480, 1),
                    NoteEvent::new(bar * 1920 + 960, 19, 100, 480, 1),
                ]
            })
            .collect();
        assert_eq!(track.events, expected);
    }

    #[test]
    fn backbeat_bass_whole_bars() {
        let track = generate_role(&Genre::Rock, &style(Genre::Rock), Role::Bass);
        assert_eq!(
            track.events,
            vec![
                NoteEvent::new(0, 24, 110, 1920, 1),
                NoteEvent::new(1920, 29, 100, 1920, 1),
                NoteEvent::new(3840, 24, 110, 1920, 1),
            ]
        );
    }

    #[test]
    fn trance_arpeggio_subdivides_steps() {
        let track = generate_role(&Genre::Trance, &style(Genre::Trance), Role::Melody);
        assert_eq!(track.len(), 96);
        let first: Vec<(u32, u8)> = track.events[..6].iter().map(|e| (e.onset, e.pitch)).collect();
        assert_eq!(
            first,
            vec![(0, 60), (80, 64), (160, 67), (240, 72), (320, 67), (400, 64)]
        );
        assert!(track.events.iter().all(|e| e.duration == 80));
    }

    #[test]
    fn rock_anthem_walks_minor_degrees() {
        let track = generate_role(&Genre::Rock, &style(Genre::Rock), Role::Melody);
        let pitches: Vec<u8> = track.events.iter().map(|e| e.pitch).collect();
        // C minor degrees 0,3,4,2,5,4,3,0 from C4
        assert_eq!(pitches, vec![60, 65, 67, 63, 68, 67, 65, 60]);
        assert_eq!(track.events[7].onset, 7 * 1920);
    }

    #[test]
    fn lofi_chords_stack_three_notes() {
        let track = generate_role(&Genre::LoFi, &style(Genre::LoFi), Role::Melody);
        assert_eq!(track.len(), 12);
        let first_bar: Vec<u8> = track.events[..3].iter().map(|e| e.pitch).collect();
        assert_eq!(first_bar, vec![60, 63, 67]);
    }

    #[test]
    fn walk_respects_scale_override() {
        let dorian = style(Genre::Pop).with_scale(Scale::Dorian);
        let track = generate_role(&Genre::Pop, &dorian, Role::Melody);
        let pitches: Vec<u8> = track.events.iter().map(|e| e.pitch).collect();
        assert_eq!(pitches, vec![60, 62, 63, 65, 67, 69, 70, 60]);
        assert_eq!(track.events[1].onset, 960);
    }

    #[test]
    fn pads() {
        let trance = generate_role(&Genre::Trance, &style(Genre::Trance), Role::Synths);
        assert_eq!(trance.len(), 16);
        let default = generate_role(&Genre::Trap, &style(Genre::Trap), Role::Synths);
        assert_eq!(default.events, vec![NoteEvent::new(0, 48, 75, 7680, 1)]);
    }

    #[test]
    fn trance_pad_and_arpeggio_share_channel_one() {
        let trance = style(Genre::Trance);
        let pad = generate_role(&Genre::Trance, &trance, Role::Synths);
        let arp = generate_role(&Genre::Trance, &trance, Role::Melody);
        // The pad's octave note doubles the arpeggio root on the same channel,
        // so the arpeggio's releases cut it in a merged track.
        assert!(pad.events.iter().any(|e| e.pitch == 60 && e.channel == 1));
        assert!(arp.events.iter().any(|e| e.pitch == 60 && e.channel == 1));
    }

    #[test]
    fn fx_is_empty() {
        assert!(generate_role(&Genre::Trap, &style(Genre::Trap), Role::Fx).is_empty());
    }

    #[test]
    fn generation_is_deterministic() {
        let catalog = StyleCatalog::builtin();
        for style in catalog.iter() {
            for role in Role::ALL {
                assert_eq!(
                    generate_role(&style.genre, style, role),
                    generate_role(&style.genre, style, role)
                );
            }
        }
    }

    #[test]
    fn all_builtin_pitches_in_range() {
        let catalog = StyleCatalog::builtin();
        for style in catalog.iter() {
            for role in Role::ALL {
                let track = generate_role(&style.genre, style, role);
                assert!(track.events.iter().all(|e| e.validate().is_ok()));
            }
        }
    }

    #[test]
    fn generator_resolves_unknown_style_to_fallback() {
        let default = StyleDescriptor::new("Default", 120, Key::c_minor(), Genre::Pop);
        let catalog = StyleCatalog::new(default);
        let generator = PatternGenerator::new(&catalog);
        let stems = generator.generate_stem_set(&Genre::Pop, "default fallback");
        assert_eq!(stems.metadata.style, "Default");
        assert_eq!(stems.metadata.tempo, 120);
        let drums = stems.get(Role::Drums).unwrap();
        assert_eq!(onsets_of(drums, KICK), vec![0, 1920, 3840, 5760]);
    }
}
