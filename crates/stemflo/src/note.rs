use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Fixed resolution: 480 ticks = one quarter note.
pub const TICKS_PER_QUARTER: u16 = 480;

/// One step of the 16-step template grid (a quarter note).
pub const STEP: u32 = TICKS_PER_QUARTER as u32;

/// One 4/4 bar.
pub const BAR: u32 = STEP * 4;

/// Instrumental role of a stem. Declaration order is the merge tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Drums,
    Bass,
    Melody,
    Synths,
    Fx,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Drums, Role::Bass, Role::Melody, Role::Synths, Role::Fx];

    /// Lowercase identifier used in file names and config.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Drums => "drums",
            Role::Bass => "bass",
            Role::Melody => "melody",
            Role::Synths => "synths",
            Role::Fx => "fx",
        }
    }

    /// Name written into the track-name meta-event.
    pub fn track_name(self) -> &'static str {
        match self {
            Role::Drums => "Drums",
            Role::Bass => "Bass",
            Role::Melody => "Melody",
            Role::Synths => "Synths/Pad",
            Role::Fx => "FX",
        }
    }

    /// Declared (1-based) MIDI channel. Drums use GM percussion channel 10.
    pub fn default_channel(self) -> u8 {
        match self {
            Role::Drums => 10,
            _ => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "pad" | "pads" => return Ok(Role::Synths),
            "drum" => return Ok(Role::Drums),
            _ => {}
        }
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == lower)
            .ok_or_else(|| Error::UnknownRole(s.to_string()))
    }
}

/// A single timed note. Plain value; range checks happen at encode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Tick offset from the start of the track
    pub onset: u32,
    pub pitch: u8,
    /// 0-127. Zero is still written as a Note-On, which readers treat as a
    /// Note-Off, so a silent note reads back as two releases.
    pub velocity: u8,
    /// Length in ticks, must be positive
    pub duration: u32,
    /// Declared MIDI channel, 1-16
    pub channel: u8,
}

impl NoteEvent {
    pub fn new(onset: u32, pitch: u8, velocity: u8, duration: u32, channel: u8) -> Self {
        NoteEvent {
            onset,
            pitch,
            velocity,
            duration,
            channel,
        }
    }

    /// Absolute tick of the paired Note-Off, or `None` on overflow.
    pub fn offset(&self) -> Option<u32> {
        self.onset.checked_add(self.duration)
    }

    /// Check every field against the ranges a valid file requires.
    pub fn validate(&self) -> Result<(), (NoteField, u64)> {
        if self.pitch > 127 {
            return Err((NoteField::Pitch, self.pitch as u64));
        }
        if self.velocity > 127 {
            return Err((NoteField::Velocity, self.velocity as u64));
        }
        if self.duration == 0 {
            return Err((NoteField::Duration, 0));
        }
        if !(1..=16).contains(&self.channel) {
            return Err((NoteField::Channel, self.channel as u64));
        }
        if self.offset().is_none() {
            return Err((
                NoteField::Duration,
                self.onset as u64 + self.duration as u64,
            ));
        }
        Ok(())
    }

    /// Channel nibble for status bytes: `(declared - 1) & 0x0F`.
    pub fn channel_nibble(&self) -> u8 {
        self.channel.wrapping_sub(1) & 0x0F
    }
}

/// Which NoteEvent field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteField {
    Pitch,
    Velocity,
    Duration,
    Channel,
}

impl fmt::Display for NoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NoteField::Pitch => "pitch",
            NoteField::Velocity => "velocity",
            NoteField::Duration => "duration",
            NoteField::Channel => "channel",
        })
    }
}

/// The notes generated for one role.
///
/// Events are in generation order, not necessarily sorted by onset; the
/// encoder sorts before computing deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTrack {
    pub role: Role,
    pub channel: u8,
    pub events: Vec<NoteEvent>,
}

impl RoleTrack {
    pub fn new(role: Role) -> Self {
        RoleTrack {
            role,
            channel: role.default_channel(),
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, onset: u32, pitch: u8, velocity: u8, duration: u32) {
        self.events
            .push(NoteEvent::new(onset, pitch, velocity, duration, self.channel));
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Tick at which the last note releases.
    pub fn end_tick(&self) -> u32 {
        self.events
            .iter()
            .filter_map(NoteEvent::offset)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_order_matches_enumeration() {
        let mut roles = vec![Role::Fx, Role::Melody, Role::Drums, Role::Synths, Role::Bass];
        roles.sort();
        assert_eq!(roles, Role::ALL.to_vec());
    }

    #[test]
    fn role_parsing() {
        assert_eq!("Drums".parse::<Role>().unwrap(), Role::Drums);
        assert_eq!("pad".parse::<Role>().unwrap(), Role::Synths);
        assert!("vocals".parse::<Role>().is_err());
    }

    #[test]
    fn channel_nibble_is_zero_based() {
        assert_eq!(NoteEvent::new(0, 36, 127, 480, 10).channel_nibble(), 9);
        assert_eq!(NoteEvent::new(0, 60, 90, 480, 1).channel_nibble(), 0);
        assert_eq!(NoteEvent::new(0, 60, 90, 480, 16).channel_nibble(), 15);
    }

    #[test]
    fn validation_catches_each_field() {
        assert!(NoteEvent::new(0, 60, 100, 480, 1).validate().is_ok());
        assert_eq!(
            NoteEvent::new(0, 128, 100, 480, 1).validate(),
            Err((NoteField::Pitch, 128))
        );
        assert_eq!(
            NoteEvent::new(0, 60, 200, 480, 1).validate(),
            Err((NoteField::Velocity, 200))
        );
        assert_eq!(
            NoteEvent::new(0, 60, 100, 0, 1).validate(),
            Err((NoteField::Duration, 0))
        );
        assert_eq!(
            NoteEvent::new(0, 60, 100, 480, 0).validate(),
            Err((NoteField::Channel, 0))
        );
        assert!(NoteEvent::new(u32::MAX, 60, 100, 2, 1).validate().is_err());
    }

    #[test]
    fn end_tick_tracks_latest_release() {
        let mut track = RoleTrack::new(Role::Bass);
        track.push(0, 36, 100, 1920);
        track.push(480, 36, 100, 480);
        assert_eq!(track.end_tick(), 1920);
        assert_eq!(track.channel, 1);
    }
}
