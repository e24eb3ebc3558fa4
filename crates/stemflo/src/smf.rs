//! Standard MIDI File encoding and a minimal reader for inspection.
//!
//! Everything is written at [`TICKS_PER_QUARTER`] resolution. Every note is
//! validated before the first byte is produced, so an `Err` never comes with
//! a partial file.

use serde::{Deserialize, Serialize};

use crate::compose::StemSet;
use crate::note::{NoteEvent, Role, RoleTrack, TICKS_PER_QUARTER};
use crate::{Error, Result};

/// Largest value a four-byte variable-length quantity can hold.
pub const VLQ_MAX: u32 = 0x0FFF_FFFF;

/// Slowest tempo whose microseconds-per-quarter still fits 24 bits.
pub const MIN_TEMPO: u16 = 4;

const HEADER_LEN: u32 = 6;

const META: u8 = 0xFF;
const META_TRACK_NAME: u8 = 0x03;
const META_END_OF_TRACK: u8 = 0x2F;
const META_TEMPO: u8 = 0x51;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;

/// How roles are laid out across track chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackLayout {
    /// Format 0: every role merged into a single track.
    #[default]
    Merged,
    /// Format 1: one track per role, in role order.
    PerRole,
}

/// How each note's On/Off pair is placed in the event stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteScheduling {
    /// On and Off sub-events sorted by absolute tick (Offs first on ties),
    /// so overlapping notes keep their real timing.
    #[default]
    Interleaved,
    /// Each note's Off directly follows its On. The next onset delta is
    /// clamped to zero when the previous note ran past it.
    Sequential,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    pub layout: TrackLayout,
    pub scheduling: NoteScheduling,
}

/// Stateless encoder configured with [`EncodeOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    pub fn new(options: EncodeOptions) -> Self {
        Encoder { options }
    }

    pub fn options(&self) -> EncodeOptions {
        self.options
    }

    /// Encode a whole stem set at its own tempo.
    pub fn encode_stem_set(&self, stems: &StemSet) -> Result<Vec<u8>> {
        let tempo = stems.tempo();
        validate_tempo(tempo)?;
        for track in stems.tracks() {
            validate_track(track)?;
        }

        let chunks = match self.options.layout {
            TrackLayout::Merged => {
                let mut notes: Vec<NoteEvent> = stems
                    .tracks()
                    .flat_map(|track| track.events.iter().copied())
                    .collect();
                // Stable: equal onsets keep role order.
                notes.sort_by_key(|note| note.onset);
                vec![self.track_body(&stems.metadata.style, Some(tempo), &notes)?]
            }
            TrackLayout::PerRole => stems
                .tracks()
                .enumerate()
                .map(|(i, track)| {
                    let tempo = (i == 0).then_some(tempo);
                    self.track_body(track.role.track_name(), tempo, &sorted_notes(track))
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let format = match self.options.layout {
            TrackLayout::Merged => 0,
            TrackLayout::PerRole => 1,
        };
        tracing::debug!(
            style = %stems.metadata.style,
            tracks = chunks.len(),
            options = ?self.options,
            "encoding stem set"
        );
        build_file(format, &chunks)
    }

    /// Encode one role as a single-track file.
    pub fn encode_role(&self, track: &RoleTrack, tempo: u16) -> Result<Vec<u8>> {
        validate_tempo(tempo)?;
        validate_track(track)?;
        let body = self.track_body(track.role.track_name(), Some(tempo), &sorted_notes(track))?;
        build_file(0, &[body])
    }

    /// Event stream for one track chunk: optional tempo, name, notes, end.
    /// `notes` must already be sorted by onset.
    fn track_body(
        &self,
        name: &str,
        tempo: Option<u16>,
        notes: &[NoteEvent],
    ) -> Result<Vec<u8>> {
        let mut data = Vec::new();

        if let Some(bpm) = tempo {
            let usec = 60_000_000 / bpm as u32;
            write_vlq(&mut data, 0)?;
            data.extend_from_slice(&[
                META,
                META_TEMPO,
                0x03,
                (usec >> 16) as u8,
                (usec >> 8) as u8,
                usec as u8,
            ]);
        }

        let name_bytes = name.as_bytes();
        write_vlq(&mut data, 0)?;
        data.extend_from_slice(&[META, META_TRACK_NAME]);
        write_vlq(&mut data, name_bytes.len() as u32)?;
        data.extend_from_slice(name_bytes);

        match self.options.scheduling {
            NoteScheduling::Interleaved => write_interleaved(&mut data, notes)?,
            NoteScheduling::Sequential => write_sequential(&mut data, notes)?,
        }

        write_vlq(&mut data, 0)?;
        data.extend_from_slice(&[META, META_END_OF_TRACK, 0x00]);
        Ok(data)
    }
}

/// Encode a stem set with default options (merged, interleaved).
pub fn encode(stems: &StemSet) -> Result<Vec<u8>> {
    Encoder::default().encode_stem_set(stems)
}

/// Encode a single role track with default options.
pub fn encode_role(track: &RoleTrack, tempo: u16) -> Result<Vec<u8>> {
    Encoder::default().encode_role(track, tempo)
}

fn validate_tempo(tempo: u16) -> Result<()> {
    if tempo < MIN_TEMPO {
        return Err(Error::InvalidTempo(tempo));
    }
    Ok(())
}

fn validate_track(track: &RoleTrack) -> Result<()> {
    for (index, note) in track.events.iter().enumerate() {
        note.validate()
            .map_err(|(field, value)| Error::InvalidNoteField {
                role: track.role,
                index,
                field,
                value,
            })?;
    }
    Ok(())
}

fn sorted_notes(track: &RoleTrack) -> Vec<NoteEvent> {
    let mut notes = track.events.clone();
    notes.sort_by_key(|note| note.onset);
    notes
}

fn note_on(note: &NoteEvent) -> [u8; 3] {
    [NOTE_ON | note.channel_nibble(), note.pitch, note.velocity]
}

fn note_off(note: &NoteEvent) -> [u8; 3] {
    [NOTE_OFF | note.channel_nibble(), note.pitch, 0]
}

fn write_interleaved(data: &mut Vec<u8>, notes: &[NoteEvent]) -> Result<()> {
    // (tick, is_on, source index, message)
    let mut events: Vec<(u32, bool, usize, [u8; 3])> = Vec::with_capacity(notes.len() * 2);
    for (i, note) in notes.iter().enumerate() {
        // validate() has already ruled out overflow
        let off_tick = note.offset().unwrap_or(u32::MAX);
        events.push((note.onset, true, i, note_on(note)));
        events.push((off_tick, false, i, note_off(note)));
    }

    // Note-offs first at the same tick, then source order
    events.sort_by_key(|&(tick, is_on, index, _)| (tick, is_on, index));

    let mut last_tick = 0u32;
    for (tick, _, _, message) in events {
        write_vlq(data, tick - last_tick)?;
        data.extend_from_slice(&message);
        last_tick = tick;
    }
    Ok(())
}

fn write_sequential(data: &mut Vec<u8>, notes: &[NoteEvent]) -> Result<()> {
    let mut cursor = 0u32;
    for note in notes {
        write_vlq(data, note.onset.saturating_sub(cursor))?;
        data.extend_from_slice(&note_on(note));
        write_vlq(data, note.duration)?;
        data.extend_from_slice(&note_off(note));
        cursor = note.offset().unwrap_or(u32::MAX);
    }
    Ok(())
}

/// Assemble a complete file from track event streams.
fn build_file(format: u16, tracks: &[Vec<u8>]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let track_count = u16::try_from(tracks.len())
        .map_err(|_| Error::Malformed(format!("{} tracks do not fit the header", tracks.len())))?;

    buf.extend_from_slice(b"MThd");
    buf.extend_from_slice(&HEADER_LEN.to_be_bytes());
    buf.extend_from_slice(&format.to_be_bytes());
    buf.extend_from_slice(&track_count.to_be_bytes());
    buf.extend_from_slice(&TICKS_PER_QUARTER.to_be_bytes());

    for track_data in tracks {
        write_chunk(&mut buf, b"MTrk", track_data)?;
    }
    Ok(buf)
}

fn write_chunk(buf: &mut Vec<u8>, tag: &[u8; 4], data: &[u8]) -> Result<()> {
    let declared = u32::try_from(data.len()).map_err(|_| Error::ChunkSizeMismatch {
        declared: u32::MAX as usize,
        actual: data.len(),
    })?;
    let start = buf.len();
    buf.extend_from_slice(tag);
    buf.extend_from_slice(&declared.to_be_bytes());
    buf.extend_from_slice(data);

    let actual = buf.len() - start - 8;
    if actual != declared as usize {
        return Err(Error::ChunkSizeMismatch {
            declared: declared as usize,
            actual,
        });
    }
    Ok(())
}

/// Append `value` as a variable-length quantity (7 bits per byte, MSB first).
pub fn write_vlq(buf: &mut Vec<u8>, mut value: u32) -> Result<()> {
    if value > VLQ_MAX {
        return Err(Error::DeltaOverflow(value as u64));
    }
    if value == 0 {
        buf.push(0);
        return Ok(());
    }

    let mut bytes = [0u8; 4];
    let mut len = 0;
    while value > 0 {
        let continuation = if len == 0 { 0 } else { 0x80 };
        bytes[len] = (value & 0x7F) as u8 | continuation;
        value >>= 7;
        len += 1;
    }

    bytes[..len].reverse();
    buf.extend_from_slice(&bytes[..len]);
    Ok(())
}

/// Decode a variable-length quantity from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// input ends mid-quantity or runs past four bytes.
pub fn read_vlq(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut value = 0u32;
    for (i, &byte) in bytes.iter().take(4).enumerate() {
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

/// A raw chunk: four-byte tag and its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub tag: [u8; 4],
    pub data: &'a [u8],
}

impl Chunk<'_> {
    pub fn tag_str(&self) -> &str {
        std::str::from_utf8(&self.tag).unwrap_or("????")
    }
}

/// Split a file into its chunks, checking every declared length.
pub fn read_chunks(bytes: &[u8]) -> Result<Vec<Chunk<'_>>> {
    let mut chunks = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        if rest.len() < 8 {
            return Err(Error::Malformed(format!(
                "{} trailing bytes are too short for a chunk header",
                rest.len()
            )));
        }
        let tag = [rest[0], rest[1], rest[2], rest[3]];
        let declared = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        let body = &rest[8..];
        if body.len() < declared {
            return Err(Error::ChunkSizeMismatch {
                declared,
                actual: body.len(),
            });
        }
        chunks.push(Chunk {
            tag,
            data: &body[..declared],
        });
        rest = &body[declared..];
    }
    Ok(chunks)
}

/// The fields of an `MThd` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub format: u16,
    pub tracks: u16,
    pub ticks_per_quarter: u16,
}

impl Header {
    pub fn parse(chunk: &Chunk<'_>) -> Result<Header> {
        if &chunk.tag != b"MThd" {
            return Err(Error::Malformed(format!(
                "expected MThd, found {}",
                chunk.tag_str()
            )));
        }
        let d = chunk.data;
        if d.len() < HEADER_LEN as usize {
            return Err(Error::Malformed(format!("header is {} bytes", d.len())));
        }
        Ok(Header {
            format: u16::from_be_bytes([d[0], d[1]]),
            tracks: u16::from_be_bytes([d[2], d[3]]),
            ticks_per_quarter: u16::from_be_bytes([d[4], d[5]]),
        })
    }
}

/// One decoded event from a track chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackEvent {
    pub delta: u32,
    /// Absolute tick from the start of the track
    pub tick: u64,
    /// Status byte after running status is resolved (0xFF for meta-events)
    pub status: u8,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EventKind {
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    NoteOff { channel: u8, pitch: u8 },
    /// Microseconds per quarter note
    Tempo { usec: u32 },
    TrackName { name: String },
    EndOfTrack,
    Meta { meta_type: u8, len: usize },
    Channel { status: u8 },
    SysEx { len: usize },
}

/// Decode every event in an `MTrk` payload. Running status is honored and a
/// Note-On with velocity zero is reported as a Note-Off.
pub fn parse_track(data: &[u8]) -> Result<Vec<TrackEvent>> {
    let mut events = Vec::new();
    let mut pos = 0usize;
    let mut tick = 0u64;
    let mut running: Option<u8> = None;

    let truncated =
        |what: &str, at: usize| Error::Malformed(format!("truncated {what} at byte {at}"));

    while pos < data.len() {
        let (delta, used) = read_vlq(&data[pos..]).ok_or_else(|| truncated("delta", pos))?;
        pos += used;
        tick += delta as u64;

        let first = *data.get(pos).ok_or_else(|| truncated("event", pos))?;
        let status = if first & 0x80 != 0 {
            pos += 1;
            first
        } else {
            running.ok_or_else(|| {
                Error::Malformed(format!("data byte {first:#04x} without status at byte {pos}"))
            })?
        };

        let kind = match status {
            META => {
                let meta_type = *data.get(pos).ok_or_else(|| truncated("meta", pos))?;
                let (len, used) =
                    read_vlq(&data[pos + 1..]).ok_or_else(|| truncated("meta length", pos))?;
                let start = pos + 1 + used;
                let end = start + len as usize;
                let payload = data.get(start..end).ok_or_else(|| truncated("meta", start))?;
                pos = end;
                match meta_type {
                    META_TEMPO if payload.len() == 3 => EventKind::Tempo {
                        usec: u32::from_be_bytes([0, payload[0], payload[1], payload[2]]),
                    },
                    META_TRACK_NAME => EventKind::TrackName {
                        name: String::from_utf8_lossy(payload).into_owned(),
                    },
                    META_END_OF_TRACK => EventKind::EndOfTrack,
                    _ => EventKind::Meta {
                        meta_type,
                        len: payload.len(),
                    },
                }
            }
            0xF0 | 0xF7 => {
                let (len, used) =
                    read_vlq(&data[pos..]).ok_or_else(|| truncated("sysex length", pos))?;
                pos += used + len as usize;
                if pos > data.len() {
                    return Err(truncated("sysex", pos));
                }
                EventKind::SysEx { len: len as usize }
            }
            _ => {
                running = Some(status);
                let data_len = match status & 0xF0 {
                    0xC0 | 0xD0 => 1,
                    _ => 2,
                };
                let args = data
                    .get(pos..pos + data_len)
                    .ok_or_else(|| truncated("channel message", pos))?;
                pos += data_len;
                let channel = status & 0x0F;
                match (status & 0xF0, args) {
                    (NOTE_ON, &[pitch, velocity]) if velocity > 0 => EventKind::NoteOn {
                        channel,
                        pitch,
                        velocity,
                    },
                    (NOTE_ON, &[pitch, _]) | (NOTE_OFF, &[pitch, _]) => {
                        EventKind::NoteOff { channel, pitch }
                    }
                    _ => EventKind::Channel { status },
                }
            }
        };

        let done = kind == EventKind::EndOfTrack;
        events.push(TrackEvent {
            delta,
            tick,
            status,
            kind,
        });
        if done {
            break;
        }
    }
    Ok(events)
}

/// Role whose display name matches a track-name meta-event, if any.
pub fn role_for_track_name(name: &str) -> Option<Role> {
    Role::ALL.into_iter().find(|role| role.track_name() == name)
}
