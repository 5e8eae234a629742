use crate::model::ScorePart;
use crate::time_model::TimeModel;
use espressivo_ports::note_map::{NoteMapEntry, TieRole};
use espressivo_ports::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteMapError {
    #[error("note index {0} not found")]
    NotFound(u32),
    #[error("note index {0} has an invalid record")]
    InvalidIndex(u32),
    #[error("malformed note map: {0}")]
    Malformed(String),
}

/// A tie-merged note spanning raw entries `covers.0..=covers.1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogicalNote {
    pub index: u32,
    pub covers: (u32, u32),
    pub pitch: Option<i32>,
    pub is_rest: bool,
    pub duration_beats: f64,
    pub duration_seconds: f64,
    pub start_tick: Tick,
}

impl LogicalNote {
    pub fn raw_indices(&self) -> impl Iterator<Item = u32> {
        self.covers.0..=self.covers.1
    }

    fn from_entry(entry: &NoteMapEntry) -> Self {
        Self {
            index: entry.index,
            covers: (entry.index, entry.index),
            pitch: entry.pitch,
            is_rest: entry.is_rest,
            duration_beats: entry.duration_beats,
            duration_seconds: entry.duration_seconds,
            start_tick: entry.start_tick,
        }
    }
}

/// Emits one entry per note or rest of `part`, indexed densely in document order.
pub fn build_note_map(part: &ScorePart, time: &TimeModel) -> Vec<NoteMapEntry> {
    let mut entries = Vec::new();
    let mut index: u32 = 0;

    for measure in &part.measures {
        for element in &measure.elements {
            let offset_beats = measure.offset_beats + element.offset_beats;
            let is_rest = element.pitch.is_none();
            entries.push(NoteMapEntry {
                index,
                measure: measure.number,
                offset_beats,
                duration_beats: element.duration_beats,
                duration_seconds: time.beats_to_seconds(element.duration_beats),
                start_tick: time.beats_to_ticks(offset_beats),
                pitch: element.pitch,
                is_rest,
                tie_role: if is_rest { TieRole::None } else { element.tie },
            });
            index += 1;
        }
    }

    log::debug!("note map for part {:?}: {} entries", part.name, entries.len());
    entries
}

/// Validated, index-addressable view over a part's note map.
#[derive(Clone, Debug)]
pub struct NoteMap {
    entries: Vec<NoteMapEntry>,
}

impl NoteMap {
    /// Rejects records whose indices are not strictly increasing or whose
    /// ticks go backwards.
    pub fn new(entries: Vec<NoteMapEntry>) -> Result<Self, NoteMapError> {
        for pair in entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if b.index <= a.index {
                return Err(NoteMapError::Malformed(format!(
                    "index {} follows index {}",
                    b.index, a.index
                )));
            }
            if b.start_tick < a.start_tick {
                return Err(NoteMapError::Malformed(format!(
                    "tick of index {} precedes tick of index {}",
                    b.index, a.index
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[NoteMapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&NoteMapEntry> {
        self.entries
            .binary_search_by_key(&index, |e| e.index)
            .ok()
            .map(|pos| &self.entries[pos])
    }

    pub fn idx_to_tick(&self, index: u32) -> Result<Tick, NoteMapError> {
        let entry = self.get(index).ok_or(NoteMapError::NotFound(index))?;
        let valid = entry.start_tick >= 0
            && entry.offset_beats.is_finite()
            && entry.duration_beats.is_finite()
            && entry.is_rest == entry.pitch.is_none();
        if !valid {
            return Err(NoteMapError::InvalidIndex(index));
        }
        Ok(entry.start_tick)
    }

    /// Entries with index in `[a, b]` (either order), merged into logical notes.
    pub fn logical_notes_in_range(&self, a: u32, b: u32) -> Vec<LogicalNote> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let slice: Vec<NoteMapEntry> = self
            .entries
            .iter()
            .filter(|e| e.index >= lo && e.index <= hi)
            .cloned()
            .collect();
        merge_ties(&slice)
    }
}

/// Merges `Start -> Continue* -> Stop` chains of the same pitch.
///
/// A chain ends after its `Stop`, or at the last absorbed entry when the
/// pattern breaks. Rests are never merged.
pub fn merge_ties(entries: &[NoteMapEntry]) -> Vec<LogicalNote> {
    let mut out = Vec::with_capacity(entries.len());
    let mut pos = 0;

    while pos < entries.len() {
        let head = &entries[pos];
        let mut note = LogicalNote::from_entry(head);
        pos += 1;

        if head.is_rest || head.tie_role != TieRole::Start {
            out.push(note);
            continue;
        }

        while let Some(next) = entries.get(pos) {
            let absorbs = !next.is_rest
                && next.pitch == head.pitch
                && matches!(next.tie_role, TieRole::Continue | TieRole::Stop);
            if !absorbs {
                break;
            }
            note.duration_beats += next.duration_beats;
            note.duration_seconds += next.duration_seconds;
            note.covers.1 = next.index;
            pos += 1;
            if next.tie_role == TieRole::Stop {
                break;
            }
        }

        if note.covers.0 == note.covers.1 {
            log::warn!("tie started at index {} absorbed nothing", head.index);
        }
        out.push(note);
    }

    out
}
