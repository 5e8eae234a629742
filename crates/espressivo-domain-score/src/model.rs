use espressivo_ports::midi::MidiLikeEvent;
use espressivo_ports::note_map::TieRole;
use espressivo_ports::types::{Tick, DEFAULT_US_PER_QUARTER};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoPoint {
    pub tick: Tick,
    pub us_per_quarter: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEvent {
    pub tick: Tick,
    pub channel: u8,
    pub event: MidiLikeEvent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    pub name: String,
    /// Absolute-tick events, non-decreasing by tick.
    pub events: Vec<TrackEvent>,
}

/// The musical event source: every track of a performance at one resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub ppq: u16,
    pub tracks: Vec<Track>,
}

impl Sequence {
    pub fn new(ppq: u16) -> Self {
        Self {
            ppq,
            tracks: Vec::new(),
        }
    }

    /// First tempo event in track order, or 120 BPM when the source has none.
    pub fn first_tempo(&self) -> u32 {
        self.tracks
            .iter()
            .flat_map(|track| track.events.iter())
            .find_map(|e| match e.event {
                MidiLikeEvent::Tempo { us_per_quarter } => Some(us_per_quarter),
                _ => None,
            })
            .unwrap_or(DEFAULT_US_PER_QUARTER)
    }

    /// All tempo changes across tracks, ordered by tick.
    pub fn tempo_points(&self) -> Vec<TempoPoint> {
        let mut points: Vec<TempoPoint> = self
            .tracks
            .iter()
            .flat_map(|track| track.events.iter())
            .filter_map(|e| match e.event {
                MidiLikeEvent::Tempo { us_per_quarter } => Some(TempoPoint {
                    tick: e.tick,
                    us_per_quarter,
                }),
                _ => None,
            })
            .collect();
        points.sort_by_key(|p| p.tick);
        points
    }

    pub fn track_index_by_name(&self, name: &str) -> Option<usize> {
        self.tracks.iter().position(|track| track.name == name)
    }
}

impl Track {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, tick: Tick, event: MidiLikeEvent) {
        self.events.push(TrackEvent {
            tick,
            channel: 0,
            event,
        });
    }

    /// Restores tick order; equal ticks keep their relative order.
    pub fn sort_events(&mut self) {
        self.events.sort_by_key(|e| e.tick);
    }
}

/// One note or rest as delivered by the score parser.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreElement {
    /// Offset from the start of the measure, in beats.
    pub offset_beats: f64,
    pub duration_beats: f64,
    /// MIDI pitch; `None` for rests.
    pub pitch: Option<i32>,
    #[serde(default)]
    pub tie: TieRole,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreMeasure {
    pub number: Option<u32>,
    /// Offset of the measure from the start of the part, in beats.
    pub offset_beats: f64,
    pub elements: Vec<ScoreElement>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScorePart {
    pub name: String,
    pub measures: Vec<ScoreMeasure>,
}
