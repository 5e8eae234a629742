use crate::model::{Sequence, TempoPoint};
use espressivo_ports::types::{Tick, DEFAULT_US_PER_QUARTER};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid tempo: {ticks_per_beat} ticks per beat at {us_per_quarter} us per quarter")]
    InvalidTempo {
        ticks_per_beat: u32,
        us_per_quarter: u32,
    },
}

/// Tick, beat and wall-clock conversions.
///
/// Conversions use the first tempo only. The full list of tempo points is kept
/// so callers can ask which tempo is active at a tick.
#[derive(Clone, Debug)]
pub struct TimeModel {
    ticks_per_beat: u32,
    us_per_quarter: u32,
    tempo_points: Vec<TempoPoint>,
}

impl TimeModel {
    pub fn new(ticks_per_beat: u32, us_per_quarter: u32) -> Result<Self, TimeError> {
        Self::with_tempo_points(ticks_per_beat, us_per_quarter, Vec::new())
    }

    pub fn with_tempo_points(
        ticks_per_beat: u32,
        us_per_quarter: u32,
        mut tempo_points: Vec<TempoPoint>,
    ) -> Result<Self, TimeError> {
        if ticks_per_beat == 0 || us_per_quarter == 0 {
            return Err(TimeError::InvalidTempo {
                ticks_per_beat,
                us_per_quarter,
            });
        }
        if let Some(bad) = tempo_points.iter().find(|p| p.us_per_quarter == 0) {
            return Err(TimeError::InvalidTempo {
                ticks_per_beat,
                us_per_quarter: bad.us_per_quarter,
            });
        }
        tempo_points.sort_by_key(|p| p.tick);
        Ok(Self {
            ticks_per_beat,
            us_per_quarter,
            tempo_points,
        })
    }

    pub fn from_sequence(sequence: &Sequence) -> Result<Self, TimeError> {
        Self::with_tempo_points(
            sequence.ppq as u32,
            sequence.first_tempo(),
            sequence.tempo_points(),
        )
    }

    pub fn ticks_per_beat(&self) -> u32 {
        self.ticks_per_beat
    }

    pub fn us_per_quarter(&self) -> u32 {
        self.us_per_quarter
    }

    pub fn tick_to_seconds(&self, tick: Tick) -> f64 {
        let beats = tick as f64 / self.ticks_per_beat as f64;
        self.beats_to_seconds(beats)
    }

    pub fn beats_to_seconds(&self, beats: f64) -> f64 {
        beats * self.us_per_quarter as f64 / 1_000_000.0
    }

    pub fn beats_to_ticks(&self, beats: f64) -> Tick {
        (beats * self.ticks_per_beat as f64).round_ties_even() as Tick
    }

    /// Converts a millisecond offset to ticks at the given tempo.
    pub fn ms_to_ticks(&self, ms: f64, us_per_quarter: u32) -> Result<Tick, TimeError> {
        if us_per_quarter == 0 {
            return Err(TimeError::InvalidTempo {
                ticks_per_beat: self.ticks_per_beat,
                us_per_quarter,
            });
        }
        let seconds = ms / 1000.0;
        let ticks = seconds * (1_000_000.0 / us_per_quarter as f64) * self.ticks_per_beat as f64;
        Ok(ticks.round_ties_even() as Tick)
    }

    /// Tempo in effect at `tick`; 120 BPM before the first tempo change.
    pub fn tempo_at(&self, tick: Tick) -> u32 {
        let mut current = DEFAULT_US_PER_QUARTER;
        for point in &self.tempo_points {
            if point.tick > tick {
                break;
            }
            current = point.us_per_quarter;
        }
        current
    }
}
