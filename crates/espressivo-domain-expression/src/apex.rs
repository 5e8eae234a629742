use espressivo_domain_score::LogicalNote;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const EPSILON: f64 = 1e-9;

/// Turning notes shorter than this pass their credit to the note before.
pub const SHORT_NOTE_SECONDS: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteScore {
    /// First raw index of the logical note.
    pub index: u32,
    pub total: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApexReport {
    pub candidates: BTreeSet<u32>,
    pub scores: Vec<NoteScore>,
}

/// Scores the pitched notes of a phrase and returns the raw indices of the
/// highest-scoring ones, expanding a winning tie chain to all its entries.
///
/// Rests are ignored. When no note scores above zero the candidate set is
/// empty.
pub fn estimate_apex(notes: &[LogicalNote]) -> ApexReport {
    let pitched: Vec<(&LogicalNote, i32)> = notes
        .iter()
        .filter(|n| !n.is_rest)
        .filter_map(|n| n.pitch.map(|p| (n, p)))
        .collect();
    if pitched.is_empty() {
        return ApexReport::default();
    }

    let durations: Vec<f64> = pitched.iter().map(|(n, _)| n.duration_beats).collect();
    let seconds: Vec<f64> = pitched.iter().map(|(n, _)| n.duration_seconds).collect();
    let pitches: Vec<i32> = pitched.iter().map(|(_, p)| *p).collect();

    let mut scores = vec![0.0f64; pitched.len()];
    score_durations(&durations, &mut scores);
    score_pitches(&pitches, &seconds, &mut scores);

    let max = scores.iter().copied().fold(f64::MIN, f64::max);
    let mut candidates = BTreeSet::new();
    if max > EPSILON {
        for ((note, _), score) in pitched.iter().zip(&scores) {
            if (score - max).abs() < EPSILON {
                candidates.extend(note.raw_indices());
            }
        }
    }

    log::debug!("apex scores {:?} -> {:?}", scores, candidates);
    ApexReport {
        candidates,
        scores: pitched
            .iter()
            .zip(&scores)
            .map(|((note, _), total)| NoteScore {
                index: note.covers.0,
                total: *total,
            })
            .collect(),
    }
}

fn score_durations(durations: &[f64], scores: &mut [f64]) {
    for i in 0..durations.len().saturating_sub(1) {
        if durations[i] > durations[i + 1] + EPSILON {
            scores[i] += 1.0;
        }
    }

    let mut run_start = 0;
    while run_start < durations.len() {
        let mut run_end = run_start + 1;
        while run_end < durations.len()
            && (durations[run_end] - durations[run_start]).abs() < EPSILON
        {
            run_end += 1;
        }

        let run_len = run_end - run_start;
        if run_len > 1 {
            scores[run_start] += 1.0;
            for position in 1..run_len {
                scores[run_start + position] += (position + 1) as f64 / run_len as f64;
            }
        }
        run_start = run_end;
    }
}

fn score_pitches(pitches: &[i32], seconds: &[f64], scores: &mut [f64]) {
    for i in 0..pitches.len().saturating_sub(1) {
        if pitches[i] > pitches[i + 1] {
            scores[i] += 1.0;
        }
    }

    if pitches.len() < 4 {
        return;
    }

    // Four-note contour windows centred on i: i-1, i, i+1, i+2.
    for i in 1..pitches.len() - 2 {
        let d1 = (pitches[i] - pitches[i - 1]).signum();
        let d2 = (pitches[i + 1] - pitches[i]).signum();
        let d3 = (pitches[i + 2] - pitches[i + 1]).signum();

        let (points, peak_shape) = match (d1 >= 0, d2, d3) {
            (true, 1, -1) | (false, 1, -1) => (1.0, true),
            (true, -1, 1) | (false, -1, 1) => (2.0, false),
            _ => (0.0, false),
        };
        scores[i + 1] += points;

        // Overlapping windows may credit the same note twice.
        if peak_shape && seconds[i + 1] < SHORT_NOTE_SECONDS {
            scores[i - 1] += 1.0;
        }
    }
}
