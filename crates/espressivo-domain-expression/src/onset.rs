use espressivo_domain_score::{Sequence, TimeError, TimeModel, TrackEvent};
use espressivo_ports::types::Tick;

/// Elastic onset shift for one track.
///
/// Events before `start` are untouched. Inside `[start, end]` an event moves by
/// `onset_ms` per beat elapsed since `start`. Events after `end` move by the
/// total of `onset_ms` over every beat boundary inside the phrase. Durations
/// use the tempo active at tick 0.
///
/// Event order is preserved; a shift that would move an event before its
/// predecessor leaves it on the predecessor's tick instead.
pub fn shift_onsets(
    events: &[TrackEvent],
    start_tick: Tick,
    end_tick: Tick,
    onset_ms_per_beat: i32,
    time: &TimeModel,
) -> Result<Vec<TrackEvent>, TimeError> {
    let (start_tick, end_tick) = if start_tick > end_tick {
        (end_tick, start_tick)
    } else {
        (start_tick, end_tick)
    };
    let tpq = time.ticks_per_beat() as Tick;
    let tempo = time.tempo_at(0);
    if tpq == 0 || tempo == 0 {
        return Err(TimeError::InvalidTempo {
            ticks_per_beat: time.ticks_per_beat(),
            us_per_quarter: tempo,
        });
    }

    let boundaries = beat_boundaries_between(start_tick, end_tick, tpq);
    let total_ms = onset_ms_per_beat as f64 * boundaries as f64;
    let total_shift = time.ms_to_ticks(total_ms, tempo)?;

    let mut out = Vec::with_capacity(events.len());
    let mut last_target: Tick = 0;
    let mut last_out: Tick = 0;

    for event in events {
        let target = if event.tick < start_tick {
            event.tick
        } else if event.tick <= end_tick {
            let beats_in = (event.tick - start_tick) as f64 / tpq as f64;
            event.tick + time.ms_to_ticks(beats_in * onset_ms_per_beat as f64, tempo)?
        } else {
            event.tick + total_shift
        };

        let delta = (target - last_target).max(0);
        let tick = last_out + delta;
        out.push(TrackEvent { tick, ..*event });
        last_target = target;
        last_out = tick;
    }

    Ok(out)
}

/// Applies [`shift_onsets`] to every track so parts stay together.
///
/// Either every track is shifted or the sequence is left as it was.
pub fn shift_sequence_onsets(
    sequence: &Sequence,
    start_tick: Tick,
    end_tick: Tick,
    onset_ms_per_beat: i32,
    time: &TimeModel,
) -> Result<Sequence, TimeError> {
    let mut shifted = sequence.clone();
    for track in &mut shifted.tracks {
        track.events = shift_onsets(&track.events, start_tick, end_tick, onset_ms_per_beat, time)?;
    }
    Ok(shifted)
}

/// Number of multiples of `tpq` in `[start, end]`.
fn beat_boundaries_between(start: Tick, end: Tick, tpq: Tick) -> i64 {
    let mut first = start.div_euclid(tpq) * tpq;
    if first < start {
        first += tpq;
    }
    if first > end {
        0
    } else {
        (end - first) / tpq + 1
    }
}
