use espressivo_domain_score::TrackEvent;
use espressivo_ports::midi::MidiLikeEvent;
use espressivo_ports::types::{Tick, NEUTRAL_EXPRESSION};
use std::collections::BTreeMap;

/// Start/peak/end controller values for one phrase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveShape {
    pub start_value: i32,
    pub peak_value: i32,
    pub end_value: i32,
}

/// One controller point per tick: a linear rise over `[start, peak]` and a
/// linear fall over `[peak, end]`.
///
/// Reversed `start`/`end` are swapped. `peak` is not clamped: a peak before
/// `start` drops the rise, a peak after `end` drops the fall. Values are
/// clamped to the 7-bit controller range.
pub fn synthesize_curve(
    start_tick: Tick,
    end_tick: Tick,
    peak_tick: Tick,
    shape: CurveShape,
) -> BTreeMap<Tick, u8> {
    let (start_tick, end_tick) = ordered(start_tick, end_tick);
    let mut points = BTreeMap::new();

    if peak_tick >= start_tick {
        let duration = peak_tick - start_tick;
        for step in 0..=duration {
            points.insert(
                start_tick + step,
                ramp(shape.start_value, shape.peak_value, step, duration),
            );
        }
    }

    if end_tick >= peak_tick {
        let duration = end_tick - peak_tick;
        for step in 0..=duration {
            points.insert(
                peak_tick + step,
                ramp(shape.peak_value, shape.end_value, step, duration),
            );
        }
    }

    points
}

fn ramp(from: i32, to: i32, step: Tick, duration: Tick) -> u8 {
    let fraction = if duration > 0 {
        step as f64 / duration as f64
    } else {
        1.0
    };
    let value = from as f64 + (to - from) as f64 * fraction;
    value.round_ties_even().clamp(0.0, 127.0) as u8
}

fn ordered(a: Tick, b: Tick) -> (Tick, Tick) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Mean of the existing controller values inside `[start, end]`, or the
/// neutral midpoint when there are none.
pub fn baseline_expression(
    events: &[TrackEvent],
    controller: u8,
    start_tick: Tick,
    end_tick: Tick,
) -> f64 {
    let (start_tick, end_tick) = ordered(start_tick, end_tick);
    let values: Vec<f64> = events
        .iter()
        .filter(|e| e.tick >= start_tick && e.tick <= end_tick)
        .filter_map(|e| e.event.controller_value(controller))
        .map(f64::from)
        .collect();

    if values.is_empty() {
        NEUTRAL_EXPRESSION as f64
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Replaces every `controller` event inside `[start, end]` with `curve`.
///
/// Events outside the range are untouched. The result is ordered by tick;
/// at equal ticks existing events precede the new points.
pub fn apply_expression_curve(
    events: &[TrackEvent],
    controller: u8,
    start_tick: Tick,
    end_tick: Tick,
    curve: &BTreeMap<Tick, u8>,
) -> Vec<TrackEvent> {
    let (start_tick, end_tick) = ordered(start_tick, end_tick);
    let channel = events
        .iter()
        .find(|e| e.event.is_note_start())
        .map(|e| e.channel)
        .unwrap_or(0);

    let mut out: Vec<TrackEvent> = events
        .iter()
        .filter(|e| {
            let in_range = e.tick >= start_tick && e.tick <= end_tick;
            !(in_range && e.event.controller_value(controller).is_some())
        })
        .copied()
        .collect();

    out.extend(curve.iter().map(|(&tick, &value)| TrackEvent {
        tick,
        channel,
        event: MidiLikeEvent::Controller { controller, value },
    }));
    out.sort_by_key(|e| e.tick);
    out
}
