use espressivo_domain_score::TrackEvent;
use espressivo_ports::midi::MidiLikeEvent;
use espressivo_ports::types::{Tick, NEUTRAL_EXPRESSION};
use std::collections::BTreeMap;

/// Scales every sounding note-on by the latest `controller` value at or
/// before it, relative to the neutral midpoint. Velocities stay in `[1, 127]`.
pub fn remap_velocities(events: &[TrackEvent], controller: u8) -> Vec<TrackEvent> {
    // Later events at the same tick win.
    let mut curve: BTreeMap<Tick, u8> = BTreeMap::new();
    for event in events {
        if let Some(value) = event.event.controller_value(controller) {
            curve.insert(event.tick, value);
        }
    }

    if curve.is_empty() {
        return events.to_vec();
    }

    events
        .iter()
        .map(|event| match event.event {
            MidiLikeEvent::NoteOn { note, velocity } if velocity > 0 => {
                let level = curve
                    .range(..=event.tick)
                    .next_back()
                    .map(|(_, value)| *value)
                    .unwrap_or(NEUTRAL_EXPRESSION);
                TrackEvent {
                    event: MidiLikeEvent::NoteOn {
                        note,
                        velocity: scale_velocity(velocity, level),
                    },
                    ..*event
                }
            }
            _ => *event,
        })
        .collect()
}

pub fn scale_velocity(velocity: u8, level: u8) -> u8 {
    let scaled = velocity as f64 * (level as f64 / NEUTRAL_EXPRESSION as f64);
    scaled.round_ties_even().clamp(1.0, 127.0) as u8
}
