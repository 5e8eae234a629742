use crate::model::{Sequence, Track, TrackEvent};
use espressivo_ports::midi::MidiLikeEvent;

/// Copies one track into its own sequence, carrying the first tempo event of
/// the whole sequence at tick 0 so the part plays at the right speed alone.
pub fn extract_part(sequence: &Sequence, track_index: usize) -> Option<Sequence> {
    let source = sequence.tracks.get(track_index)?;
    let first_tempo = sequence
        .tracks
        .iter()
        .flat_map(|track| track.events.iter())
        .find(|e| matches!(e.event, MidiLikeEvent::Tempo { .. }));

    let mut track = Track {
        id: 0,
        name: source.name.clone(),
        events: Vec::with_capacity(source.events.len() + 1),
    };
    if let Some(tempo) = first_tempo {
        track.events.push(TrackEvent { tick: 0, ..*tempo });
    }
    track.events.extend(source.events.iter().copied());

    Some(Sequence {
        ppq: sequence.ppq,
        tracks: vec![track],
    })
}
