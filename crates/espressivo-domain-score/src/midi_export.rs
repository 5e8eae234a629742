use crate::model::{Sequence, Track};
use espressivo_ports::midi::MidiLikeEvent;
use espressivo_ports::types::Tick;
use midly::num::{u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum MidiExportError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid sequence: {0}")]
    InvalidSequence(String),
}

pub fn export_sequence_path(sequence: &Sequence, path: &Path) -> Result<(), MidiExportError> {
    let data = export_sequence_bytes(sequence)?;
    std::fs::write(path, data).map_err(|e| MidiExportError::Io(e.to_string()))
}

pub fn export_sequence_bytes(sequence: &Sequence) -> Result<Vec<u8>, MidiExportError> {
    if sequence.tracks.is_empty() {
        return Err(MidiExportError::InvalidSequence("no tracks".to_string()));
    }
    if sequence.ppq == 0 || sequence.ppq > 0x7fff {
        return Err(MidiExportError::InvalidSequence(format!(
            "unsupported resolution {}",
            sequence.ppq
        )));
    }

    let format = if sequence.tracks.len() == 1 {
        Format::SingleTrack
    } else {
        Format::Parallel
    };

    let smf = Smf {
        header: Header {
            format,
            timing: Timing::Metrical(sequence.ppq.into()),
        },
        tracks: sequence.tracks.iter().map(build_track).collect(),
    };

    let mut data = Vec::new();
    smf.write(&mut data)
        .map_err(|e| MidiExportError::Io(e.to_string()))?;
    Ok(data)
}

fn build_track(track: &Track) -> Vec<TrackEvent<'_>> {
    let mut out = Vec::with_capacity(track.events.len() + 2);
    out.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(track.name.as_bytes())),
    });

    let mut last_tick: Tick = 0;
    for event in &track.events {
        let delta = (event.tick - last_tick).max(0) as u32;
        last_tick = last_tick.max(event.tick);
        out.push(TrackEvent {
            delta: u28::new(delta),
            kind: event_kind(event.channel, &event.event),
        });
    }

    out.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    out
}

fn event_kind(channel: u8, event: &MidiLikeEvent) -> TrackEventKind<'static> {
    let channel = u4::new(channel.min(15));
    match *event {
        MidiLikeEvent::NoteOn { note, velocity } => TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOn {
                key: u7::new(note.min(127)),
                vel: u7::new(velocity.clamp(1, 127)),
            },
        },
        MidiLikeEvent::NoteOff { note } => TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOff {
                key: u7::new(note.min(127)),
                vel: u7::new(64),
            },
        },
        MidiLikeEvent::Controller { controller, value } => TrackEventKind::Midi {
            channel,
            message: MidiMessage::Controller {
                controller: u7::new(controller.min(127)),
                value: u7::new(value.min(127)),
            },
        },
        MidiLikeEvent::ProgramChange { program } => TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(program.min(127)),
            },
        },
        MidiLikeEvent::Tempo { us_per_quarter } => {
            TrackEventKind::Meta(MetaMessage::Tempo(u24::new(us_per_quarter.min(0xff_ffff))))
        }
    }
}
