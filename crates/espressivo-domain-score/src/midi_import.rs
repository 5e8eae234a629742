use crate::model::{Sequence, Track, TrackEvent};
use espressivo_ports::midi::MidiLikeEvent;
use espressivo_ports::types::Tick;
use midly::{Fps, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum MidiImportError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
}

pub fn import_sequence_path(path: &Path) -> Result<Sequence, MidiImportError> {
    let data = std::fs::read(path).map_err(|e| MidiImportError::Io(e.to_string()))?;
    import_sequence_bytes(&data)
}

pub fn import_sequence_bytes(data: &[u8]) -> Result<Sequence, MidiImportError> {
    let smf = Smf::parse(data).map_err(|e| MidiImportError::Parse(e.to_string()))?;
    let (ppq, tempo_override) = match smf.header.timing {
        Timing::Metrical(ticks) => (ticks.as_int(), None),
        Timing::Timecode(fps, ticks_per_frame) => {
            let (ppq, us_per_quarter) = timecode_ppq_and_tempo(fps, ticks_per_frame);
            (ppq, Some(us_per_quarter))
        }
    };

    let mut tracks = Vec::with_capacity(smf.tracks.len());
    for (idx, smf_track) in smf.tracks.iter().enumerate() {
        let mut track = Track::new(idx as u32, format!("Track {}", idx + 1));
        let mut tick: Tick = 0;

        for event in smf_track {
            tick += event.delta.as_int() as Tick;
            match &event.kind {
                TrackEventKind::Midi { channel, message } => {
                    let channel = channel.as_int();
                    let converted = match message {
                        MidiMessage::NoteOn { key, vel } => {
                            let note = key.as_int();
                            let velocity = vel.as_int();
                            if velocity == 0 {
                                Some(MidiLikeEvent::NoteOff { note })
                            } else {
                                Some(MidiLikeEvent::NoteOn { note, velocity })
                            }
                        }
                        MidiMessage::NoteOff { key, .. } => {
                            Some(MidiLikeEvent::NoteOff { note: key.as_int() })
                        }
                        MidiMessage::Controller { controller, value } => {
                            Some(MidiLikeEvent::Controller {
                                controller: controller.as_int(),
                                value: value.as_int(),
                            })
                        }
                        MidiMessage::ProgramChange { program } => {
                            Some(MidiLikeEvent::ProgramChange {
                                program: program.as_int(),
                            })
                        }
                        _ => None,
                    };
                    if let Some(event) = converted {
                        track.events.push(TrackEvent {
                            tick,
                            channel,
                            event,
                        });
                    }
                }
                TrackEventKind::Meta(MetaMessage::Tempo(us_per_quarter)) => {
                    let us_per_quarter = tempo_override.unwrap_or(us_per_quarter.as_int());
                    track.push(tick, MidiLikeEvent::Tempo { us_per_quarter });
                }
                TrackEventKind::Meta(MetaMessage::TrackName(raw)) => {
                    let name = String::from_utf8_lossy(raw).trim().to_string();
                    if !name.is_empty() {
                        track.name = name;
                    }
                }
                _ => {}
            }
        }

        track.sort_events();
        tracks.push(track);
    }

    if let Some(us_per_quarter) = tempo_override {
        if let Some(first) = tracks.first_mut() {
            let has_tempo = first
                .events
                .iter()
                .any(|e| matches!(e.event, MidiLikeEvent::Tempo { .. }));
            if !has_tempo {
                first.events.insert(
                    0,
                    TrackEvent {
                        tick: 0,
                        channel: 0,
                        event: MidiLikeEvent::Tempo { us_per_quarter },
                    },
                );
            }
        }
    }

    log::debug!("imported sequence: ppq {}, {} tracks", ppq, tracks.len());
    Ok(Sequence { ppq, tracks })
}

fn timecode_ppq_and_tempo(fps: Fps, ticks_per_frame: u8) -> (u16, u32) {
    let ticks_per_frame = ticks_per_frame.max(1) as u16;
    match fps {
        Fps::Fps24 => (24 * ticks_per_frame, 1_000_000),
        Fps::Fps25 => (25 * ticks_per_frame, 1_000_000),
        Fps::Fps30 => (30 * ticks_per_frame, 1_000_000),
        Fps::Fps29 => (30 * ticks_per_frame, 1_001_000),
    }
}
