use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MidiLikeEvent {
    NoteOn {
        note: u8,
        velocity: u8,
    },
    NoteOff {
        note: u8,
    },
    /// Controller change, value 0..127. Controller 2 carries the expression curve.
    Controller {
        controller: u8,
        value: u8,
    },
    ProgramChange {
        program: u8,
    },
    /// Set tempo meta event.
    Tempo {
        us_per_quarter: u32,
    },
}

impl MidiLikeEvent {
    /// True for note-on events that actually sound (velocity > 0).
    pub fn is_note_start(&self) -> bool {
        matches!(self, MidiLikeEvent::NoteOn { velocity, .. } if *velocity > 0)
    }

    pub fn controller_value(&self, wanted: u8) -> Option<u8> {
        match self {
            MidiLikeEvent::Controller { controller, value } if *controller == wanted => {
                Some(*value)
            }
            _ => None,
        }
    }
}
