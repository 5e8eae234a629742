use crate::history::{Instruction, Phrase};
use espressivo_domain_expression::NoteScore;
use espressivo_domain_score::ScorePart;
use espressivo_ports::types::NoteMapRef;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    RegisterPart {
        part: ScorePart,
    },
    ApplyInstruction {
        instruction: Instruction,
    },
    /// Resolves the named presets through the session's catalog.
    ApplyPreset {
        phrase: Phrase,
        tempo: String,
        adjective: Option<String>,
        part_name: String,
        #[serde(default)]
        part_index: Option<usize>,
        /// Defaults to the reference derived from `part_name`.
        #[serde(default)]
        note_map_ref: Option<NoteMapRef>,
    },
    Undo,
    Redo,
    Reset,
    EstimateApex {
        note_map_ref: NoteMapRef,
        start_index: u32,
        end_index: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    PartRegistered {
        part_name: String,
        note_map_ref: NoteMapRef,
        notes: usize,
    },
    HistoryUpdated {
        instructions: Vec<Instruction>,
        redo_depth: usize,
    },
    ApexEstimated {
        note_map_ref: NoteMapRef,
        candidates: Vec<u32>,
        scores: Vec<NoteScore>,
    },
    NothingToUndo,
    NothingToRedo,
}
