use espressivo_domain_expression::PresetParams;
use espressivo_ports::types::NoteMapRef;
use serde::{Deserialize, Serialize};

/// Start, peak and end note indices of a phrase. Also the key under which an
/// instruction replaces an earlier one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phrase {
    pub start_index: u32,
    pub peak_index: u32,
    pub end_index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub phrase: Phrase,
    pub params: PresetParams,
    pub part_name: String,
    /// Track position in the sequence; preferred over `part_name` when valid.
    #[serde(default)]
    pub part_index: Option<usize>,
    pub note_map_ref: NoteMapRef,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    Appended,
    Replaced { position: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoOutcome {
    Undone(Instruction),
    NothingToUndo,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedoOutcome {
    Redone(Instruction),
    NothingToRedo,
}

/// Ordered instructions replayed over the original, plus the redo stack.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct History {
    instructions: Vec<Instruction>,
    redo_stack: Vec<Instruction>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            redo_stack: Vec::new(),
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn redo_stack(&self) -> &[Instruction] {
        &self.redo_stack
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Replaces the instruction with the same phrase in place, or appends.
    /// Always clears the redo stack.
    pub fn apply(&mut self, instruction: Instruction) -> ApplyOutcome {
        self.redo_stack.clear();
        match self
            .instructions
            .iter()
            .position(|existing| existing.phrase == instruction.phrase)
        {
            Some(position) => {
                self.instructions[position] = instruction;
                ApplyOutcome::Replaced { position }
            }
            None => {
                self.instructions.push(instruction);
                ApplyOutcome::Appended
            }
        }
    }

    pub fn undo(&mut self) -> UndoOutcome {
        match self.instructions.pop() {
            Some(instruction) => {
                self.redo_stack.push(instruction.clone());
                UndoOutcome::Undone(instruction)
            }
            None => UndoOutcome::NothingToUndo,
        }
    }

    pub fn redo(&mut self) -> RedoOutcome {
        match self.redo_stack.pop() {
            Some(instruction) => {
                self.instructions.push(instruction.clone());
                RedoOutcome::Redone(instruction)
            }
            None => RedoOutcome::NothingToRedo,
        }
    }

    pub fn reset(&mut self) {
        self.instructions.clear();
        self.redo_stack.clear();
    }
}
