use crate::history::{ApplyOutcome, History, Instruction, Phrase, RedoOutcome, UndoOutcome};
use crate::ipc::{Command, Event};
use crate::render::{load_note_map, replay, RenderError};
use espressivo_domain_expression::{estimate_apex, ApexReport, PresetCatalog};
use espressivo_domain_score::{build_note_map, ScorePart, Sequence, TimeError, TimeModel};
use espressivo_ports::storage::{EngineSettings, NoteMapStore, StorageError};
use espressivo_ports::types::NoteMapRef;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("time model error: {0}")]
    Time(#[from] TimeError),
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// One editing session over an uploaded performance.
///
/// `original` never changes. `current` is always the replay of `history`
/// over it; a failed replay leaves both untouched.
pub struct Session {
    original: Arc<Sequence>,
    current: Arc<Sequence>,
    history: History,
    store: Arc<dyn NoteMapStore>,
    catalog: PresetCatalog,
    settings: EngineSettings,
    events: VecDeque<Event>,
}

impl Session {
    pub fn new(
        original: Sequence,
        store: Arc<dyn NoteMapStore>,
        catalog: PresetCatalog,
        settings: EngineSettings,
    ) -> Self {
        let original = Arc::new(original);
        Self {
            current: original.clone(),
            original,
            history: History::new(),
            store,
            catalog,
            settings,
            events: VecDeque::new(),
        }
    }

    pub fn original(&self) -> &Arc<Sequence> {
        &self.original
    }

    pub fn current(&self) -> &Arc<Sequence> {
        &self.current
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn NoteMapStore> {
        &self.store
    }

    /// Builds and stores the note map of `part`, timed against the original.
    pub fn register_part(&mut self, part: &ScorePart) -> Result<NoteMapRef, SessionError> {
        let time = TimeModel::from_sequence(&self.original)?;
        let entries = build_note_map(part, &time);
        let reference = NoteMapRef::for_part(&part.name);
        self.store.save_note_map(&reference, &entries)?;
        log::info!(
            "registered part '{}' as {} ({} entries)",
            part.name,
            reference,
            entries.len()
        );
        self.events.push_back(Event::PartRegistered {
            part_name: part.name.clone(),
            note_map_ref: reference.clone(),
            notes: entries.len(),
        });
        Ok(reference)
    }

    pub fn apply(&mut self, instruction: Instruction) -> Result<ApplyOutcome, SessionError> {
        let mut candidate = self.history.clone();
        let outcome = candidate.apply(instruction);
        self.commit(candidate)?;
        Ok(outcome)
    }

    pub fn apply_preset(
        &mut self,
        phrase: Phrase,
        tempo: &str,
        adjective: Option<&str>,
        part_name: &str,
        part_index: Option<usize>,
        note_map_ref: Option<NoteMapRef>,
    ) -> Result<ApplyOutcome, SessionError> {
        let params = self.catalog.resolve(tempo, adjective).ok_or_else(|| {
            SessionError::UnknownPreset(match adjective {
                Some(adjective) => format!("{} + {}", tempo, adjective),
                None => tempo.to_string(),
            })
        })?;
        self.apply(Instruction {
            phrase,
            params,
            part_name: part_name.to_string(),
            part_index,
            note_map_ref: note_map_ref.unwrap_or_else(|| NoteMapRef::for_part(part_name)),
        })
    }

    pub fn undo(&mut self) -> Result<UndoOutcome, SessionError> {
        let mut candidate = self.history.clone();
        let outcome = candidate.undo();
        if outcome != UndoOutcome::NothingToUndo {
            self.commit(candidate)?;
        }
        Ok(outcome)
    }

    pub fn redo(&mut self) -> Result<RedoOutcome, SessionError> {
        let mut candidate = self.history.clone();
        let outcome = candidate.redo();
        if outcome != RedoOutcome::NothingToRedo {
            self.commit(candidate)?;
        }
        Ok(outcome)
    }

    pub fn reset(&mut self) {
        self.history.reset();
        self.current = self.original.clone();
        log::info!("history reset");
    }

    pub fn estimate_apex(
        &self,
        note_map_ref: &NoteMapRef,
        start_index: u32,
        end_index: u32,
    ) -> Result<ApexReport, SessionError> {
        let map = load_note_map(self.store.as_ref(), note_map_ref)?;
        let notes = map.logical_notes_in_range(start_index, end_index);
        Ok(estimate_apex(&notes))
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), SessionError> {
        match cmd {
            Command::RegisterPart { part } => {
                self.register_part(&part)?;
            }
            Command::ApplyInstruction { instruction } => {
                self.apply(instruction)?;
                self.emit_history();
            }
            Command::ApplyPreset {
                phrase,
                tempo,
                adjective,
                part_name,
                part_index,
                note_map_ref,
            } => {
                self.apply_preset(
                    phrase,
                    &tempo,
                    adjective.as_deref(),
                    &part_name,
                    part_index,
                    note_map_ref,
                )?;
                self.emit_history();
            }
            Command::Undo => match self.undo()? {
                UndoOutcome::Undone(_) => self.emit_history(),
                UndoOutcome::NothingToUndo => self.events.push_back(Event::NothingToUndo),
            },
            Command::Redo => match self.redo()? {
                RedoOutcome::Redone(_) => self.emit_history(),
                RedoOutcome::NothingToRedo => self.events.push_back(Event::NothingToRedo),
            },
            Command::Reset => {
                self.reset();
                self.emit_history();
            }
            Command::EstimateApex {
                note_map_ref,
                start_index,
                end_index,
            } => {
                let report = self.estimate_apex(&note_map_ref, start_index, end_index)?;
                self.events.push_back(Event::ApexEstimated {
                    note_map_ref,
                    candidates: report.candidates.into_iter().collect(),
                    scores: report.scores,
                });
            }
        }
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    fn commit(&mut self, candidate: History) -> Result<(), SessionError> {
        let rendered = replay(
            &self.original,
            &candidate,
            self.store.as_ref(),
            &self.settings,
        )?;
        log::info!(
            "committed {} instruction(s), {} on redo stack",
            candidate.len(),
            candidate.redo_stack().len()
        );
        self.history = candidate;
        self.current = Arc::new(rendered);
        Ok(())
    }

    fn emit_history(&mut self) {
        self.events.push_back(Event::HistoryUpdated {
            instructions: self.history.instructions().to_vec(),
            redo_depth: self.history.redo_stack().len(),
        });
    }
}
