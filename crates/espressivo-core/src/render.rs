use crate::history::{History, Instruction, Phrase};
use espressivo_domain_expression::{
    apply_expression_curve, baseline_expression, remap_velocities, shift_sequence_onsets,
    synthesize_curve,
};
use espressivo_domain_score::{NoteMap, NoteMapError, Sequence, TimeError, TimeModel};
use espressivo_ports::storage::{EngineSettings, NoteMapStore, StorageError};
use espressivo_ports::types::{NoteMapRef, Tick};
use std::collections::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("time model error: {0}")]
    Time(#[from] TimeError),
    #[error("note map {reference}: {source}")]
    NoteMap {
        reference: NoteMapRef,
        #[source]
        source: NoteMapError,
    },
    #[error("no note map stored for {0}")]
    NoteMapMissing(NoteMapRef),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("part not found: {0}")]
    PartNotFound(String),
}

/// Phrase indices resolved to ticks, with start and end in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhraseTicks {
    pub start: Tick,
    pub peak: Tick,
    pub end: Tick,
}

/// Loads and validates the note map stored under `reference`.
pub fn load_note_map(store: &dyn NoteMapStore, reference: &NoteMapRef) -> Result<NoteMap, RenderError> {
    let entries = store
        .load_note_map(reference)?
        .ok_or_else(|| RenderError::NoteMapMissing(reference.clone()))?;
    NoteMap::new(entries).map_err(|source| RenderError::NoteMap {
        reference: reference.clone(),
        source,
    })
}

pub fn resolve_phrase(
    map: &NoteMap,
    reference: &NoteMapRef,
    phrase: &Phrase,
) -> Result<PhraseTicks, RenderError> {
    let tick = |index: u32| {
        map.idx_to_tick(index).map_err(|source| RenderError::NoteMap {
            reference: reference.clone(),
            source,
        })
    };
    let start = tick(phrase.start_index)?;
    let peak = tick(phrase.peak_index)?;
    let end = tick(phrase.end_index)?;

    let (start, end) = if start > end { (end, start) } else { (start, end) };
    Ok(PhraseTicks { start, peak, end })
}

/// Note maps read during one replay.
struct NoteMapCache<'a> {
    store: &'a dyn NoteMapStore,
    maps: HashMap<NoteMapRef, NoteMap>,
}

impl<'a> NoteMapCache<'a> {
    fn new(store: &'a dyn NoteMapStore) -> Self {
        Self {
            store,
            maps: HashMap::new(),
        }
    }

    fn get(&mut self, reference: &NoteMapRef) -> Result<&NoteMap, RenderError> {
        if !self.maps.contains_key(reference) {
            let map = load_note_map(self.store, reference)?;
            self.maps.insert(reference.clone(), map);
        }
        self.maps
            .get(reference)
            .ok_or_else(|| RenderError::NoteMapMissing(reference.clone()))
    }
}

/// Folds `original` through every instruction of `history`, in order.
///
/// Always starts from `original`; an empty history yields an identical copy.
/// Any failure aborts the whole replay and nothing partial is returned.
pub fn replay(
    original: &Sequence,
    history: &History,
    store: &dyn NoteMapStore,
    settings: &EngineSettings,
) -> Result<Sequence, RenderError> {
    let mut cache = NoteMapCache::new(store);
    let mut current = original.clone();

    for (position, instruction) in history.instructions().iter().enumerate() {
        let map = cache.get(&instruction.note_map_ref)?;
        let ticks = resolve_phrase(map, &instruction.note_map_ref, &instruction.phrase)?;
        log::debug!(
            "replay #{} part '{}' ticks {}..{} peak {} params {:?}",
            position,
            instruction.part_name,
            ticks.start,
            ticks.end,
            ticks.peak,
            instruction.params
        );
        current = apply_instruction(&current, instruction, ticks, settings)?;
    }

    Ok(current)
}

/// Applies one instruction: expression curve and velocity remap on the target
/// part, then the onset shift across every track.
pub fn apply_instruction(
    current: &Sequence,
    instruction: &Instruction,
    ticks: PhraseTicks,
    settings: &EngineSettings,
) -> Result<Sequence, RenderError> {
    let controller = settings.expression_controller;
    let track_index = target_track(current, instruction)?;

    let mut next = current.clone();
    let track = next
        .tracks
        .get_mut(track_index)
        .ok_or_else(|| RenderError::PartNotFound(instruction.part_name.clone()))?;

    let baseline = baseline_expression(&track.events, controller, ticks.start, ticks.end);
    let shape = instruction.params.curve_shape(baseline);
    let curve = synthesize_curve(ticks.start, ticks.end, ticks.peak, shape);
    let with_curve = apply_expression_curve(&track.events, controller, ticks.start, ticks.end, &curve);
    track.events = remap_velocities(&with_curve, controller);

    let time = TimeModel::from_sequence(&next)?;
    let shifted = shift_sequence_onsets(
        &next,
        ticks.start,
        ticks.end,
        instruction.params.onset_ms,
        &time,
    )?;
    Ok(shifted)
}

fn target_track(sequence: &Sequence, instruction: &Instruction) -> Result<usize, RenderError> {
    if let Some(index) = instruction.part_index {
        if index < sequence.tracks.len() {
            return Ok(index);
        }
        log::warn!(
            "part index {} out of range, falling back to name '{}'",
            index,
            instruction.part_name
        );
    }
    sequence
        .track_index_by_name(&instruction.part_name)
        .ok_or_else(|| RenderError::PartNotFound(instruction.part_name.clone()))
}
