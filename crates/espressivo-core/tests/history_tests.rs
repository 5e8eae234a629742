use espressivo_core::{ApplyOutcome, History, Instruction, Phrase, RedoOutcome, UndoOutcome};
use espressivo_domain_expression::PresetParams;
use espressivo_ports::types::NoteMapRef;
use pretty_assertions::assert_eq;

fn phrase(start_index: u32, peak_index: u32, end_index: u32) -> Phrase {
    Phrase {
        start_index,
        peak_index,
        end_index,
    }
}

fn instruction(phrase: Phrase, base_cc: i32) -> Instruction {
    Instruction {
        phrase,
        params: PresetParams::new(base_cc, base_cc + 20, 0),
        part_name: "Melody".to_string(),
        part_index: None,
        note_map_ref: NoteMapRef::for_part("Melody"),
    }
}

#[test]
fn same_phrase_replaces_in_place() {
    let mut history = History::new();
    assert_eq!(history.apply(instruction(phrase(0, 1, 2), 5)), ApplyOutcome::Appended);
    assert_eq!(history.apply(instruction(phrase(3, 4, 5), 5)), ApplyOutcome::Appended);
    assert_eq!(
        history.apply(instruction(phrase(0, 1, 2), 15)),
        ApplyOutcome::Replaced { position: 0 }
    );

    assert_eq!(history.len(), 2);
    assert_eq!(history.instructions()[0], instruction(phrase(0, 1, 2), 15));
    assert_eq!(history.instructions()[1].phrase, phrase(3, 4, 5));
}

#[test]
fn different_peak_is_a_different_phrase() {
    let mut history = History::new();
    history.apply(instruction(phrase(0, 1, 4), 5));
    history.apply(instruction(phrase(0, 2, 4), 5));
    assert_eq!(history.len(), 2);
}

#[test]
fn undo_and_redo_move_instructions_between_stacks() {
    let mut history = History::new();
    let first = instruction(phrase(0, 1, 2), 5);
    let second = instruction(phrase(3, 4, 5), 10);
    history.apply(first.clone());
    history.apply(second.clone());

    assert_eq!(history.undo(), UndoOutcome::Undone(second.clone()));
    assert_eq!(history.undo(), UndoOutcome::Undone(first.clone()));
    assert_eq!(history.undo(), UndoOutcome::NothingToUndo);
    assert!(history.is_empty());
    assert_eq!(history.redo_stack().len(), 2);

    assert_eq!(history.redo(), RedoOutcome::Redone(first.clone()));
    assert_eq!(history.redo(), RedoOutcome::Redone(second.clone()));
    assert_eq!(history.redo(), RedoOutcome::NothingToRedo);
    assert_eq!(history.instructions(), &[first, second][..]);
}

#[test]
fn apply_clears_redo_stack() {
    let mut history = History::new();
    history.apply(instruction(phrase(0, 1, 2), 5));
    history.undo();
    assert_eq!(history.redo_stack().len(), 1);

    history.apply(instruction(phrase(3, 4, 5), 5));
    assert!(history.redo_stack().is_empty());
    assert_eq!(history.redo(), RedoOutcome::NothingToRedo);
}

#[test]
fn reset_leaves_nothing_to_undo_or_redo() {
    let mut history = History::new();
    history.apply(instruction(phrase(0, 1, 2), 5));
    history.apply(instruction(phrase(3, 4, 5), 5));
    history.undo();

    history.reset();
    assert_eq!(history.undo(), UndoOutcome::NothingToUndo);
    assert_eq!(history.redo(), RedoOutcome::NothingToRedo);
    assert_eq!(history, History::new());
}

#[test]
fn history_json_accepts_missing_optional_fields() {
    let json = r#"{
        "instructions": [{
            "phrase": { "start_index": 1, "peak_index": 2, "end_index": 3 },
            "params": { "base_cc2": 10, "peak_cc2": 30 },
            "part_name": "Melody",
            "note_map_ref": "Melody"
        }]
    }"#;
    let history: History = serde_json::from_str(json).expect("valid history");

    assert_eq!(history.len(), 1);
    assert_eq!(history.instructions()[0].part_index, None);
    assert_eq!(history.instructions()[0].params, PresetParams::new(10, 30, 0));
    assert!(history.redo_stack().is_empty());
}
