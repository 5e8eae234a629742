use espressivo_core::{
    replay, Command, Event, History, InMemoryNoteMapStore, Instruction, JobStatus, Phrase,
    RenderError, RenderJobs, Session, SessionError, UndoOutcome,
};
use espressivo_domain_expression::{PresetCatalog, PresetParams};
use espressivo_domain_score::{
    export_sequence_bytes, NoteMapError, ScoreElement, ScoreMeasure, ScorePart, Sequence, Track,
};
use espressivo_ports::midi::MidiLikeEvent;
use espressivo_ports::note_map::TieRole;
use espressivo_ports::storage::EngineSettings;
use espressivo_ports::types::NoteMapRef;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn performance() -> Sequence {
    let mut conductor = Track::new(0, "Conductor");
    conductor.push(0, MidiLikeEvent::Tempo { us_per_quarter: 500_000 });

    let mut melody = Track::new(1, "Melody");
    let pitches = [60u8, 64, 67, 62, 60];
    for (i, pitch) in pitches.iter().enumerate() {
        let tick = i as i64 * 480;
        melody.push(tick, MidiLikeEvent::NoteOn { note: *pitch, velocity: 80 });
        melody.push(tick + 240, MidiLikeEvent::NoteOff { note: *pitch });
    }

    Sequence {
        ppq: 480,
        tracks: vec![conductor, melody],
    }
}

fn melody_part() -> ScorePart {
    let pitches = [60, 64, 67, 62, 60];
    ScorePart {
        name: "Melody".to_string(),
        measures: vec![ScoreMeasure {
            number: Some(1),
            offset_beats: 0.0,
            elements: pitches
                .iter()
                .enumerate()
                .map(|(i, pitch)| ScoreElement {
                    offset_beats: i as f64,
                    duration_beats: 1.0,
                    pitch: Some(*pitch),
                    tie: TieRole::None,
                })
                .collect(),
        }],
    }
}

fn phrase(start_index: u32, peak_index: u32, end_index: u32) -> Phrase {
    Phrase {
        start_index,
        peak_index,
        end_index,
    }
}

fn session() -> Session {
    let mut session = Session::new(
        performance(),
        Arc::new(InMemoryNoteMapStore::new()),
        PresetCatalog::builtin(),
        EngineSettings::default(),
    );
    session.register_part(&melody_part()).expect("register");
    session.drain_events();
    session
}

fn instruction(phrase: Phrase, params: PresetParams) -> Instruction {
    Instruction {
        phrase,
        params,
        part_name: "Melody".to_string(),
        part_index: None,
        note_map_ref: NoteMapRef::for_part("Melody"),
    }
}

#[test]
fn register_part_reports_its_note_map() {
    let mut session = Session::new(
        performance(),
        Arc::new(InMemoryNoteMapStore::new()),
        PresetCatalog::builtin(),
        EngineSettings::default(),
    );
    session
        .handle_command(Command::RegisterPart { part: melody_part() })
        .expect("register");

    assert_eq!(
        session.drain_events(),
        vec![Event::PartRegistered {
            part_name: "Melody".to_string(),
            note_map_ref: NoteMapRef::for_part("Melody"),
            notes: 5,
        }]
    );
}

#[test]
fn undo_restores_previous_render_exactly() {
    let mut session = session();
    session
        .apply(instruction(phrase(0, 2, 3), PresetParams::new(10, 30, -10)))
        .expect("apply");
    let before = session.current().clone();
    let before_bytes = export_sequence_bytes(&before).expect("export");

    session
        .apply(instruction(phrase(2, 3, 4), PresetParams::new(-20, -5, 30)))
        .expect("apply");
    assert_ne!(**session.current(), *before);

    assert!(matches!(session.undo().expect("undo"), UndoOutcome::Undone(_)));
    assert_eq!(**session.current(), *before);
    assert_eq!(export_sequence_bytes(session.current()).expect("export"), before_bytes);

    session.undo().expect("undo");
    assert_eq!(**session.current(), **session.original());
}

#[test]
fn failed_apply_keeps_committed_state() {
    let mut session = session();
    session
        .apply(instruction(phrase(0, 2, 3), PresetParams::new(10, 30, 0)))
        .expect("apply");
    let committed = session.current().clone();
    let history = session.history().clone();

    let err = session
        .apply(instruction(phrase(1, 2, 42), PresetParams::new(10, 30, 0)))
        .expect_err("index 42 is not in the map");
    assert!(matches!(
        err,
        SessionError::Render(RenderError::NoteMap {
            source: NoteMapError::NotFound(42),
            ..
        })
    ));
    assert_eq!(session.current(), &committed);
    assert_eq!(session.history(), &history);
}

#[test]
fn commands_emit_history_and_no_op_events() {
    let mut session = session();
    session
        .handle_command(Command::ApplyPreset {
            phrase: phrase(0, 2, 4),
            tempo: "Cantabile".to_string(),
            adjective: Some("Bright".to_string()),
            part_name: "Melody".to_string(),
            part_index: None,
            note_map_ref: None,
        })
        .expect("apply preset");

    let applied = instruction(phrase(0, 2, 4), PresetParams::new(15, 50, 0));
    assert_eq!(
        session.drain_events(),
        vec![Event::HistoryUpdated {
            instructions: vec![applied.clone()],
            redo_depth: 0,
        }]
    );

    session.handle_command(Command::Undo).expect("undo");
    session.handle_command(Command::Undo).expect("undo");
    session.handle_command(Command::Redo).expect("redo");
    session.handle_command(Command::Redo).expect("redo");
    assert_eq!(
        session.drain_events(),
        vec![
            Event::HistoryUpdated {
                instructions: vec![],
                redo_depth: 1,
            },
            Event::NothingToUndo,
            Event::HistoryUpdated {
                instructions: vec![applied],
                redo_depth: 0,
            },
            Event::NothingToRedo,
        ]
    );
}

#[test]
fn reset_returns_to_original_and_disables_undo_redo() {
    let mut session = session();
    session
        .apply(instruction(phrase(0, 2, 3), PresetParams::new(10, 30, -10)))
        .expect("apply");
    session.undo().expect("undo");
    session
        .apply(instruction(phrase(1, 2, 4), PresetParams::new(10, 30, 0)))
        .expect("apply");

    session.handle_command(Command::Reset).expect("reset");
    session.handle_command(Command::Undo).expect("undo");
    session.handle_command(Command::Redo).expect("redo");

    assert_eq!(**session.current(), **session.original());
    let events = session.drain_events();
    assert_eq!(&events[1..], &[Event::NothingToUndo, Event::NothingToRedo]);
}

#[test]
fn unknown_preset_is_rejected_without_touching_history() {
    let mut session = session();
    let err = session
        .apply_preset(phrase(0, 2, 4), "Presto", None, "Melody", None, None)
        .expect_err("not in catalog");
    assert!(matches!(err, SessionError::UnknownPreset(name) if name == "Presto"));
    assert!(session.history().is_empty());
}

#[test]
fn apex_command_reports_candidates_and_scores() {
    let mut session = session();
    session
        .handle_command(Command::EstimateApex {
            note_map_ref: NoteMapRef::for_part("Melody"),
            start_index: 0,
            end_index: 3,
        })
        .expect("apex");

    match session.drain_events().as_slice() {
        [Event::ApexEstimated {
            candidates, scores, ..
        }] => {
            assert_eq!(candidates, &vec![2]);
            assert_eq!(scores.len(), 4);
        }
        other => panic!("unexpected events {:?}", other),
    }
}

#[test]
fn render_job_matches_direct_replay() {
    let session = {
        let mut session = session();
        session
            .apply(instruction(phrase(0, 2, 3), PresetParams::new(10, 30, -10)))
            .expect("apply");
        session
    };
    let jobs = RenderJobs::new();

    let (id, handle) = jobs.submit(
        session.original().clone(),
        session.history().clone(),
        session.store().clone(),
        EngineSettings::default(),
    );
    handle.join().expect("worker thread");

    match jobs.status(id) {
        Some(JobStatus::Done(rendered)) => assert_eq!(*rendered, **session.current()),
        other => panic!("unexpected status {:?}", other),
    }
    assert_eq!(jobs.len(), 1);
    assert!(jobs.status(id).is_some());
    assert_eq!(jobs.len(), 1);

    assert!(jobs.take_finished(id).is_some());
    assert_eq!(jobs.status(id), None);
    assert!(jobs.is_empty());
}

#[test]
fn failing_render_job_reports_the_error() {
    let session = session();
    let jobs = RenderJobs::new();
    let history = History::from_instructions(vec![instruction(
        phrase(0, 1, 77),
        PresetParams::new(0, 0, 0),
    )]);

    let (id, handle) = jobs.submit(
        session.original().clone(),
        history.clone(),
        session.store().clone(),
        EngineSettings::default(),
    );
    handle.join().expect("worker thread");

    let direct = replay(
        session.original(),
        &history,
        session.store().as_ref(),
        &EngineSettings::default(),
    )
    .expect_err("bad index");
    assert_eq!(jobs.status(id), Some(JobStatus::Failed(direct.to_string())));
}
