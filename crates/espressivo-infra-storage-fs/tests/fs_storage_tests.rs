use espressivo_domain_expression::{PresetCatalog, PresetParams};
use espressivo_infra_storage_fs::FsStorage;
use espressivo_ports::note_map::{NoteMapEntry, TieRole};
use espressivo_ports::storage::{EngineSettings, NoteMapStore, SettingsStore};
use espressivo_ports::types::NoteMapRef;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;

fn scratch_dir(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("espressivo-{}-{}-{}", label, std::process::id(), nanos))
}

fn entries() -> Vec<NoteMapEntry> {
    vec![
        NoteMapEntry {
            index: 0,
            measure: Some(1),
            offset_beats: 0.0,
            duration_beats: 1.5,
            duration_seconds: 0.75,
            start_tick: 0,
            pitch: Some(67),
            is_rest: false,
            tie_role: TieRole::Start,
        },
        NoteMapEntry {
            index: 1,
            measure: Some(1),
            offset_beats: 1.5,
            duration_beats: 0.5,
            duration_seconds: 0.25,
            start_tick: 720,
            pitch: None,
            is_rest: true,
            tie_role: TieRole::None,
        },
    ]
}

#[test]
fn note_maps_persist_per_reference() {
    let dir = scratch_dir("note-maps");
    let storage = FsStorage::new(dir.clone());
    let violin = NoteMapRef::for_part("Violin I");

    assert_eq!(storage.load_note_map(&violin).expect("load"), None);
    storage.save_note_map(&violin, &entries()).expect("save");

    assert!(dir.join("note_maps").join("Violin_I.note_map.json").exists());
    assert_eq!(storage.load_note_map(&violin).expect("load"), Some(entries()));
    assert_eq!(storage.list_note_maps().expect("list"), vec![violin]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn note_map_dir_can_be_overridden_from_settings() {
    let dir = scratch_dir("override");
    let maps = dir.join("elsewhere");
    let settings = EngineSettings {
        note_map_dir: Some(maps.to_string_lossy().into_owned()),
        ..EngineSettings::default()
    };
    let storage = FsStorage::new(dir.clone()).configured(&settings);

    storage
        .save_note_map(&NoteMapRef::for_part("Cello"), &entries())
        .expect("save");
    assert!(maps.join("Cello.note_map.json").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn settings_default_when_absent_and_round_trip() {
    let dir = scratch_dir("settings");
    let storage = FsStorage::new(dir.clone());
    assert_eq!(storage.load_settings().expect("load"), EngineSettings::default());

    let custom = EngineSettings {
        expression_controller: 11,
        note_map_dir: None,
        preset_catalog_path: Some("/tmp/presets.json".to_string()),
    };
    storage.save_settings(&custom).expect("save");
    assert_eq!(storage.load_settings().expect("load"), custom);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn partial_settings_file_fills_defaults() {
    let dir = scratch_dir("partial");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("settings.json"), br#"{ "note_map_dir": "maps" }"#).expect("write");

    let settings = FsStorage::new(dir.clone()).load_settings().expect("load");
    assert_eq!(settings.expression_controller, 2);
    assert_eq!(settings.note_map_dir.as_deref(), Some("maps"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn preset_catalog_loads_from_file_or_falls_back() {
    let dir = scratch_dir("catalog");
    fs::create_dir_all(&dir).expect("mkdir");
    let path = dir.join("presets.json");
    fs::write(
        &path,
        br#"{ "tempo_expressions": { "Grave": { "base_cc2": -15, "peak_cc2": 5, "onset_ms": 40 } } }"#,
    )
    .expect("write");

    let settings = EngineSettings {
        preset_catalog_path: Some(path.to_string_lossy().into_owned()),
        ..EngineSettings::default()
    };
    let catalog = FsStorage::preset_catalog(&settings).expect("catalog");
    assert_eq!(catalog.tempo("Grave"), Some(PresetParams::new(-15, 5, 40)));
    assert!(catalog.adjective_expressions.is_empty());

    assert_eq!(
        FsStorage::preset_catalog(&EngineSettings::default()).expect("builtin"),
        PresetCatalog::builtin()
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_note_map_is_a_serde_error() {
    let dir = scratch_dir("corrupt");
    let storage = FsStorage::new(dir.clone());
    let key = NoteMapRef::for_part("Flute");
    fs::create_dir_all(storage.note_map_dir()).expect("mkdir");
    fs::write(storage.note_map_path(&key), b"[{ not json").expect("write");

    let err = storage.load_note_map(&key).expect_err("corrupt file");
    assert!(err.to_string().starts_with("serialization error"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn catalog_file_offsets_are_clamped_on_load() {
    let dir = scratch_dir("clamp");
    fs::create_dir_all(&dir).expect("mkdir");
    let path = dir.join("presets.json");
    fs::write(
        &path,
        br#"{ "tempo_expressions": { "Fortissimo": { "base_cc2": 200, "peak_cc2": 400 } } }"#,
    )
    .expect("write");

    let catalog = FsStorage::load_preset_catalog(&path).expect("catalog");
    assert_eq!(catalog.tempo("Fortissimo"), Some(PresetParams::new(127, 127, 0)));

    let _ = fs::remove_dir_all(&dir);
}
