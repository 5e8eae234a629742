use espressivo_domain_expression::{PresetCatalog, PresetParams};
use pretty_assertions::assert_eq;

#[test]
fn builtin_catalog_sums_tempo_and_adjective() {
    let catalog = PresetCatalog::builtin();

    assert_eq!(
        catalog.resolve("Cantabile", Some("Bright")),
        Some(PresetParams::new(15, 50, 0))
    );
    assert_eq!(
        catalog.resolve("Con brio", None),
        Some(PresetParams::new(10, 25, -30))
    );
    assert_eq!(catalog.resolve("Presto", None), None);
    assert_eq!(catalog.resolve("Cantabile", Some("Shiny")), None);
}

#[test]
fn offsets_stay_within_controller_range() {
    assert_eq!(PresetParams::new(300, -300, 5), PresetParams::new(127, -127, 5));

    let loud = PresetParams::new(120, 120, 0).combine(PresetParams::new(20, 20, 15));
    assert_eq!(loud, PresetParams::new(127, 127, 15));
}

#[test]
fn catalog_json_accepts_legacy_field_names() {
    let json = r#"{
        "tempo_expressions": {
            "Grave": { "base_cc2": -15, "peak_cc2": 5, "onset_ms": 40 }
        },
        "adjective_expressions": {
            "Warm": { "base_cc": 3 }
        }
    }"#;
    let catalog: PresetCatalog = serde_json::from_str(json).expect("valid catalog");

    assert_eq!(catalog.tempo("Grave"), Some(PresetParams::new(-15, 5, 40)));
    assert_eq!(catalog.adjective("Warm"), Some(PresetParams::new(3, 0, 0)));
    assert_eq!(
        catalog.resolve("Grave", Some("Warm")),
        Some(PresetParams::new(-12, 5, 40))
    );
}

#[test]
fn curve_shape_offsets_from_baseline() {
    let shape = PresetParams::new(10, 30, 0).curve_shape(60.7);
    assert_eq!(shape.start_value, 70);
    assert_eq!(shape.peak_value, 90);
    assert_eq!(shape.end_value, 70);

    let quiet = PresetParams::new(-20, -5, 0).curve_shape(10.0);
    assert_eq!(quiet.start_value, 0);
    assert_eq!(quiet.peak_value, 5);

    let loud = PresetParams::new(10, 40, 0).curve_shape(120.0);
    assert_eq!(loud.peak_value, 127);
}

#[test]
fn japanese_preset_names_resolve_to_builtin_entries() {
    let catalog = PresetCatalog::builtin();

    assert_eq!(catalog.tempo("なし"), Some(PresetParams::new(0, 0, 0)));
    assert_eq!(catalog.adjective("暗い"), catalog.adjective("Dark"));
    assert_eq!(
        catalog.resolve("Cantabile", Some("明るい")),
        Some(PresetParams::new(15, 50, 0))
    );
    assert_eq!(
        catalog.resolve("なし", Some("華やか")),
        Some(PresetParams::new(10, 28, 0))
    );
}

#[test]
fn deserialized_offsets_are_clamped() {
    let params: PresetParams =
        serde_json::from_str(r#"{ "base_cc2": 300, "peak_cc": -500, "onset_ms": 900 }"#)
            .expect("valid params");
    assert_eq!(params, PresetParams::new(127, -127, 900));
    assert_eq!(params.base_cc, 127);
}
