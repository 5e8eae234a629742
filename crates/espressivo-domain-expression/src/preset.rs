use crate::curve::CurveShape;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const OFFSET_LIMIT: i32 = 127;

/// Japanese preset names, accepted alongside the English keys.
const NAME_ALIASES: [(&str, &str); 4] = [
    ("なし", "None"),
    ("明るい", "Bright"),
    ("華やか", "Brilliant"),
    ("暗い", "Dark"),
];

fn lookup(presets: &BTreeMap<String, PresetParams>, name: &str) -> Option<PresetParams> {
    presets
        .get(name)
        .or_else(|| {
            NAME_ALIASES
                .iter()
                .find(|(alias, _)| *alias == name)
                .and_then(|(_, canonical)| presets.get(*canonical))
        })
        .copied()
}

/// Expression offsets applied over a phrase.
///
/// `base_cc` and `peak_cc` are added to the phrase's baseline expression at
/// its start/end and at its peak. `onset_ms` is the onset shift per beat.
/// Deserialized offsets are clamped like [`PresetParams::new`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredPresetParams")]
pub struct PresetParams {
    pub base_cc: i32,
    pub peak_cc: i32,
    pub onset_ms: i32,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct StoredPresetParams {
    #[serde(alias = "base_cc2")]
    base_cc: i32,
    #[serde(alias = "peak_cc2")]
    peak_cc: i32,
    onset_ms: i32,
}

impl From<StoredPresetParams> for PresetParams {
    fn from(stored: StoredPresetParams) -> Self {
        PresetParams::new(stored.base_cc, stored.peak_cc, stored.onset_ms)
    }
}

impl PresetParams {
    pub fn new(base_cc: i32, peak_cc: i32, onset_ms: i32) -> Self {
        Self {
            base_cc,
            peak_cc,
            onset_ms,
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            base_cc: self.base_cc.clamp(-OFFSET_LIMIT, OFFSET_LIMIT),
            peak_cc: self.peak_cc.clamp(-OFFSET_LIMIT, OFFSET_LIMIT),
            onset_ms: self.onset_ms,
        }
    }

    /// Sums two presets, keeping the controller offsets in range.
    pub fn combine(self, other: PresetParams) -> Self {
        Self {
            base_cc: self.base_cc.saturating_add(other.base_cc),
            peak_cc: self.peak_cc.saturating_add(other.peak_cc),
            onset_ms: self.onset_ms.saturating_add(other.onset_ms),
        }
        .clamped()
    }

    /// Curve values for a phrase whose existing expression averages `baseline`.
    /// The phrase ends where it started.
    pub fn curve_shape(&self, baseline: f64) -> CurveShape {
        let level = |offset: i32| (baseline + offset as f64).trunc().clamp(0.0, 127.0) as i32;
        let start_value = level(self.base_cc);
        CurveShape {
            start_value,
            peak_value: level(self.peak_cc),
            end_value: start_value,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetCatalog {
    pub tempo_expressions: BTreeMap<String, PresetParams>,
    pub adjective_expressions: BTreeMap<String, PresetParams>,
}

impl PresetCatalog {
    pub fn builtin() -> Self {
        let tempo = [
            ("None", PresetParams::new(0, 0, 0)),
            ("Cantabile", PresetParams::new(10, 30, 0)),
            ("Dolce", PresetParams::new(-20, -5, 0)),
            ("Maestoso", PresetParams::new(10, 40, 0)),
            ("Appassionato", PresetParams::new(10, 35, -10)),
            ("Con brio", PresetParams::new(10, 25, -30)),
            ("Leggiero", PresetParams::new(-10, 5, -10)),
            ("Tranquillo", PresetParams::new(-20, -10, -20)),
            ("Risoluto", PresetParams::new(10, 30, -10)),
            ("Sostenuto", PresetParams::new(0, 10, 30)),
            ("Marcato", PresetParams::new(10, 30, 0)),
        ];
        let adjective = [
            ("None", PresetParams::new(0, 0, 0)),
            ("Bright", PresetParams::new(5, 20, 0)),
            ("Brilliant", PresetParams::new(10, 28, 0)),
            ("Dark", PresetParams::new(-5, 8, 0)),
        ];

        Self {
            tempo_expressions: tempo
                .into_iter()
                .map(|(name, params)| (name.to_string(), params))
                .collect(),
            adjective_expressions: adjective
                .into_iter()
                .map(|(name, params)| (name.to_string(), params))
                .collect(),
        }
    }

    pub fn tempo(&self, name: &str) -> Option<PresetParams> {
        lookup(&self.tempo_expressions, name)
    }

    pub fn adjective(&self, name: &str) -> Option<PresetParams> {
        lookup(&self.adjective_expressions, name)
    }

    /// Tempo marking plus optional adjective, summed.
    pub fn resolve(&self, tempo: &str, adjective: Option<&str>) -> Option<PresetParams> {
        let base = self.tempo(tempo)?;
        match adjective {
            Some(name) => Some(base.combine(self.adjective(name)?)),
            None => Some(base),
        }
    }
}
