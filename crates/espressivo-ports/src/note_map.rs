use crate::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieRole {
    #[default]
    None,
    Start,
    Continue,
    Stop,
}

/// One note or rest of a part, addressed by its dense document-order index.
///
/// This is the persisted record shape: later calls resolve phrase indices to
/// ticks from a stored list of these without re-reading the score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteMapEntry {
    pub index: u32,
    pub measure: Option<u32>,
    pub offset_beats: f64,
    pub duration_beats: f64,
    pub duration_seconds: f64,
    pub start_tick: Tick,
    pub pitch: Option<i32>,
    pub is_rest: bool,
    #[serde(default)]
    pub tie_role: TieRole,
}
