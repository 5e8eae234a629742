use serde::{Deserialize, Serialize};
use std::fmt;

pub type Tick = i64; // musical time, monotonic within a track

/// 7-bit controller used for the expression curve.
pub const EXPRESSION_CONTROLLER: u8 = 2;

/// Curve midpoint; also the neutral velocity reference.
pub const NEUTRAL_EXPRESSION: u8 = 64;

pub const DEFAULT_US_PER_QUARTER: u32 = 500_000;

/// Key under which a part's note map is persisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteMapRef(pub String);

impl NoteMapRef {
    /// Derives a filesystem-safe key from a part name.
    pub fn for_part(part_name: &str) -> Self {
        let safe: String = part_name
            .trim()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if safe.is_empty() {
            Self("part".to_string())
        } else {
            Self(safe)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteMapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
